use studio_core::config::Configurable;
use studio_core::packages::ListEntry;
use studio_core::style::{FontSpec, PlotterStyleProvider};

pub fn print_info(message: &str) {
    println!("[Studio][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[Studio][ERROR]: {message}");
}

pub fn print_type_list(types: &[(String, String)]) {
    if types.is_empty() {
        print_info("No configuration types registered");
    } else {
        print_info("Configuration types:");
        for (type_id, name) in types {
            println!("{type_id} - {name}");
        }
    }
}

pub fn print_configurable_list(type_id: &str, names: &[String]) {
    if names.is_empty() {
        print_info(&format!("No configured objects of type {type_id}"));
    } else {
        print_info(&format!("Configured objects of type {type_id}:"));
        for name in names {
            println!("{name}");
        }
    }
}

pub fn print_configurable(configurable: &Configurable) {
    print_info(&format!(
        "{} ({})",
        configurable.name(),
        configurable.type_id()
    ));
    if configurable.parameters().is_empty() {
        println!("\t(no parameters)");
    } else {
        for (key, value) in configurable.parameters() {
            println!("\t{key}: {value}");
        }
    }
}

pub fn print_package_entries(tab: &str, entries: &[ListEntry]) {
    print_info(&format!("Packages in {tab}:"));
    for entry in entries {
        println!("{entry}");
    }
}

fn describe_font(font: &FontSpec) -> String {
    format!("{} style={} size={}", font.name, font.style, font.size)
}

pub fn print_style(provider: &PlotterStyleProvider) {
    print_info("Plotter style:");
    println!("axes_font: {}", describe_font(provider.axes_font()));
    println!("legend_font: {}", describe_font(provider.legend_font()));
    println!("title_font: {}", describe_font(provider.title_font()));
    println!("color_schemes:");
    let selected = provider.selected_color_scheme_index();
    for (index, scheme) in provider.color_schemes().iter().enumerate() {
        let marker = if index == selected { "*" } else { " " };
        println!("{marker} [{index}] {} ({} colors)", scheme.name, scheme.colors.len());
    }
}
