use crate::commands::*;
use crate::output::*;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use studio_core::config::{
    builtin_configurators, Accessor, Configurable, ConfigurationManager, FileConfigurationStore,
    Parameters,
};
use studio_core::expression::{ExpressionValue, FunctionRegistry};
use studio_core::packages::{
    JsonUpdateServer, PackageDescriptorCache, PackageListModel, PackageTab, TabSource,
};
use studio_core::style::PlotterStyleProvider;
use studio_core::StudioSettings;

type CommandResult = Result<(), Box<dyn Error>>;

pub fn handle_command(command: Commands, settings: &StudioSettings) -> CommandResult {
    match command {
        Commands::Config { command } => handle_config_command(command, settings),
        Commands::Packages {
            index,
            tab,
            timeout_seconds,
        } => handle_packages_command(index.as_deref(), &tab, timeout_seconds, settings),
        Commands::Expr { command } => handle_expr_command(command),
        Commands::Style { command } => handle_style_command(command, settings),
    }
}

fn open_manager(settings: &StudioSettings) -> Result<ConfigurationManager, Box<dyn Error>> {
    let store = FileConfigurationStore::new(settings.configuration_dir.clone());
    let manager = ConfigurationManager::new(store);
    for configurator in builtin_configurators() {
        manager.register(configurator)?;
    }
    manager.initialize();
    Ok(manager)
}

fn parse_params(params: &[String]) -> Result<Parameters, Box<dyn Error>> {
    let mut parsed = Parameters::new();
    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| format!("parameter '{param}' must be key=value"))?;
        parsed.insert(key.trim().to_string(), value.to_string());
    }
    Ok(parsed)
}

fn handle_config_command(command: ConfigCommands, settings: &StudioSettings) -> CommandResult {
    let manager = open_manager(settings)?;
    match command {
        ConfigCommands::Types => {
            let types: Vec<(String, String)> = manager
                .all_type_ids()
                .into_iter()
                .filter_map(|id| {
                    let name = manager.get_configurator(&id)?.name().to_string();
                    Some((id, name))
                })
                .collect();
            print_type_list(&types);
        }
        ConfigCommands::List {
            type_id,
            json_query,
        } => {
            let configurables = manager.configurables(&type_id)?;
            if json_query {
                let configurables: Vec<&Configurable> =
                    configurables.iter().map(|c| c.as_ref()).collect();
                println!("{}", serde_json::to_string_pretty(&configurables)?);
            } else {
                let names: Vec<String> = configurables
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect();
                print_configurable_list(&type_id, &names);
            }
        }
        ConfigCommands::Show {
            type_id,
            name,
            json_query,
        } => {
            let configurable = manager.lookup(&type_id, &name, &Accessor::anonymous())?;
            if json_query {
                println!("{}", serde_json::to_string_pretty(configurable.as_ref())?);
            } else {
                print_configurable(&configurable);
            }
        }
        ConfigCommands::Create {
            type_id,
            name,
            params,
        } => {
            let parameters = parse_params(&params)?;
            manager.create_with_parameters(&type_id, &name, parameters)?;
            manager.save_configuration()?;
            print_info(&format!("Created {name} of type {type_id}"));
        }
        ConfigCommands::Remove { type_id, name } => {
            manager.remove(&type_id, &name)?;
            manager.save_configuration()?;
            print_info(&format!("Removed {name} of type {type_id}"));
        }
        ConfigCommands::Export { type_id } => {
            println!("{}", manager.configurables_as_xml(&type_id)?);
        }
        ConfigCommands::Import { type_id, file } => {
            let xml = std::fs::read_to_string(&file)
                .map_err(|err| format!("Failed to read '{}': {err}", file.display()))?;
            let imported = manager.import_xml(&xml, &type_id)?;
            manager.save_configuration()?;
            print_info(&format!("Imported {imported} objects of type {type_id}"));
        }
    }
    Ok(())
}

fn handle_packages_command(
    index: Option<&Path>,
    tab: &str,
    timeout_seconds: u64,
    settings: &StudioSettings,
) -> CommandResult {
    let tab: PackageTab = tab.parse()?;
    let index = index
        .or(settings.package_index.as_deref())
        .ok_or("no package index given; pass --index or set package_index")?;
    let server = Arc::new(JsonUpdateServer::load(index)?);
    let cache = Arc::new(PackageDescriptorCache::new(server.clone()));
    let mut model = PackageListModel::new(Arc::new(TabSource::new(server, tab)), cache)
        .with_version_selector(&settings.version_selector);
    let events = model.subscribe(&settings.event_channel_config());

    model.force_update()?;
    let deadline = Instant::now() + Duration::from_secs(timeout_seconds);
    let mut reported = None;
    while !model.wait_idle(Duration::from_millis(50)) {
        if reported != Some(model.completed()) {
            reported = Some(model.completed());
            print_info(&format!("Fetching {tab}: {}%", model.completed()));
        }
        if Instant::now() >= deadline {
            model.cancel();
            return Err(format!("fetching {tab} timed out").into());
        }
    }
    log::debug!("{} list events emitted", events.drain().len());

    if let Some(err) = model.last_error() {
        return Err(format!("fetching {tab} failed: {err}").into());
    }
    let entries: Vec<_> = (0..model.size())
        .filter_map(|index| model.element_at(index))
        .collect();
    print_package_entries(tab.key(), &entries);
    Ok(())
}

fn handle_expr_command(command: ExprCommands) -> CommandResult {
    match command {
        ExprCommands::ReplaceRegex { text, what, by } => {
            let registry = FunctionRegistry::with_builtins();
            let result = registry.call(
                "replace_regex",
                &[
                    ExpressionValue::Text(text),
                    ExpressionValue::Text(what),
                    ExpressionValue::Text(by),
                ],
            )?;
            println!("{result}");
        }
    }
    Ok(())
}

fn load_style(path: &Path) -> Result<PlotterStyleProvider, Box<dyn Error>> {
    let mut provider = PlotterStyleProvider::new();
    if path.exists() {
        let xml = std::fs::read_to_string(path)?;
        provider.load_from_xml(&xml)?;
    }
    Ok(provider)
}

fn handle_style_command(command: StyleCommands, settings: &StudioSettings) -> CommandResult {
    let path = settings.style_file();
    let mut provider = load_style(&path)?;
    match command {
        StyleCommands::Show => print_style(&provider),
        StyleCommands::Select { index } => {
            provider.set_selected_color_scheme_index(index)?;
            std::fs::create_dir_all(&settings.configuration_dir)?;
            std::fs::write(&path, provider.to_xml()?)?;
            print_info(&format!(
                "Selected color scheme {}",
                provider.color_scheme().name
            ));
        }
    }
    Ok(())
}
