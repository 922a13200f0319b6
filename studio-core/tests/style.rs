use channel::{event_channel, ChannelConfig};
use studio_core::style::{
    ColorRgb, ColorScheme, FontSpec, PlotterStyleProvider, StyleError, StyleEvent, FONT_BOLD,
};

fn ocean() -> ColorScheme {
    ColorScheme::new(
        "Ocean",
        vec![ColorRgb::new(0, 40, 80), ColorRgb::new(0, 120, 200)],
    )
}

#[test]
fn defaults_match_builtin_schemes_and_fonts() {
    let provider = PlotterStyleProvider::new();
    let names: Vec<String> = provider
        .color_schemes()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Colorful", "Forest"]);
    let colorful = provider.color_scheme();
    assert_eq!(colorful.colors[0], ColorRgb::new(222, 217, 26));
    assert_eq!(colorful.gradient_start, ColorRgb::new(222, 217, 26));
    assert_eq!(colorful.gradient_end, ColorRgb::new(156, 217, 84));
    assert_eq!(provider.axes_font(), &FontSpec::new("Dialog", 0, 10));
    assert_eq!(provider.title_font().size, 10);
}

#[test]
fn default_schemes_cannot_be_removed() {
    let mut provider = PlotterStyleProvider::new();
    assert!(matches!(
        provider.remove_color_scheme("Forest"),
        Err(StyleError::DefaultScheme(_))
    ));
    assert!(matches!(
        provider.remove_color_scheme_at(0),
        Err(StyleError::DefaultScheme(_))
    ));
    assert_eq!(provider.color_schemes().len(), 2);
}

#[test]
fn duplicates_and_inserts_before_defaults_are_rejected() {
    let mut provider = PlotterStyleProvider::new();
    assert_eq!(provider.add_color_scheme(ocean()).unwrap(), 2);
    assert!(matches!(
        provider.add_color_scheme(ocean()),
        Err(StyleError::DuplicateScheme(name)) if name == "Ocean"
    ));
    let dusk = ColorScheme::new("Dusk", vec![ColorRgb::new(1, 2, 3)]);
    assert!(matches!(
        provider.add_color_scheme_at(dusk.clone(), 1),
        Err(StyleError::BeforeDefaults(1))
    ));
    assert_eq!(provider.add_color_scheme_at(dusk, 99).unwrap(), 3);
}

#[test]
fn selection_follows_inserts_and_removals() {
    let mut provider = PlotterStyleProvider::new();
    provider.add_color_scheme(ocean()).unwrap();
    provider.set_selected_color_scheme_index(2).unwrap();
    assert_eq!(provider.color_scheme().name, "Ocean");

    let dusk = ColorScheme::new("Dusk", vec![ColorRgb::new(1, 2, 3)]);
    provider.add_color_scheme_at(dusk, 2).unwrap();
    assert_eq!(provider.color_scheme().name, "Ocean");

    provider.remove_color_scheme("Dusk").unwrap();
    assert_eq!(provider.color_scheme().name, "Ocean");

    provider.remove_color_scheme_at(2).unwrap();
    assert_eq!(provider.selected_color_scheme_index(), 1);
    assert_eq!(provider.color_scheme().name, "Forest");
}

#[test]
fn selecting_out_of_range_fails() {
    let mut provider = PlotterStyleProvider::new();
    assert!(matches!(
        provider.set_selected_color_scheme_index(2),
        Err(StyleError::IndexOutOfRange { index: 2, len: 2 })
    ));
    assert_eq!(provider.selected_color_scheme_index(), 0);
}

#[test]
fn selecting_unknown_scheme_appends_it() {
    let mut provider = PlotterStyleProvider::new();
    provider.set_selected_color_scheme(ocean()).unwrap();
    assert_eq!(provider.color_schemes().len(), 3);
    assert_eq!(provider.selected_color_scheme_index(), 2);

    let forest = provider.color_schemes()[1].clone();
    provider.set_selected_color_scheme(forest).unwrap();
    assert_eq!(provider.selected_color_scheme_index(), 1);
    assert_eq!(provider.color_schemes().len(), 3);
}

#[test]
fn mutations_notify_listeners() {
    let (tx, rx) = event_channel(&ChannelConfig::default());
    let mut provider = PlotterStyleProvider::new().with_events(tx);
    provider.set_axes_font(FontSpec::new("Serif", FONT_BOLD, 12));
    provider.add_color_scheme(ocean()).unwrap();
    provider.set_selected_color_scheme_index(2).unwrap();
    assert!(provider.remove_color_scheme("Colorful").is_err());
    assert_eq!(rx.drain(), vec![StyleEvent::Changed; 3]);
}

#[test]
fn xml_restores_fonts_and_selected_scheme() {
    let mut provider = PlotterStyleProvider::new();
    provider.set_title_font(FontSpec::new("Serif & Sans", FONT_BOLD, 14));
    let custom = ColorScheme::with_gradient(
        "Night <blue>",
        vec![
            ColorRgb::with_alpha(10, 20, 30, 128),
            ColorRgb::new(40, 50, 60),
        ],
        ColorRgb::new(1, 1, 1),
        ColorRgb::new(2, 2, 2),
    );
    provider.set_selected_color_scheme(custom.clone()).unwrap();
    let xml = provider.to_xml().unwrap();
    assert!(xml.contains("<style>"));
    assert!(xml.contains("gradient_start_alpha=\"255\""));

    let mut restored = PlotterStyleProvider::new();
    restored.load_from_xml(&xml).unwrap();
    assert_eq!(restored.title_font(), &FontSpec::new("Serif & Sans", FONT_BOLD, 14));
    assert_eq!(restored.color_scheme(), &custom);
}

#[test]
fn xml_with_default_scheme_selects_it() {
    let mut provider = PlotterStyleProvider::new();
    provider.set_selected_color_scheme_index(1).unwrap();
    let xml = provider.to_xml().unwrap();

    let mut restored = PlotterStyleProvider::new();
    restored.load_from_xml(&xml).unwrap();
    assert_eq!(restored.selected_color_scheme_index(), 1);
    assert_eq!(restored.color_schemes().len(), 2);
}

#[test]
fn broken_entries_are_skipped() {
    let xml = r#"<style>
        <axes_font name="Mono" style="bold" size="12"/>
        <legend_font name="Mono" style="2" size="11"/>
        <color_scheme name="Half" gradient_start_alpha="255" gradient_start_r="1"
            gradient_start_g="1" gradient_start_b="1">
            <colors><color alpha="255" r="1" g="2" b="3"/></colors>
        </color_scheme>
    </style>"#;
    let mut provider = PlotterStyleProvider::new();
    provider.load_from_xml(xml).unwrap();
    assert_eq!(provider.axes_font(), &FontSpec::default());
    assert_eq!(provider.legend_font(), &FontSpec::new("Mono", 2, 11));
    assert_eq!(provider.color_schemes().len(), 2);
}

#[test]
fn wrong_root_is_rejected() {
    let mut provider = PlotterStyleProvider::new();
    assert!(matches!(
        provider.load_from_xml("<configuration/>"),
        Err(StyleError::InvalidRoot(tag)) if tag == "configuration"
    ));
}
