//! Fonts and color schemes used by the plotters, with the `<style>` XML form.

use channel::EventSender;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const STYLE_ROOT: &str = "style";
const AXES_FONT: &str = "axes_font";
const LEGEND_FONT: &str = "legend_font";
const TITLE_FONT: &str = "title_font";
const COLOR_SCHEME: &str = "color_scheme";
const COLORS: &str = "colors";
const COLOR: &str = "color";
const GRADIENT_START: &str = "gradient_start";
const GRADIENT_END: &str = "gradient_end";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
}

impl ColorRgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        Self { r, g, b, alpha }
    }
}

impl Default for ColorRgb {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub name: String,
    pub colors: Vec<ColorRgb>,
    pub gradient_start: ColorRgb,
    pub gradient_end: ColorRgb,
}

impl ColorScheme {
    /// The gradient runs from the first to the last color.
    pub fn new(name: &str, colors: Vec<ColorRgb>) -> Self {
        let gradient_start = colors.first().copied().unwrap_or_default();
        let gradient_end = colors.last().copied().unwrap_or_default();
        Self::with_gradient(name, colors, gradient_start, gradient_end)
    }

    pub fn with_gradient(
        name: &str,
        colors: Vec<ColorRgb>,
        gradient_start: ColorRgb,
        gradient_end: ColorRgb,
    ) -> Self {
        Self {
            name: name.to_string(),
            colors,
            gradient_start,
            gradient_end,
        }
    }
}

pub const FONT_PLAIN: u8 = 0;
pub const FONT_BOLD: u8 = 1;
pub const FONT_ITALIC: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub name: String,
    /// Bit set of [`FONT_BOLD`] and [`FONT_ITALIC`].
    pub style: u8,
    pub size: u32,
}

impl FontSpec {
    pub fn new(name: &str, style: u8, size: u32) -> Self {
        Self {
            name: name.to_string(),
            style,
            size,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Dialog", FONT_PLAIN, 10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleEvent {
    Changed,
}

#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    #[error("Cannot remove a default color scheme: {0}")]
    DefaultScheme(String),
    #[error("Cannot add a color scheme before the default color schemes (index {0})")]
    BeforeDefaults(usize),
    #[error("duplicate color scheme '{0}' not allowed")]
    DuplicateScheme(String),
    #[error("no color scheme named '{0}'")]
    NoSuchScheme(String),
    #[error("color scheme index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("XML root tag must be <style>, found <{0}>")]
    InvalidRoot(String),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_color_schemes() -> Vec<ColorScheme> {
    vec![
        ColorScheme::new(
            "Colorful",
            vec![
                ColorRgb::new(222, 217, 26),
                ColorRgb::new(219, 138, 47),
                ColorRgb::new(217, 26, 21),
                ColorRgb::new(83, 70, 255),
                ColorRgb::new(156, 217, 84),
            ],
        ),
        ColorScheme::new(
            "Forest",
            vec![
                ColorRgb::new(94, 173, 0),
                ColorRgb::new(255, 188, 10),
                ColorRgb::new(189, 39, 53),
                ColorRgb::new(255, 119, 0),
                ColorRgb::new(81, 17, 84),
            ],
        ),
    ]
}

/// Fonts and color schemes shared by all plotters.
///
/// The built-in schemes always stay at the front of the list and cannot be
/// removed. Scheme names are unique.
pub struct PlotterStyleProvider {
    schemes: Vec<ColorScheme>,
    default_count: usize,
    selected: usize,
    axes_font: FontSpec,
    legend_font: FontSpec,
    title_font: FontSpec,
    events: Option<EventSender<StyleEvent>>,
}

impl Default for PlotterStyleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotterStyleProvider {
    pub fn new() -> Self {
        let schemes = default_color_schemes();
        Self {
            default_count: schemes.len(),
            schemes,
            selected: 0,
            axes_font: FontSpec::default(),
            legend_font: FontSpec::default(),
            title_font: FontSpec::default(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender<StyleEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn changed(&self) {
        if let Some(events) = &self.events {
            if let Err(err) = events.try_send(StyleEvent::Changed) {
                log::warn!("dropping style change notification: {err}");
            }
        }
    }

    pub fn axes_font(&self) -> &FontSpec {
        &self.axes_font
    }

    pub fn set_axes_font(&mut self, font: FontSpec) {
        self.axes_font = font;
        self.changed();
    }

    pub fn legend_font(&self) -> &FontSpec {
        &self.legend_font
    }

    pub fn set_legend_font(&mut self, font: FontSpec) {
        self.legend_font = font;
        self.changed();
    }

    pub fn title_font(&self) -> &FontSpec {
        &self.title_font
    }

    pub fn set_title_font(&mut self, font: FontSpec) {
        self.title_font = font;
        self.changed();
    }

    pub fn color_schemes(&self) -> Vec<ColorScheme> {
        self.schemes.clone()
    }

    pub fn default_scheme_count(&self) -> usize {
        self.default_count
    }

    pub fn is_default_scheme(&self, name: &str) -> bool {
        self.schemes[..self.default_count]
            .iter()
            .any(|s| s.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.schemes.iter().position(|s| s.name == name)
    }

    pub fn selected_color_scheme_index(&self) -> usize {
        self.selected
    }

    pub fn color_scheme(&self) -> &ColorScheme {
        &self.schemes[self.selected]
    }

    pub fn add_color_scheme(&mut self, scheme: ColorScheme) -> Result<usize, StyleError> {
        self.add_color_scheme_at(scheme, self.schemes.len())
    }

    /// Indices past the end append.
    pub fn add_color_scheme_at(
        &mut self,
        scheme: ColorScheme,
        index: usize,
    ) -> Result<usize, StyleError> {
        if index < self.default_count {
            return Err(StyleError::BeforeDefaults(index));
        }
        if self.position(&scheme.name).is_some() {
            return Err(StyleError::DuplicateScheme(scheme.name));
        }
        let index = index.min(self.schemes.len());
        self.schemes.insert(index, scheme);
        if index <= self.selected {
            self.selected += 1;
        }
        self.changed();
        Ok(index)
    }

    /// Removing the selected scheme selects the one before it.
    pub fn remove_color_scheme_at(&mut self, index: usize) -> Result<ColorScheme, StyleError> {
        if index >= self.schemes.len() {
            return Err(StyleError::IndexOutOfRange {
                index,
                len: self.schemes.len(),
            });
        }
        if index < self.default_count {
            return Err(StyleError::DefaultScheme(self.schemes[index].name.clone()));
        }
        let removed = self.schemes.remove(index);
        if index <= self.selected {
            self.selected -= 1;
        }
        self.changed();
        Ok(removed)
    }

    pub fn remove_color_scheme(&mut self, name: &str) -> Result<ColorScheme, StyleError> {
        if self.is_default_scheme(name) {
            return Err(StyleError::DefaultScheme(name.to_string()));
        }
        let index = self
            .position(name)
            .ok_or_else(|| StyleError::NoSuchScheme(name.to_string()))?;
        self.remove_color_scheme_at(index)
    }

    pub fn set_selected_color_scheme_index(&mut self, index: usize) -> Result<(), StyleError> {
        if index >= self.schemes.len() {
            return Err(StyleError::IndexOutOfRange {
                index,
                len: self.schemes.len(),
            });
        }
        self.selected = index;
        self.changed();
        Ok(())
    }

    /// Unknown schemes are appended first. A known custom scheme takes the new colors.
    pub fn set_selected_color_scheme(&mut self, scheme: ColorScheme) -> Result<(), StyleError> {
        let index = match self.position(&scheme.name) {
            Some(index) => {
                if index >= self.default_count {
                    self.schemes[index] = scheme;
                }
                index
            }
            None => self.add_color_scheme(scheme)?,
        };
        self.set_selected_color_scheme_index(index)
    }

    /// Writes the fonts and the selected scheme.
    pub fn to_xml(&self) -> Result<String, StyleError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(STYLE_ROOT)))?;
        for (tag, font) in [
            (AXES_FONT, &self.axes_font),
            (LEGEND_FONT, &self.legend_font),
            (TITLE_FONT, &self.title_font),
        ] {
            let mut element = BytesStart::new(tag);
            element.push_attribute(("name", font.name.as_str()));
            element.push_attribute(("style", font.style.to_string().as_str()));
            element.push_attribute(("size", font.size.to_string().as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        let scheme = self.color_scheme();
        let mut element = BytesStart::new(COLOR_SCHEME);
        element.push_attribute(("name", scheme.name.as_str()));
        push_color_attributes(&mut element, GRADIENT_START, &scheme.gradient_start);
        push_color_attributes(&mut element, GRADIENT_END, &scheme.gradient_end);
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Start(BytesStart::new(COLORS)))?;
        for color in &scheme.colors {
            let mut element = BytesStart::new(COLOR);
            push_color_attributes(&mut element, "", color);
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new(COLORS)))?;
        writer.write_event(Event::End(BytesEnd::new(COLOR_SCHEME)))?;
        writer.write_event(Event::End(BytesEnd::new(STYLE_ROOT)))?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Applies a `<style>` document. Entries that fail to parse are logged and skipped.
    pub fn load_from_xml(&mut self, xml: &str) -> Result<(), StyleError> {
        for setting in read_settings(xml)? {
            let applied = match setting.tag.as_str() {
                AXES_FONT => parse_font(&setting.attributes).map(|f| self.set_axes_font(f)),
                LEGEND_FONT => parse_font(&setting.attributes).map(|f| self.set_legend_font(f)),
                TITLE_FONT => parse_font(&setting.attributes).map(|f| self.set_title_font(f)),
                COLOR_SCHEME => parse_scheme(&setting)
                    .and_then(|s| self.set_selected_color_scheme(s).map_err(|e| e.to_string())),
                _ => Ok(()),
            };
            if let Err(reason) = applied {
                log::warn!("Could not restore {} for style provider: {reason}", setting.tag);
            }
        }
        Ok(())
    }
}

fn push_color_attributes(element: &mut BytesStart, prefix: &str, color: &ColorRgb) {
    let key = |component: &str| {
        if prefix.is_empty() {
            component.to_string()
        } else {
            format!("{prefix}_{component}")
        }
    };
    for (component, value) in [
        ("alpha", color.alpha),
        ("r", color.r),
        ("g", color.g),
        ("b", color.b),
    ] {
        element.push_attribute((key(component).as_str(), value.to_string().as_str()));
    }
}

type Attributes = BTreeMap<String, String>;

/// One direct child of `<style>`; `colors` holds the `<color>` entries of a scheme.
struct Setting {
    tag: String,
    attributes: Attributes,
    colors: Vec<Attributes>,
}

fn attributes_of(element: &BytesStart) -> Result<Attributes, StyleError> {
    let mut attributes = Attributes::new();
    for attribute in element.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        attributes.insert(key, attribute.unescape_value()?.into_owned());
    }
    Ok(attributes)
}

fn read_settings(xml: &str) -> Result<Vec<Setting>, StyleError> {
    let mut reader = Reader::from_str(xml);
    let mut settings = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut root_seen = false;

    loop {
        let (element, is_empty) = match reader.read_event()? {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(_) => {
                stack.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        match stack.len() {
            0 => {
                if tag != STYLE_ROOT {
                    return Err(StyleError::InvalidRoot(tag));
                }
                root_seen = true;
            }
            1 => settings.push(Setting {
                tag: tag.clone(),
                attributes: attributes_of(&element)?,
                colors: Vec::new(),
            }),
            3 if tag == COLOR && stack[2] == COLORS && stack[1] == COLOR_SCHEME => {
                if let Some(setting) = settings.last_mut() {
                    setting.colors.push(attributes_of(&element)?);
                }
            }
            _ => {}
        }
        if !is_empty {
            stack.push(tag);
        }
    }

    if !root_seen {
        return Err(StyleError::InvalidRoot("(none)".to_string()));
    }
    Ok(settings)
}

fn parse_attribute<T: FromStr>(attributes: &Attributes, key: &str) -> Result<T, String> {
    let value = attributes
        .get(key)
        .ok_or_else(|| format!("missing attribute '{key}'"))?;
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value '{value}' for '{key}'"))
}

fn parse_font(attributes: &Attributes) -> Result<FontSpec, String> {
    let name = attributes.get("name").cloned().unwrap_or_default();
    Ok(FontSpec {
        name,
        style: parse_attribute(attributes, "style")?,
        size: parse_attribute(attributes, "size")?,
    })
}

fn parse_color(attributes: &Attributes, prefix: &str) -> Result<ColorRgb, String> {
    let key = |component: &str| {
        if prefix.is_empty() {
            component.to_string()
        } else {
            format!("{prefix}_{component}")
        }
    };
    Ok(ColorRgb {
        r: parse_attribute(attributes, &key("r"))?,
        g: parse_attribute(attributes, &key("g"))?,
        b: parse_attribute(attributes, &key("b"))?,
        alpha: parse_attribute(attributes, &key("alpha"))?,
    })
}

fn parse_scheme(setting: &Setting) -> Result<ColorScheme, String> {
    let colors = setting
        .colors
        .iter()
        .map(|attributes| parse_color(attributes, ""))
        .collect::<Result<Vec<_>, _>>()?;
    let name = setting.attributes.get("name").cloned().unwrap_or_default();
    Ok(ColorScheme::with_gradient(
        &name,
        colors,
        parse_color(&setting.attributes, GRADIENT_START)?,
        parse_color(&setting.attributes, GRADIENT_END)?,
    ))
}
