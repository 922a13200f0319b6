//! The `<configuration>` document format.
//!
//! ```xml
//! <configuration>
//!   <database name="warehouse">
//!     <url>jdbc:postgresql://db/warehouse</url>
//!     <user>etl</user>
//!   </database>
//! </configuration>
//! ```
//!
//! Every configured object is an element named after its type id, carrying a
//! `name` attribute and one child element per parameter whose text is the value.

use crate::{is_valid_element_name, validate_type_id, ConfigurationError, ParameterSets, Parameters};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

pub const CONFIGURATION_ROOT: &str = "configuration";
pub const NAME_ATTRIBUTE: &str = "name";

pub fn parameter_sets_to_xml(
    type_id: &str,
    sets: &ParameterSets,
) -> Result<String, ConfigurationError> {
    validate_type_id(type_id)?;
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(CONFIGURATION_ROOT)))?;
    for (name, parameters) in sets {
        write_configurable(&mut writer, type_id, name, parameters)?;
    }
    writer.write_event(Event::End(BytesEnd::new(CONFIGURATION_ROOT)))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| ConfigurationError::Store(format!("generated XML is not UTF-8: {e}")))
}

fn write_configurable(
    writer: &mut Writer<Vec<u8>>,
    type_id: &str,
    name: &str,
    parameters: &Parameters,
) -> Result<(), ConfigurationError> {
    let mut element = BytesStart::new(type_id);
    element.push_attribute((NAME_ATTRIBUTE, name));
    writer.write_event(Event::Start(element))?;
    for (key, value) in parameters {
        if !is_valid_element_name(key) {
            return Err(ConfigurationError::InvalidParameter {
                key: key.clone(),
                value: value.clone(),
                reason: "parameter keys must be XML element names".to_string(),
            });
        }
        writer.write_event(Event::Start(BytesStart::new(key.as_str())))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(key.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new(type_id)))?;
    Ok(())
}

/// Reads the parameter sets of `type_id`; elements of other types are ignored.
pub fn parameter_sets_from_xml(
    xml: &str,
    type_id: &str,
) -> Result<ParameterSets, ConfigurationError> {
    let mut reader = Reader::from_str(xml);
    let mut result = ParameterSets::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut current: Option<(String, Parameters)> = None;
    let mut parameter: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                depth += 1;
                let tag = element_name(&element);
                match depth {
                    1 => {
                        check_root(&tag)?;
                        root_seen = true;
                    }
                    2 if tag == type_id => {
                        current = Some((name_attribute(&element)?, Parameters::new()));
                    }
                    3 if current.is_some() => parameter = Some((tag, String::new())),
                    _ => {}
                }
            }
            Event::Empty(element) => {
                let tag = element_name(&element);
                match depth + 1 {
                    1 => {
                        check_root(&tag)?;
                        root_seen = true;
                    }
                    2 if tag == type_id => {
                        result.insert(name_attribute(&element)?, Parameters::new());
                    }
                    3 => {
                        if let Some((_, parameters)) = current.as_mut() {
                            parameters.insert(tag, String::new());
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if let Some((_, value)) = parameter.as_mut() {
                    value.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = parameter.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some((key, value)), Some((_, parameters))) =
                            (parameter.take(), current.as_mut())
                        {
                            parameters.insert(key, value);
                        }
                    }
                    2 => {
                        if let Some((name, parameters)) = current.take() {
                            result.insert(name, parameters);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(ConfigurationError::InvalidRoot("(none)".to_string()));
    }
    Ok(result)
}

fn check_root(tag: &str) -> Result<(), ConfigurationError> {
    if tag == CONFIGURATION_ROOT {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidRoot(tag.to_string()))
    }
}

fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// A missing attribute reads as the empty name.
fn name_attribute(element: &BytesStart) -> Result<String, ConfigurationError> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == NAME_ATTRIBUTE.as_bytes() {
            return Ok(attribute.unescape_value()?.into_owned());
        }
    }
    Ok(String::new())
}
