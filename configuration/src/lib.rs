use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod xml;
pub use xml::{parameter_sets_from_xml, parameter_sets_to_xml, CONFIGURATION_ROOT, NAME_ATTRIBUTE};

/// Resolved parameter values of one configured object, keyed by parameter key.
pub type Parameters = BTreeMap<String, String>;

/// All parameter sets of one configuration type, keyed by object name.
pub type ParameterSets = BTreeMap<String, Parameters>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Integer,
    Real,
    Boolean,
    Category(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterType {
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub default: Option<String>,
}

impl ParameterType {
    pub fn new(key: &str, kind: ParameterKind) -> Self {
        Self {
            key: key.to_string(),
            description: String::new(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn default_value_as_string(&self) -> Option<String> {
        self.default.clone()
    }

    pub fn validate(&self, value: &str) -> Result<(), ConfigurationError> {
        let valid = match &self.kind {
            ParameterKind::String => true,
            ParameterKind::Integer => value.trim().parse::<i64>().is_ok(),
            ParameterKind::Real => value.trim().parse::<f64>().is_ok(),
            ParameterKind::Boolean => matches!(value.trim(), "true" | "false"),
            ParameterKind::Category(values) => values.iter().any(|v| v == value),
        };
        if valid {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidParameter {
                key: self.key.clone(),
                value: value.to_string(),
                reason: self.kind_description(),
            })
        }
    }

    fn kind_description(&self) -> String {
        match &self.kind {
            ParameterKind::String => "expected text".to_string(),
            ParameterKind::Integer => "expected an integer".to_string(),
            ParameterKind::Real => "expected a real number".to_string(),
            ParameterKind::Boolean => "expected 'true' or 'false'".to_string(),
            ParameterKind::Category(values) => format!("expected one of {}", values.join(", ")),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("No such configuration type: {0}")]
    NoSuchType(String),
    #[error("No such configured object of name {name} of {type_name}")]
    NoSuchConfigurable { name: String, type_name: String },
    #[error("configuration type '{0}' is already registered")]
    DuplicateType(String),
    #[error("configured object '{name}' of type '{type_id}' already exists")]
    DuplicateConfigurable { type_id: String, name: String },
    #[error("factory for '{type_id}' returned '{actual_name}' of type '{actual_type_id}' instead of '{name}'")]
    FactoryMismatch {
        type_id: String,
        name: String,
        actual_type_id: String,
        actual_name: String,
    },
    #[error("invalid type id '{0}': must be a non-empty XML element name")]
    InvalidTypeId(String),
    #[error("invalid name '{0}'")]
    InvalidName(String),
    #[error("unknown parameter '{key}' for {type_name}")]
    UnknownParameter { key: String, type_name: String },
    #[error("invalid value '{value}' for parameter '{key}': {reason}")]
    InvalidParameter {
        key: String,
        value: String,
        reason: String,
    },
    #[error("access to '{name}' of type '{type_id}' denied for {user}")]
    AccessDenied {
        type_id: String,
        name: String,
        user: String,
    },
    #[error("XML root tag must be <configuration>, found <{0}>")]
    InvalidRoot(String),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(String),
}

/// True if `name` can be used as an XML element name (ASCII subset, no namespaces).
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if name.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("xml")) {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub fn validate_type_id(type_id: &str) -> Result<(), ConfigurationError> {
    if is_valid_element_name(type_id) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTypeId(type_id.to_string()))
    }
}

pub fn validate_object_name(name: &str) -> Result<(), ConfigurationError> {
    if name.trim().is_empty() {
        Err(ConfigurationError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Fills every declared parameter that is absent from `parameters` and has a default.
pub fn apply_defaults(parameters: &mut Parameters, types: &[ParameterType]) {
    for parameter_type in types {
        if parameters.contains_key(&parameter_type.key) {
            continue;
        }
        if let Some(default) = parameter_type.default_value_as_string() {
            parameters.insert(parameter_type.key.clone(), default);
        }
    }
}
