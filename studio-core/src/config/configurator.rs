use configuration::{validate_object_name, ConfigurationError, ParameterType, Parameters};
use serde::Serialize;

/// Type descriptor and factory for one kind of configured object.
pub trait Configurator: Send + Sync {
    /// Unique key of the type; also used as XML element name.
    fn type_id(&self) -> &str;

    /// Human readable name used in messages.
    fn name(&self) -> &str;

    fn parameter_types(&self) -> &[ParameterType];

    fn create(&self, name: &str, parameters: Parameters)
        -> Result<Configurable, ConfigurationError>;

    fn parameter_type(&self, key: &str) -> Option<&ParameterType> {
        self.parameter_types().iter().find(|p| p.key == key)
    }
}

/// A named set of resolved parameter values, identified by `(type_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configurable {
    type_id: String,
    name: String,
    parameters: Parameters,
}

impl Configurable {
    pub fn new(type_id: &str, name: &str, parameters: Parameters) -> Self {
        Self {
            type_id: type_id.to_string(),
            name: name.to_string(),
            parameters,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// Configurator described entirely by its parameter declarations.
#[derive(Debug, Clone)]
pub struct SimpleConfigurator {
    type_id: String,
    name: String,
    parameter_types: Vec<ParameterType>,
}

impl SimpleConfigurator {
    pub fn new(type_id: &str, name: &str, parameter_types: Vec<ParameterType>) -> Self {
        Self {
            type_id: type_id.to_string(),
            name: name.to_string(),
            parameter_types,
        }
    }
}

impl Configurator for SimpleConfigurator {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> &[ParameterType] {
        &self.parameter_types
    }

    fn create(
        &self,
        name: &str,
        parameters: Parameters,
    ) -> Result<Configurable, ConfigurationError> {
        validate_object_name(name)?;
        for (key, value) in &parameters {
            let parameter_type =
                self.parameter_type(key)
                    .ok_or_else(|| ConfigurationError::UnknownParameter {
                        key: key.clone(),
                        type_name: self.name.clone(),
                    })?;
            parameter_type.validate(value)?;
        }
        Ok(Configurable::new(&self.type_id, name, parameters))
    }
}
