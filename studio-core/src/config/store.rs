use super::configurator::Configurator;
use configuration::{parameter_sets_from_xml, parameter_sets_to_xml, ConfigurationError, ParameterSets, Parameters};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Where parameter sets live between runs.
pub trait ConfigurationStore: Send + Sync {
    fn load_all_parameters(
        &self,
        configurator: &dyn Configurator,
    ) -> Result<ParameterSets, ConfigurationError>;

    fn save_parameters(
        &self,
        configurator: &dyn Configurator,
        sets: &ParameterSets,
    ) -> Result<(), ConfigurationError>;
}

/// One `<type_id>.xml` document per configuration type.
#[derive(Debug, Clone)]
pub struct FileConfigurationStore {
    dir: PathBuf,
}

impl FileConfigurationStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path_for(&self, type_id: &str) -> PathBuf {
        self.dir.join(format!("{type_id}.xml"))
    }
}

impl ConfigurationStore for FileConfigurationStore {
    fn load_all_parameters(
        &self,
        configurator: &dyn Configurator,
    ) -> Result<ParameterSets, ConfigurationError> {
        let path = self.file_path_for(configurator.type_id());
        if !path.exists() {
            return Ok(ParameterSets::new());
        }
        let data = std::fs::read_to_string(&path)?;
        parameter_sets_from_xml(&data, configurator.type_id())
    }

    fn save_parameters(
        &self,
        configurator: &dyn Configurator,
        sets: &ParameterSets,
    ) -> Result<(), ConfigurationError> {
        let xml = parameter_sets_to_xml(configurator.type_id(), sets)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.file_path_for(configurator.type_id()), xml)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryConfigurationStore {
    types: Mutex<BTreeMap<String, ParameterSets>>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(self, type_id: &str, name: &str, parameters: Parameters) -> Self {
        self.insert(type_id, name, parameters);
        self
    }

    pub fn insert(&self, type_id: &str, name: &str, parameters: Parameters) {
        self.types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id.to_string())
            .or_default()
            .insert(name.to_string(), parameters);
    }

    pub fn parameters_of(&self, type_id: &str) -> Option<ParameterSets> {
        self.types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_id)
            .cloned()
    }
}

impl ConfigurationStore for MemoryConfigurationStore {
    fn load_all_parameters(
        &self,
        configurator: &dyn Configurator,
    ) -> Result<ParameterSets, ConfigurationError> {
        Ok(self.parameters_of(configurator.type_id()).unwrap_or_default())
    }

    fn save_parameters(
        &self,
        configurator: &dyn Configurator,
        sets: &ParameterSets,
    ) -> Result<(), ConfigurationError> {
        self.types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(configurator.type_id().to_string(), sets.clone());
        Ok(())
    }
}
