use super::access::{AccessPolicy, Accessor, AllowAll};
use super::configurator::{Configurable, Configurator};
use super::store::ConfigurationStore;
use configuration::{
    apply_defaults, parameter_sets_from_xml, parameter_sets_to_xml, validate_type_id,
    ConfigurationError, ParameterSets, Parameters,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Registry {
    configurators: BTreeMap<String, Arc<dyn Configurator>>,
    configurables: BTreeMap<String, BTreeMap<String, Arc<Configurable>>>,
    initialized: bool,
}

impl Registry {
    fn configurator(&self, type_id: &str) -> Result<Arc<dyn Configurator>, ConfigurationError> {
        self.configurators
            .get(type_id)
            .cloned()
            .ok_or_else(|| ConfigurationError::NoSuchType(type_id.to_string()))
    }

    /// The factory result must carry the requested type id and name.
    fn add_configurable(
        &mut self,
        type_id: &str,
        name: &str,
        configurable: Configurable,
    ) -> Result<Arc<Configurable>, ConfigurationError> {
        if configurable.type_id() != type_id || configurable.name() != name {
            return Err(ConfigurationError::FactoryMismatch {
                type_id: type_id.to_string(),
                name: name.to_string(),
                actual_type_id: configurable.type_id().to_string(),
                actual_name: configurable.name().to_string(),
            });
        }
        let by_name = self
            .configurables
            .get_mut(type_id)
            .ok_or_else(|| ConfigurationError::NoSuchType(type_id.to_string()))?;
        let configurable = Arc::new(configurable);
        by_name.insert(name.to_string(), configurable.clone());
        Ok(configurable)
    }

    /// Creates one object per set through the factory; failures are logged and skipped.
    fn instantiate(&mut self, configurator: &dyn Configurator, sets: ParameterSets) -> usize {
        let mut loaded = 0;
        for (name, mut parameters) in sets {
            apply_defaults(&mut parameters, configurator.parameter_types());
            let created = configurator
                .create(&name, parameters)
                .and_then(|configurable| {
                    self.add_configurable(configurator.type_id(), &name, configurable)
                });
            match created {
                Ok(_) => loaded += 1,
                Err(err) => log::warn!(
                    "Failed to configure '{name}' of type {}: {err}",
                    configurator.name()
                ),
            }
        }
        loaded
    }
}

/// Registry of configuration types and their configured objects.
///
/// Both maps and the initialization flag sit behind one lock, so registration,
/// initialization and lookups from different threads never observe a type
/// without its object map.
pub struct ConfigurationManager {
    store: Box<dyn ConfigurationStore>,
    access: Box<dyn AccessPolicy>,
    registry: Mutex<Registry>,
}

impl ConfigurationManager {
    pub fn new(store: impl ConfigurationStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            access: Box::new(AllowAll),
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn with_access_policy(mut self, policy: impl AccessPolicy + 'static) -> Self {
        self.access = Box::new(policy);
        self
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registering a type id twice is an error; use [`Self::unregister`] first.
    /// Types registered after [`Self::initialize`] load their stored objects right away.
    pub fn register(&self, configurator: Arc<dyn Configurator>) -> Result<(), ConfigurationError> {
        let type_id = configurator.type_id().to_string();
        validate_type_id(&type_id)?;
        let mut registry = self.registry();
        if registry.configurators.contains_key(&type_id) {
            return Err(ConfigurationError::DuplicateType(type_id));
        }
        registry
            .configurators
            .insert(type_id.clone(), configurator.clone());
        registry.configurables.insert(type_id, BTreeMap::new());
        if registry.initialized {
            self.load_type(&mut registry, configurator.as_ref());
        }
        Ok(())
    }

    /// Removes the type together with all of its objects, which are returned.
    pub fn unregister(&self, type_id: &str) -> Result<Vec<Arc<Configurable>>, ConfigurationError> {
        let mut registry = self.registry();
        registry
            .configurators
            .remove(type_id)
            .ok_or_else(|| ConfigurationError::NoSuchType(type_id.to_string()))?;
        let removed = registry
            .configurables
            .remove(type_id)
            .map(|by_name| by_name.into_values().collect())
            .unwrap_or_default();
        Ok(removed)
    }

    pub fn get_configurator(&self, type_id: &str) -> Option<Arc<dyn Configurator>> {
        self.registry().configurators.get(type_id).cloned()
    }

    /// Sorted, without duplicates.
    pub fn all_type_ids(&self) -> Vec<String> {
        self.registry().configurators.keys().cloned().collect()
    }

    pub fn is_initialized(&self) -> bool {
        self.registry().initialized
    }

    /// Loads all stored objects on the first call; later calls do nothing.
    pub fn initialize(&self) {
        let mut registry = self.registry();
        if registry.initialized {
            return;
        }
        let configurators: Vec<Arc<dyn Configurator>> =
            registry.configurators.values().cloned().collect();
        for configurator in &configurators {
            self.load_type(&mut registry, configurator.as_ref());
        }
        registry.initialized = true;
    }

    fn load_type(&self, registry: &mut Registry, configurator: &dyn Configurator) {
        let sets = match self.store.load_all_parameters(configurator) {
            Ok(sets) => sets,
            Err(err) => {
                log::warn!(
                    "Failed to load configuration for {}: {err}",
                    configurator.name()
                );
                return;
            }
        };
        let loaded = registry.instantiate(configurator, sets);
        log::info!(
            "Loaded configurations for {loaded} objects of type {}.",
            configurator.name()
        );
    }

    pub fn lookup(
        &self,
        type_id: &str,
        name: &str,
        accessor: &Accessor,
    ) -> Result<Arc<Configurable>, ConfigurationError> {
        self.access.check_access(type_id, name, accessor)?;
        let registry = self.registry();
        let by_name = registry
            .configurables
            .get(type_id)
            .ok_or_else(|| ConfigurationError::NoSuchType(type_id.to_string()))?;
        by_name.get(name).cloned().ok_or_else(|| {
            let type_name = registry
                .configurators
                .get(type_id)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| type_id.to_string());
            ConfigurationError::NoSuchConfigurable {
                name: name.to_string(),
                type_name,
            }
        })
    }

    pub fn create(&self, type_id: &str, name: &str) -> Result<Arc<Configurable>, ConfigurationError> {
        self.create_with_parameters(type_id, name, Parameters::new())
    }

    /// Fails instead of replacing an existing object of the same name.
    pub fn create_with_parameters(
        &self,
        type_id: &str,
        name: &str,
        parameters: Parameters,
    ) -> Result<Arc<Configurable>, ConfigurationError> {
        let mut registry = self.registry();
        let configurator = registry.configurator(type_id)?;
        let exists = registry
            .configurables
            .get(type_id)
            .is_some_and(|by_name| by_name.contains_key(name));
        if exists {
            return Err(ConfigurationError::DuplicateConfigurable {
                type_id: type_id.to_string(),
                name: name.to_string(),
            });
        }
        let configurable = configurator.create(name, parameters)?;
        registry.add_configurable(type_id, name, configurable)
    }

    pub fn remove(&self, type_id: &str, name: &str) -> Result<Arc<Configurable>, ConfigurationError> {
        let mut registry = self.registry();
        let configurator = registry.configurator(type_id)?;
        registry
            .configurables
            .get_mut(type_id)
            .and_then(|by_name| by_name.remove(name))
            .ok_or_else(|| ConfigurationError::NoSuchConfigurable {
                name: name.to_string(),
                type_name: configurator.name().to_string(),
            })
    }

    /// Objects of one type, sorted by name.
    pub fn configurables(&self, type_id: &str) -> Result<Vec<Arc<Configurable>>, ConfigurationError> {
        self.registry()
            .configurables
            .get(type_id)
            .map(|by_name| by_name.values().cloned().collect())
            .ok_or_else(|| ConfigurationError::NoSuchType(type_id.to_string()))
    }

    pub fn parameter_sets(&self, type_id: &str) -> Result<ParameterSets, ConfigurationError> {
        Ok(self
            .configurables(type_id)?
            .iter()
            .map(|c| (c.name().to_string(), c.parameters().clone()))
            .collect())
    }

    pub fn configurables_as_xml(&self, type_id: &str) -> Result<String, ConfigurationError> {
        let sets = self.parameter_sets(type_id)?;
        parameter_sets_to_xml(type_id, &sets)
    }

    /// Parses a `<configuration>` document without registering anything.
    pub fn from_xml(&self, xml: &str, type_id: &str) -> Result<ParameterSets, ConfigurationError> {
        self.registry().configurator(type_id)?;
        parameter_sets_from_xml(xml, type_id)
    }

    /// Parses and registers; entries the factory rejects are logged and skipped.
    pub fn import_xml(&self, xml: &str, type_id: &str) -> Result<usize, ConfigurationError> {
        let mut registry = self.registry();
        let configurator = registry.configurator(type_id)?;
        let sets = parameter_sets_from_xml(xml, type_id)?;
        Ok(registry.instantiate(configurator.as_ref(), sets))
    }

    /// Hands every type to the store; returns the first failure after trying all.
    pub fn save_configuration(&self) -> Result<(), ConfigurationError> {
        let snapshot: Vec<(Arc<dyn Configurator>, ParameterSets)> = {
            let registry = self.registry();
            registry
                .configurators
                .iter()
                .map(|(type_id, configurator)| {
                    let sets = registry
                        .configurables
                        .get(type_id)
                        .map(|by_name| {
                            by_name
                                .iter()
                                .map(|(name, c)| (name.clone(), c.parameters().clone()))
                                .collect()
                        })
                        .unwrap_or_default();
                    (configurator.clone(), sets)
                })
                .collect()
        };

        let mut first_error = None;
        for (configurator, sets) in snapshot {
            if let Err(err) = self.store.save_parameters(configurator.as_ref(), &sets) {
                log::error!(
                    "Failed to save configuration for {}: {err}",
                    configurator.name()
                );
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
