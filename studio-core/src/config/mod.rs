pub mod access;
pub mod builtin;
pub mod configurator;
pub mod manager;
pub mod store;

pub use access::{AccessPolicy, Accessor, AllowAll};
pub use builtin::builtin_configurators;
pub use configurator::{Configurable, Configurator, SimpleConfigurator};
pub use manager::ConfigurationManager;
pub use store::{ConfigurationStore, FileConfigurationStore, MemoryConfigurationStore};

pub use configuration::{ConfigurationError, ParameterKind, ParameterSets, ParameterType, Parameters};
