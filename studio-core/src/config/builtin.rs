use super::configurator::{Configurator, SimpleConfigurator};
use configuration::{ParameterKind, ParameterType};
use std::sync::Arc;

pub const DATABASE_TYPE_ID: &str = "database";
pub const WEB_SERVICE_TYPE_ID: &str = "web_service";

pub fn database_configurator() -> SimpleConfigurator {
    SimpleConfigurator::new(
        DATABASE_TYPE_ID,
        "Database Connection",
        vec![
            ParameterType::new("url", ParameterKind::String)
                .with_description("JDBC style connection URL"),
            ParameterType::new("user", ParameterKind::String).with_default(""),
            ParameterType::new("password", ParameterKind::String).with_default(""),
            ParameterType::new("timeout", ParameterKind::Integer)
                .with_description("login timeout in seconds")
                .with_default("30"),
            ParameterType::new("ssl", ParameterKind::Boolean).with_default("false"),
        ],
    )
}

pub fn web_service_configurator() -> SimpleConfigurator {
    let methods = ["GET", "POST", "PUT", "DELETE"]
        .iter()
        .map(|m| m.to_string())
        .collect();
    SimpleConfigurator::new(
        WEB_SERVICE_TYPE_ID,
        "Web Service",
        vec![
            ParameterType::new("url", ParameterKind::String),
            ParameterType::new("method", ParameterKind::Category(methods)).with_default("GET"),
            ParameterType::new("timeout", ParameterKind::Integer).with_default("60"),
        ],
    )
}

pub fn builtin_configurators() -> Vec<Arc<dyn Configurator>> {
    vec![
        Arc::new(database_configurator()),
        Arc::new(web_service_configurator()),
    ]
}
