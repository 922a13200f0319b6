pub mod config;
pub mod expression;
pub mod packages;
pub mod settings;
pub mod style;

pub use settings::StudioSettings;
