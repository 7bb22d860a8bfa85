pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;
pub mod species;

pub use builder::{build_config, resolve_config_path};
pub use models::AppConfig;
