mod app_config;
mod errors;
pub mod figment;

pub use app_config::AppConfig;
pub use errors::ConfigError;
pub use figment::{read_app_config, FigmentExt};
