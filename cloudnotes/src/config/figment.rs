
use std::path::Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use log::debug;
use crate::APP_CONFIG_ENV_PREFIX;
use crate::config::app_config::{
    app_config_default_notes_table,
    app_config_default_session_file,
    AppConfig,
};
use crate::config::ConfigError;

pub trait FigmentExt {
    fn setup_app_config(
        self,
        config_file: impl AsRef<Path>,
    ) -> Figment;
}

impl FigmentExt for Figment {
    /// A missing config file is skipped; the environment alone may be enough.
    fn setup_app_config(self, config_file: impl AsRef<Path>) -> Figment {
        let config_file = config_file.as_ref();
        let figment = self
            .merge(Serialized::default("session_file", app_config_default_session_file()))
            .merge(Serialized::default("notes_table", app_config_default_notes_table()));
        let figment = if config_file.exists() {
            figment.merge(Toml::file_exact(config_file))
        } else {
            debug!("config file {} not found, skipping it", config_file.display());
            figment
        };
        figment.merge(Env::prefixed(APP_CONFIG_ENV_PREFIX).global())
    }
}

pub fn read_app_config(
    config_file: impl AsRef<Path>,
) -> Result<AppConfig, ConfigError> {
    Ok(
        Figment::new()
            .setup_app_config(config_file)
            .extract()?
    )
}
