//! Layered configuration.
//!
//! Sources, lowest to highest priority: built-in defaults, a TOML file
//! (`scale-ui.toml` unless another path is given), `SCALE_UI_` environment
//! variables (`__` separates nested keys, e.g. `SCALE_UI_DEFAULTS__PAGE_SIZE`),
//! then any overrides passed in by the caller.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::ParamDefaults;
use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "scale-ui.toml";
pub const ENV_PREFIX: &str = "SCALE_UI_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub verbose: bool,
    pub log_json: bool,
    /// Fallbacks for jobs parameters missing from the URL.
    pub defaults: ParamDefaults,
}

impl AppConfig {
    pub fn new<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        Ok(Self::figment(config_file, overrides).extract()?)
    }

    pub fn figment<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Figment {
        let path = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        match overrides {
            Some(overrides) => figment.merge(Serialized::defaults(overrides)),
            None => figment,
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
