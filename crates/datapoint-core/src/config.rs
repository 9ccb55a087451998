//! Service configuration
//!
//! Layered, lowest precedence first:
//!
//! 1. built-in defaults (plus the legacy unprefixed `ALLOW` variable)
//! 2. an optional TOML file
//! 3. `DATAPOINT_*` environment variables
//!
//! ```toml
//! query_mode = "strict"
//! default_limit = 50
//! allow = true
//! database_path = "/var/lib/datapoint/store.db"
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;

pub const ENV_PREFIX: &str = "DATAPOINT";
/// Unprefixed allow flag understood for compatibility with existing deployments
pub const LEGACY_ALLOW_VAR: &str = "ALLOW";

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_MAX_LIMIT: usize = 1000;
pub const DEFAULT_DATABASE_PATH: &str = ".datapoint/store.db";

/// How the read path treats anomalies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Unknown filter operators are ignored and store failures become an
    /// empty ("null") result
    #[default]
    Lenient,
    /// Unknown filter operators and store failures are returned as typed errors
    Strict,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    pub query_mode: QueryMode,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Decision of the static authorization policy
    pub allow: bool,
    pub database_path: PathBuf,
    pub log_profile: Profile,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            query_mode: QueryMode::Lenient,
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            allow: false,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_profile: Profile::Development,
        }
    }
}

impl ServiceConfig {
    /// Load from an optional TOML file and the process environment.
    ///
    /// # Errors
    ///
    /// `Config` if the file is missing or unparsable, a value has the wrong
    /// type, or the limits are inconsistent.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// Same as [`ServiceConfig::load`], reading variables from `env` instead
    /// of the process environment when given.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::load`].
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let legacy_allow = match &env {
            Some(vars) => vars.get(LEGACY_ALLOW_VAR).cloned(),
            None => std::env::var(LEGACY_ALLOW_VAR).ok(),
        };

        let mut builder = defaults(legacy_allow.as_deref() == Some("true"))?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(config_error)?;

        let loaded: ServiceConfig = cfg.try_deserialize().map_err(config_error)?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a TOML document layered over the defaults (no environment).
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::load`].
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let cfg = defaults(false)?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(config_error)?;
        let loaded: ServiceConfig = cfg.try_deserialize().map_err(config_error)?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message("default_limit must be at least 1"));
        }
        if self.max_limit < self.default_limit {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(format!(
                    "max_limit ({}) must not be below default_limit ({})",
                    self.max_limit, self.default_limit
                )));
        }
        Ok(())
    }
}

fn defaults(allow: bool) -> Result<ConfigBuilder<DefaultState>> {
    Config::builder()
        .set_default("query_mode", "lenient")
        .and_then(|b| b.set_default("default_limit", DEFAULT_LIMIT as i64))
        .and_then(|b| b.set_default("max_limit", DEFAULT_MAX_LIMIT as i64))
        .and_then(|b| b.set_default("allow", allow))
        .and_then(|b| b.set_default("database_path", DEFAULT_DATABASE_PATH))
        .and_then(|b| b.set_default("log_profile", "development"))
        .map_err(config_error)
}

fn config_error(err: config::ConfigError) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(err.to_string())
}
