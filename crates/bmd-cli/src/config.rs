//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use bmd_core::Verbosity;

/// Application configuration.
///
/// Lowest-precedence layer of output settings; CLI flags and the logger
/// parameter string override these per invocation.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where reports are written by default.
    pub logfile: PathBuf,
    /// Default report verbosity.
    pub verbosity: Verbosity,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("logfile", &self.logfile)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logfile: PathBuf::from("build.log.md"),
            verbosity: Verbosity::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BMD_*)
        figment = figment.merge(Env::prefixed("BMD_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for bmd.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bmd"))
}
