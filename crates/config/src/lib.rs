//! Layered configuration for filmsync.
//!
//! Settings are merged from, lowest to highest precedence:
//!
//! 1. Built-in defaults.
//! 2. A TOML file: the one passed explicitly, or `config.toml` in the
//!    platform config directory when it exists.
//! 3. `FILMSYNC_` environment variables, with `__` separating nested keys
//!    (`FILMSYNC_BROWSER__HEADLESS=false`).
//! 4. The legacy `LETTERBOXD_USERNAME` and `LETTERBOXD_KEY` variables.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use filmsync_session::{AuthProbe, BrowserOptions, SessionCredential};
use serde::{Deserialize, Deserializer};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "FILMSYNC_";
const LEGACY_USERNAME: &str = "LETTERBOXD_USERNAME";
const LEGACY_PASSWORD: &str = "LETTERBOXD_KEY";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "films.sqlite";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "filmsync")
}

/// Where the config file is looked for when none is given.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// The SQLite database in the platform data directory, or the working
/// directory when there isn't one.
pub fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite database holding the films table.
    pub database: PathBuf,
    pub letterboxd: LetterboxdConfig,
    pub browser: BrowserConfig,
    pub auth_probe: AuthProbe,
    /// Replace the films table inside a single transaction.
    pub atomic_replace: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            letterboxd: LetterboxdConfig::default(),
            browser: BrowserConfig::default(),
            auth_probe: AuthProbe::default(),
            atomic_replace: true,
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LetterboxdConfig {
    #[serde(deserialize_with = "scalar_string")]
    pub username: String,
    #[serde(deserialize_with = "scalar_string")]
    pub password: String,
}
impl Debug for LetterboxdConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LetterboxdConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub sandbox: bool,
    pub settle_delay_ms: u64,
    pub navigation_timeout_secs: u64,
}
impl Default for BrowserConfig {
    fn default() -> Self {
        let options = BrowserOptions::default();
        Self {
            executable: options.executable,
            headless: options.headless,
            sandbox: options.sandbox,
            settle_delay_ms: u64::try_from(options.settle_delay.as_millis()).unwrap_or(u64::MAX),
            navigation_timeout_secs: options.navigation_timeout.as_secs(),
        }
    }
}
impl From<&BrowserConfig> for BrowserOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            headless: config.headless,
            sandbox: config.sandbox,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }
}

impl Config {
    /// Load configuration from every layer.
    ///
    /// An explicitly given `path` must exist; the default config file is
    /// skipped quietly when it doesn't.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.is_file()),
        };
        match &file {
            Some(file) => tracing::debug!(path = %file.display(), "Loading config file"),
            None => tracing::debug!("No config file; using defaults and environment"),
        }
        let config: Self = Self::figment(file.as_deref()).extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged providers, without extracting.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[LEGACY_USERNAME, LEGACY_PASSWORD]).map(|key| {
                if key.as_str().eq_ignore_ascii_case(LEGACY_USERNAME) {
                    "letterboxd.username".into()
                } else {
                    "letterboxd.password".into()
                }
            }))
    }

    fn validate(&self) -> Result<()> {
        if self.browser.navigation_timeout_secs == 0 {
            exn::bail!(ErrorKind::InvalidValue("browser.navigation_timeout_secs"));
        }
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::InvalidValue("database"));
        }
        Ok(())
    }

    pub fn credential(&self) -> SessionCredential {
        SessionCredential::new(&self.letterboxd.username, &self.letterboxd.password)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions::from(&self.browser)
    }
}

/// Environment values are parsed before they reach serde, so a numeric
/// password would otherwise arrive as a number.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::String(value) => value,
        Scalar::Integer(value) => value.to_string(),
        Scalar::Float(value) => value.to_string(),
        Scalar::Bool(value) => value.to_string(),
    })
}
