//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ssm_icinga::{ClientConfig, DEFAULT_TIMEOUT, ServiceState};

/// Graphite scheme value that disables metric output.
const DISABLED_SCHEME: &str = "None";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Icinga2 API host.
    pub host: String,
    /// Icinga2 API port.
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Service state to report on.
    pub state: ServiceState,
    /// Path to the time slot definition file.
    pub time_slots: PathBuf,
    /// Graphite prefix. Absent, empty or `None` disables metric output.
    pub graphite_scheme: Option<String>,
    /// Accept self-signed API certificates.
    pub insecure: bool,
    /// API request timeout in seconds.
    pub timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("state", &self.state)
            .field("time_slots", &self.time_slots)
            .field("graphite_scheme", &self.graphite_scheme)
            .field("insecure", &self.insecure)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5665,
            user: None,
            password: None,
            state: ServiceState::Ok,
            time_slots: PathBuf::from("icinga2-time-slots.json"),
            graphite_scheme: None,
            insecure: true,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Command-line values layered on top of every other source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ServiceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphite_scheme: Option<String>,
}

impl Config {
    /// Loads configuration, optionally from a specific file, then applies
    /// command-line overrides.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(
        config_path: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SSM_*)
        figment = figment.merge(Env::prefixed("SSM_"));

        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract()
    }

    /// The graphite prefix, unless metric output is disabled.
    pub fn graphite_scheme(&self) -> Option<&str> {
        self.graphite_scheme
            .as_deref()
            .map(str::trim)
            .filter(|scheme| !scheme.is_empty() && *scheme != DISABLED_SCHEME)
    }

    /// Connection settings for the Icinga2 client.
    ///
    /// Fails if the user or password was not configured anywhere.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let Some(user) = self.user.as_deref().filter(|u| !u.trim().is_empty()) else {
            bail!("missing Icinga2 user (pass --user or set SSM_USER)");
        };
        let Some(password) = self.password.as_deref() else {
            bail!("missing Icinga2 password (pass --password or set SSM_PASSWORD)");
        };

        Ok(ClientConfig {
            host: self.host.clone(),
            port: self.port,
            user: user.to_string(),
            password: password.to_string(),
            insecure: self.insecure,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Returns the platform-specific config directory for ssm.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ssm"))
}
