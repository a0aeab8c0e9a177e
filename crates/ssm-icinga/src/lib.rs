//! Icinga2 REST API integration for service state metrics.
//!
//! Queries `/v1/objects/services` for services in a given hard state and
//! returns, per service, the last time it was known to be OK.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICES_PATH: &str = "/v1/objects/services";
const QUERY_ATTRS: [&str; 2] = ["last_state_ok", "last_hard_state_change"];

/// Icinga2 client errors.
#[derive(Debug, Error)]
pub enum IcingaError {
    /// The provided credentials were unusable.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The API could not be reached.
    #[error("request failed: {0}")]
    Unavailable(#[from] reqwest::Error),
    /// API returned a non-success status.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Unrecognised service state name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown service state: {0} (expected ok, warning, critical or unknown)")]
pub struct UnknownServiceState(String);

/// Icinga2 service states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Numeric state as used in Icinga2 filter expressions.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceState {
    type Err = UnknownServiceState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            "unknown" => Ok(Self::Unknown),
            _ => Err(UnknownServiceState(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ServiceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Connection settings for [`Client::new`].
#[derive(Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Accept self-signed or otherwise unverifiable certificates.
    pub insecure: bool,
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Icinga2 API client.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for `https://{host}:{port}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is empty or whitespace-only, or if the
    /// HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, IcingaError> {
        if config.user.trim().is_empty() {
            return Err(IcingaError::InvalidCredentials {
                reason: "user cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(IcingaError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: format!("https://{}:{}", config.host, config.port),
            user: config.user,
            password: config.password,
        })
    }

    /// Fetches the last-known-good timestamp of every service in `state`.
    ///
    /// A 404 means the filter matched nothing and yields an empty map.
    pub async fn last_good_timestamps(
        &self,
        state: ServiceState,
    ) -> Result<BTreeMap<String, i64>, IcingaError> {
        let request = ServicesQuery {
            attrs: QUERY_ATTRS,
            filter: service_filter(state),
        };
        tracing::debug!(filter = %request.filter, "querying icinga2 services");

        let response = self
            .http
            .post(format!("{}{SERVICES_PATH}", self.base_url))
            .basic_auth(&self.user, Some(&self.password))
            .header("Accept", "application/json")
            .header("X-HTTP-Method-Override", "GET")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("icinga2 query matched no services");
            return Ok(BTreeMap::new());
        }
        if !status.is_success() {
            return Err(IcingaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_services_response(&body)
    }
}

/// Filter for services in `state` that someone should be looking at.
///
/// Only hard states on reachable hosts count, and only while the service is
/// actively checked, notifying, unacknowledged and outside downtime.
pub fn service_filter(state: ServiceState) -> String {
    [
        format!("service.state=={}", state.code()),
        "service.state_type==1".to_string(),
        "service.last_reachable".to_string(),
        "!service.last_in_downtime".to_string(),
        "service.enable_active_checks".to_string(),
        "service.enable_notifications".to_string(),
        "service.acknowledgement==0".to_string(),
    ]
    .join(" && ")
}

#[derive(Debug, Serialize)]
struct ServicesQuery {
    attrs: [&'static str; 2],
    filter: String,
}

#[derive(Debug, Deserialize)]
struct ServicesResponse {
    results: Vec<ServiceRecord>,
}

#[derive(Debug, Deserialize)]
struct ServiceRecord {
    name: String,
    attrs: ServiceAttrs,
}

#[derive(Debug, Deserialize)]
struct ServiceAttrs {
    #[serde(default)]
    last_state_ok: f64,
    #[serde(default)]
    last_hard_state_change: f64,
}

impl ServiceAttrs {
    /// `last_state_ok` is 0 for services never seen OK; fall back to the
    /// last hard state change.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "epoch seconds fit in i64; sub-second precision is dropped"
    )]
    fn last_good(&self) -> i64 {
        let timestamp = if self.last_state_ok > 0.0 {
            self.last_state_ok
        } else {
            self.last_hard_state_change
        };
        timestamp.trunc() as i64
    }
}

/// Parses a `/v1/objects/services` body into name → last-good timestamp.
pub fn parse_services_response(body: &str) -> Result<BTreeMap<String, i64>, IcingaError> {
    let payload: ServicesResponse =
        serde_json::from_str(body).map_err(|err| IcingaError::InvalidResponse(err.to_string()))?;
    Ok(payload
        .results
        .into_iter()
        .map(|record| {
            let last_good = record.attrs.last_good();
            (record.name, last_good)
        })
        .collect())
}
