//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;
use ssm_icinga::ServiceState;

use crate::config::Overrides;

/// Icinga2 service state metrics.
///
/// Reports how long services have been in a given state, bucketed into the
/// time slots of a slot definition file, as a table or as graphite lines.
#[derive(Debug, Parser)]
#[command(name = "ssm", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Icinga2 API host [default: localhost].
    #[arg(long)]
    pub host: Option<String>,

    /// Icinga2 API port [default: 5665].
    #[arg(long)]
    pub port: Option<u16>,

    /// Icinga2 API user.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Icinga2 API password.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Service state to query: ok, warning, critical or unknown [default: ok].
    #[arg(short, long)]
    pub state: Option<ServiceState>,

    /// JSON file with the time slot definitions [default: icinga2-time-slots.json].
    #[arg(short, long)]
    pub time_slots: Option<PathBuf>,

    /// Graphite scheme prefix; enables metric output.
    #[arg(short, long)]
    pub graphite_scheme: Option<String>,

    /// Print the service table even when emitting graphite lines.
    #[arg(long)]
    pub table: bool,
}

impl Cli {
    /// Flags that take precedence over every configuration source.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            state: self.state,
            time_slots: self.time_slots.clone(),
            graphite_scheme: self.graphite_scheme.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from([
            "ssm", "-u", "root", "-p", "pw", "-s", "critical", "-g", "icinga", "-t", "slots.json",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("root"));
        assert_eq!(cli.state, Some(ServiceState::Critical));
        assert_eq!(cli.graphite_scheme.as_deref(), Some("icinga"));
        assert_eq!(cli.time_slots, Some(PathBuf::from("slots.json")));
        assert!(!cli.verbose);
    }

    #[test]
    fn rejects_unknown_state() {
        assert!(Cli::try_parse_from(["ssm", "--state", "degraded"]).is_err());
    }

    #[test]
    fn overrides_carry_only_given_flags() {
        let cli = Cli::try_parse_from(["ssm", "--port", "8443"]).unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.port, Some(8443));
        assert!(overrides.host.is_none());
        assert!(overrides.state.is_none());
    }
}
