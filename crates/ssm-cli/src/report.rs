//! One polling run: query the state source, slot the results, render them.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use ssm_core::{ElapsedItem, Slotter, slot_elapsed};
use ssm_icinga::{Client, ClientConfig, IcingaError, ServiceState};

use crate::render;

/// Something that knows when services in a state were last OK.
pub trait StateSource {
    fn last_good_timestamps(
        &self,
        state: ServiceState,
    ) -> Result<BTreeMap<String, i64>, IcingaError>;
}

/// [`StateSource`] backed by the Icinga2 API on a single-threaded runtime.
#[derive(Debug)]
pub struct IcingaSource {
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl IcingaSource {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::new(config).context("failed to create Icinga2 client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to initialize tokio runtime")?;
        Ok(Self { client, runtime })
    }
}

impl StateSource for IcingaSource {
    fn last_good_timestamps(
        &self,
        state: ServiceState,
    ) -> Result<BTreeMap<String, i64>, IcingaError> {
        self.runtime
            .block_on(self.client.last_good_timestamps(state))
    }
}

/// What to report and how.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub state: ServiceState,
    /// Graphite scheme; `None` disables metric lines.
    pub graphite_scheme: Option<String>,
    pub verbose: bool,
    /// Print the service table alongside graphite lines.
    pub table: bool,
}

impl ReportOptions {
    fn metric_prefix(&self) -> Option<String> {
        self.graphite_scheme
            .as_deref()
            .map(|scheme| format!("{scheme}.{}", self.state))
    }

    /// The table is printed when asked for, when verbose, or when it is the
    /// only output.
    const fn wants_table(&self) -> bool {
        self.table || self.verbose || self.graphite_scheme.is_none()
    }
}

/// Runs one report against `source` at time `now` (epoch seconds).
///
/// A failed query is logged and reported as zero services; it never fails
/// the run.
pub fn run<W: Write, S: StateSource>(
    writer: &mut W,
    mut slotter: Slotter<ElapsedItem>,
    source: &S,
    options: &ReportOptions,
    now: i64,
) -> Result<()> {
    if options.verbose {
        let dump = serde_json::to_string_pretty(&slotter.dump())?;
        render::write_section(writer, "SLOTS:", &dump)?;
    }

    let timestamps = match source.last_good_timestamps(options.state) {
        Ok(timestamps) => timestamps,
        Err(err) => {
            tracing::error!(error = %err, state = %options.state, "icinga2 query failed");
            if let Some(scheme) = options.graphite_scheme.as_deref() {
                render::write_graphite_error(writer, scheme, now)?;
            }
            BTreeMap::new()
        }
    };

    if options.verbose {
        let result = serde_json::to_string_pretty(&timestamps)?;
        render::write_section(writer, "ICINGA2 API RESULT:", &result)?;
    }

    let matched = slot_elapsed(&mut slotter, &timestamps, now);
    tracing::debug!(
        services = timestamps.len(),
        matched,
        dropped = timestamps.len() - matched,
        "slotted services"
    );

    if options.wants_table() {
        let mut table = Vec::new();
        render::write_table(&mut table, &slotter)?;
        if options.verbose {
            let table = String::from_utf8(table).context("table is not valid UTF-8")?;
            render::write_section(writer, "TABULAR REPRESENTATION:", &table)?;
        } else {
            writer.write_all(&table)?;
        }
    }

    if let Some(prefix) = options.metric_prefix() {
        render::write_graphite(writer, &slotter, &prefix, now)?;
    }

    Ok(())
}
