//! Table and graphite renderers for a populated slotter.

use std::io::{self, Write};

use comfy_table::{CellAlignment, ContentArrangement, Table};
use ssm_core::{ElapsedItem, Slotter, beyond_counts};

const TABLE_HEADER: [&str; 3] = ["Host", "Service", "Duration"];
const SECTION_RULE: &str = "----------------";

/// ASCII box with a rule under the header and none between rows.
const TABLE_PRESET: &str = "||--+-++|    ++++++";

/// Writes one left-aligned, boxed row per classified service, slot by slot.
pub fn write_table<W: Write>(writer: &mut W, slotter: &Slotter<ElapsedItem>) -> io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(TABLE_PRESET)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(TABLE_HEADER);

    for item in slotter.iter().flat_map(|(_, items)| items) {
        let (host, service) = item.host_and_service();
        table.add_row([host, service, item.duration.as_str()]);
    }
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Left);
    }

    writeln!(writer, "{table}")
}

/// Writes graphite plaintext lines for every slot.
///
/// First the item count `in` each slot, in insertion order; then the count
/// `beyond` each slot, in reverse order, accumulated per kind.
pub fn write_graphite<W: Write, P>(
    writer: &mut W,
    slotter: &Slotter<P>,
    prefix: &str,
    timestamp: i64,
) -> io::Result<()> {
    for (slot, items) in slotter.iter() {
        writeln!(
            writer,
            "{prefix}.{}.in.{} {} {timestamp}",
            slot.kind(),
            slot.raw_range(),
            items.len()
        )?;
    }
    for beyond in beyond_counts(slotter) {
        writeln!(
            writer,
            "{prefix}.{}.beyond.{} {} {timestamp}",
            beyond.slot.kind(),
            beyond.slot.raw_range(),
            beyond.count
        )?;
    }
    Ok(())
}

/// Writes the marker line emitted when the upstream query failed.
pub fn write_graphite_error<W: Write>(
    writer: &mut W,
    scheme: &str,
    timestamp: i64,
) -> io::Result<()> {
    writeln!(writer, "{scheme}.error 1 {timestamp}")
}

/// Writes a titled block between horizontal rules, used for verbose output.
pub fn write_section<W: Write>(writer: &mut W, title: &str, body: &str) -> io::Result<()> {
    writeln!(writer, "{SECTION_RULE}")?;
    writeln!(writer, "{title}")?;
    writeln!(writer, "{}", body.trim_end())?;
    writeln!(writer, "{SECTION_RULE}")
}
