use std::io::{self, Write};

use super::columns::{CPU_TIMES, Group, IO_COUNTERS, MEMORY_INFO, PROFILE, RUNTIME};
use super::format::Trend;
use crate::capabilities::Capabilities;
use crate::record::Record;

/// Writes one table row diffing `current` against `previous`.
///
/// Optional groups follow `capabilities`, so rows always line up with the header
/// written for the same capabilities. A group missing from a record renders as zeros.
pub fn write_row(
    w: &mut impl Write,
    capabilities: Capabilities,
    previous: &Record,
    current: &Record,
) -> io::Result<()> {
    write!(
        w,
        r#"<tr><td class="tbl__col1">{}"#,
        current.timestamp.format("%H:%M:%S")
    )?;

    write_cells(w, &PROFILE, &previous.profile_counts, &current.profile_counts)?;
    write_cells(
        w,
        &RUNTIME,
        &previous.runtime_memory_stats,
        &current.runtime_memory_stats,
    )?;
    if capabilities.memory_info {
        write_cells(
            w,
            &MEMORY_INFO,
            &previous.memory_info.unwrap_or_default(),
            &current.memory_info.unwrap_or_default(),
        )?;
    }
    if capabilities.cpu_times {
        write_cells(
            w,
            &CPU_TIMES,
            &previous.cpu_times.unwrap_or_default(),
            &current.cpu_times.unwrap_or_default(),
        )?;
    }
    if capabilities.io_counters {
        write_cells(
            w,
            &IO_COUNTERS,
            &previous.io_counters.unwrap_or_default(),
            &current.io_counters.unwrap_or_default(),
        )?;
    }

    w.write_all(b"</td></tr>")
}

fn write_cells<T: 'static>(w: &mut impl Write, group: &Group<T>, previous: &T, current: &T) -> io::Result<()> {
    for column in group.columns {
        let cell = (column.cell)(previous, current);
        write!(
            w,
            r#"</td><td style="padding-left: 10px;">{}</td><td style="{}">{}"#,
            cell.value,
            Trend::of(cell.delta).style(),
            cell.delta_text
        )?;
    }
    Ok(())
}
