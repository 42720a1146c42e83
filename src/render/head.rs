use std::io::{self, Write};

use super::columns::{CPU_TIMES, Group, IO_COUNTERS, MEMORY_INFO, PROFILE, RUNTIME};
use crate::capabilities::Capabilities;

const PREAMBLE: &str = r#"<!DOCTYPE html>
<html>
<head>
	<meta charset="UTF-8">
	<style>
		body, table {
			font-family: Courier, monospace;
			font-size: 13px;
			white-space: nowrap;
			border-spacing: 0px;
			margin: 0px;
			padding: 0px;
		}
		table thead th {
			background-color: white;
			border-color: white;
			text-align: left;
		}
		table td {
			padding-left: 5px;
		}
		.tbl__head1 th {
			position: sticky;
			top: 0px;
			left: 69px;
			padding-left: 1px;
			background-color: white;
		}
		.tbl__head1__th1 {
			left: 0px !important;
			z-index: 50;
			border-right: 1px solid gray;
		}
		.tbl__head2 th {
			position: sticky;
			top: 15px;
			padding-bottom: 5px;
			border-bottom: 1px solid gray;
		}
		.tbl__th-time {
			position: sticky;
			top: 0;
			left: 0;
			border-right: 1px solid gray;
			z-index: 20;
		}
		.tbl__col1 {
			position: sticky;
			background-color: white;
			left: 0px;
			padding-left: 0px;
			padding-right: 5px;
			font-weight: bold;
			border-right: 1px solid gray;
		}
	</style>
	<title>procrec</title>
</head>
<body>
	<table>
		<thead class="tbl__head1"><th class="tbl__head1__th1" colspan="1"></th>"#;

/// Writes the document head and both header rows, leaving a `<tbody>` open for rows.
///
/// Column groups of disabled capabilities are left out.
pub fn write_head(w: &mut impl Write, capabilities: Capabilities) -> io::Result<()> {
    w.write_all(PREAMBLE.as_bytes())?;

    write_group_label(w, &PROFILE)?;
    write_group_label(w, &RUNTIME)?;
    if capabilities.memory_info {
        write_group_label(w, &MEMORY_INFO)?;
    }
    if capabilities.cpu_times {
        write_group_label(w, &CPU_TIMES)?;
    }
    if capabilities.io_counters {
        write_group_label(w, &IO_COUNTERS)?;
    }

    w.write_all(br#"</thead><thead class="tbl__head2"><th class="tbl__th-time">time</th>"#)?;

    write_column_names(w, &PROFILE)?;
    write_column_names(w, &RUNTIME)?;
    if capabilities.memory_info {
        write_column_names(w, &MEMORY_INFO)?;
    }
    if capabilities.cpu_times {
        write_column_names(w, &CPU_TIMES)?;
    }
    if capabilities.io_counters {
        write_column_names(w, &IO_COUNTERS)?;
    }

    w.write_all(b"</thead><tbody>")
}

/// Closes the elements opened by [`write_head`].
pub fn write_tail(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"</tbody></table></body></html>")
}

fn write_group_label<T: 'static>(w: &mut impl Write, group: &Group<T>) -> io::Result<()> {
    write!(
        w,
        r#"<th colspan="{}"><a target="_blank" href="{}">{}</a></th>"#,
        group.colspan(),
        group.href,
        group.label
    )
}

fn write_column_names<T: 'static>(w: &mut impl Write, group: &Group<T>) -> io::Result<()> {
    for column in group.columns {
        write!(w, r#"<th colspan="2">{}</th>"#, column.name)?;
    }
    Ok(())
}
