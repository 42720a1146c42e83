//! HTML rendering of records.
//!
//! A page is a head written once by [`write_head`] followed by any number of rows from
//! [`write_row`]. Every row cell pairs an absolute value with its delta to the previous
//! record, styled by the delta's [`Trend`].

mod columns;
pub mod format;
mod head;
mod row;

pub use format::{Trend, format_duration, human_bytes};
pub use head::{write_head, write_tail};
pub use row::write_row;
