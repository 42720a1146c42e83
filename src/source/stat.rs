//! Parsing of `/proc/<pid>/stat`.
//!
//! The file is a single line of space-separated fields. The second field is the
//! command name in parentheses and may itself contain spaces and parentheses, so
//! field numbering restarts after the last `)`.

use std::io::BufRead;

use super::{SingleLineStat, StatParseError};
use crate::record::CpuTimes;

/// 1-based field numbers as documented in proc(5).
const UTIME: usize = 14;
const STIME: usize = 15;
const DELAYACCT_BLKIO_TICKS: usize = 42;

/// Selected fields of `/proc/<pid>/stat`, in clock ticks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcStat {
    pub utime: u64,
    pub stime: u64,
    /// Aggregated block I/O delays. Absent on old kernels.
    pub delayacct_blkio_ticks: u64,
}

impl ProcStat {
    /// Converts the tick counters into seconds.
    pub fn cpu_times(&self, ticks_per_second: u64) -> CpuTimes {
        let ticks = ticks_per_second.max(1) as f64;
        CpuTimes {
            user: self.utime as f64 / ticks,
            system: self.stime as f64 / ticks,
            iowait: self.delayacct_blkio_ticks as f64 / ticks,
            ..CpuTimes::default()
        }
    }
}

impl SingleLineStat for ProcStat {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;

        // Fields after the command name start at number 3 (`state`).
        let rest = line
            .rfind(')')
            .map(|idx| &line[idx + 1..])
            .ok_or(StatParseError::MissingField { index: 2, line: 1 })?;
        let fields: Vec<&str> = rest.split_whitespace().collect();

        let field = |index: usize| -> Result<Option<u64>, StatParseError> {
            match fields.get(index - 3) {
                Some(value) => value
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|source| StatParseError::InvalidValue {
                        value: value.to_string(),
                        line: 1,
                        source,
                    }),
                None => Ok(None),
            }
        };

        let utime = field(UTIME)?.ok_or(StatParseError::MissingField {
            index: UTIME,
            line: 1,
        })?;
        let stime = field(STIME)?.ok_or(StatParseError::MissingField {
            index: STIME,
            line: 1,
        })?;
        let delayacct_blkio_ticks = field(DELAYACCT_BLKIO_TICKS)?.unwrap_or_default();

        Ok(ProcStat {
            utime,
            stime,
            delayacct_blkio_ticks,
        })
    }
}
