//! Parsing of `/proc/<pid>/io`.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::KeyValueStat;
use crate::record::IoCounters;

/// Selected fields of `/proc/<pid>/io`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcIo {
    /// Read syscalls.
    pub syscr: u64,
    /// Write syscalls.
    pub syscw: u64,
    /// Bytes fetched from the storage layer.
    pub read_bytes: u64,
    /// Bytes sent to the storage layer.
    pub write_bytes: u64,
}

impl ProcIo {
    pub fn io_counters(&self) -> IoCounters {
        IoCounters {
            read_count: self.syscr,
            write_count: self.syscw,
            read_bytes: self.read_bytes,
            write_bytes: self.write_bytes,
        }
    }

    fn set_syscr(&mut self, syscr: u64) {
        self.syscr = syscr;
    }

    fn set_syscw(&mut self, syscw: u64) {
        self.syscw = syscw;
    }

    fn set_read_bytes(&mut self, read_bytes: u64) {
        self.read_bytes = read_bytes;
    }

    fn set_write_bytes(&mut self, write_bytes: u64) {
        self.write_bytes = write_bytes;
    }
}

type Setter = fn(&mut ProcIo, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(4);

    m.insert("syscr", ProcIo::set_syscr);
    m.insert("syscw", ProcIo::set_syscw);
    m.insert("read_bytes", ProcIo::set_read_bytes);
    m.insert("write_bytes", ProcIo::set_write_bytes);

    m
});

impl KeyValueStat for ProcIo {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StatParseError;
    use crate::source::error::extract_stat_parse_error;

    #[test]
    fn test_parse_complete_io() {
        let data = "\
rchar: 323934931
wchar: 323929600
syscr: 632687
syscw: 632675
read_bytes: 4096
write_bytes: 323932160
cancelled_write_bytes: 0
";
        let stat = ProcIo::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat.io_counters(),
            IoCounters {
                read_count: 632_687,
                write_count: 632_675,
                read_bytes: 4096,
                write_bytes: 323_932_160,
            }
        );
    }

    #[test]
    fn test_parse_invalid_io() {
        let data = "syscr: -1\n";
        let err = ProcIo::from_reader(&mut data.as_bytes()).unwrap_err();
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidKeyValue { key, line, .. } => {
                assert_eq!(key, "syscr");
                assert_eq!(*line, 1);
            }
            _ => panic!("Expected InvalidKeyValue error"),
        }
    }
}
