//! Parsing of `/proc/<pid>/status`.
//!
//! Memory fields are reported by the kernel in kibibytes and converted to bytes here.
//!
//! ```rust
//! use procrec::source::{KeyValueStat, ProcStatus};
//!
//! let data = "VmRSS:\t    2048 kB\nThreads:\t4\n";
//! let status = ProcStatus::from_reader(&mut data.as_bytes()).unwrap();
//! assert_eq!(status.vm_rss, 2 * 1024 * 1024);
//! assert_eq!(status.threads, 4);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use super::KeyValueStat;
use crate::record::MemoryInfo;

const KIB: u64 = 1024;

/// Selected fields of `/proc/<pid>/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcStatus {
    /// Peak virtual memory size.
    pub vm_peak: u64,
    /// Virtual memory size.
    pub vm_size: u64,
    /// Locked memory size.
    pub vm_lck: u64,
    /// Peak resident set size.
    pub vm_hwm: u64,
    /// Resident set size.
    pub vm_rss: u64,
    /// Size of the data segment.
    pub vm_data: u64,
    /// Size of the stack segment.
    pub vm_stk: u64,
    /// Swapped-out virtual memory.
    pub vm_swap: u64,
    /// Number of threads.
    pub threads: u64,
}

impl ProcStatus {
    pub fn memory_info(&self) -> MemoryInfo {
        MemoryInfo {
            rss: self.vm_rss,
            vms: self.vm_size,
            hwm: self.vm_hwm,
            data: self.vm_data,
            stack: self.vm_stk,
            locked: self.vm_lck,
            swap: self.vm_swap,
        }
    }

    fn set_vm_peak(&mut self, kib: u64) {
        self.vm_peak = kib * KIB;
    }

    fn set_vm_size(&mut self, kib: u64) {
        self.vm_size = kib * KIB;
    }

    fn set_vm_lck(&mut self, kib: u64) {
        self.vm_lck = kib * KIB;
    }

    fn set_vm_hwm(&mut self, kib: u64) {
        self.vm_hwm = kib * KIB;
    }

    fn set_vm_rss(&mut self, kib: u64) {
        self.vm_rss = kib * KIB;
    }

    fn set_vm_data(&mut self, kib: u64) {
        self.vm_data = kib * KIB;
    }

    fn set_vm_stk(&mut self, kib: u64) {
        self.vm_stk = kib * KIB;
    }

    fn set_vm_swap(&mut self, kib: u64) {
        self.vm_swap = kib * KIB;
    }

    fn set_threads(&mut self, threads: u64) {
        self.threads = threads;
    }
}

type Setter = fn(&mut ProcStatus, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(9);

    m.insert("VmPeak", ProcStatus::set_vm_peak);
    m.insert("VmSize", ProcStatus::set_vm_size);
    m.insert("VmLck", ProcStatus::set_vm_lck);
    m.insert("VmHWM", ProcStatus::set_vm_hwm);
    m.insert("VmRSS", ProcStatus::set_vm_rss);
    m.insert("VmData", ProcStatus::set_vm_data);
    m.insert("VmStk", ProcStatus::set_vm_stk);
    m.insert("VmSwap", ProcStatus::set_vm_swap);
    m.insert("Threads", ProcStatus::set_threads);

    m
});

impl KeyValueStat for ProcStatus {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}
