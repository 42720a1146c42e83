//! Point-in-time health snapshots of the running process.
//!
//! A [`Record`] always carries the profile counters and the runtime memory
//! accounting block. The three process-level groups ([`CpuTimes`],
//! [`IoCounters`], [`MemoryInfo`]) are optional: they are `None` when the
//! matching capability was not detected, and `Some` otherwise, even when a
//! single collection attempt failed and the group had to be zero-filled.

use chrono::{DateTime, Local};

/// Counts of items in the runtime's diagnostic buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileCounts {
    /// Live asynchronous tasks.
    pub goroutine: i64,
    /// OS threads created by the process.
    pub thread_create: i64,
    /// Live heap objects.
    pub heap: i64,
    /// Allocations performed since start.
    pub allocs: i64,
    pub block: i64,
    pub mutex: i64,
}

/// Allocator and collector accounting block.
///
/// All byte and object counters are monotonic or gauge-like `u64` values.
/// `last_gc` is a timestamp in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeMemoryStats {
    pub alloc: u64,
    pub total_alloc: u64,
    pub sys: u64,
    pub lookups: u64,
    pub mallocs: u64,
    pub frees: u64,
    pub heap_alloc: u64,
    pub heap_sys: u64,
    pub heap_idle: u64,
    pub heap_inuse: u64,
    pub heap_released: u64,
    pub heap_objects: u64,
    pub stack_inuse: u64,
    pub stack_sys: u64,
    pub mspan_inuse: u64,
    pub mspan_sys: u64,
    pub mcache_inuse: u64,
    pub mcache_sys: u64,
    pub buck_hash_sys: u64,
    pub gc_sys: u64,
    pub other_sys: u64,
    pub next_gc: u64,
    pub last_gc: u64,
    pub pause_total_ns: u64,
    pub num_gc: u32,
    pub num_forced_gc: u32,
}

/// CPU time spent by the process, in fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub nice: f64,
    pub iowait: f64,
    pub irq: f64,
    pub softirq: f64,
    pub steal: f64,
    pub guest: f64,
    pub guest_nice: f64,
}

/// Block I/O performed by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoCounters {
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Memory mapped by the process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    pub rss: u64,
    pub vms: u64,
    pub hwm: u64,
    pub data: u64,
    pub stack: u64,
    pub locked: u64,
    pub swap: u64,
}

/// An immutable snapshot taken by the [`Sampler`](crate::sampler::Sampler).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: DateTime<Local>,
    pub profile_counts: ProfileCounts,
    pub runtime_memory_stats: RuntimeMemoryStats,
    pub cpu_times: Option<CpuTimes>,
    pub io_counters: Option<IoCounters>,
    pub memory_info: Option<MemoryInfo>,
}
