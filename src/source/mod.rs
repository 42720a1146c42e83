//! Collection of raw process and runtime readings.
//!
//! The sampling engine never talks to the operating system directly; it pulls
//! readings from a [`MetricSource`]. [`ProcessSource`] is the implementation for
//! the running process, backed by procfs on Linux and by [`CountingAllocator`]
//! for heap figures. Tests and embedders can supply their own source.
//!
//! # Supported Stats
//!
//! - `/proc/self/status` for [`MemoryInfo`] and the thread count
//! - `/proc/self/stat` for [`CpuTimes`]
//! - `/proc/self/io` for [`IoCounters`]
//!
//! # Platform Requirements
//!
//! The optional groups are only available on Linux. Elsewhere they report
//! [`SourceError::Unsupported`] and are left out of every rendered table.

mod alloc;
mod error;
mod io;
mod parser;
mod process;
mod stat;
mod status;

pub use alloc::{AllocationStats, CountingAllocator, allocation_stats};
pub use error::{SourceError, StatParseError};
pub use io::ProcIo;
pub use parser::{KeyValueStat, SingleLineStat};
pub use process::ProcessSource;
pub use stat::ProcStat;
pub use status::ProcStatus;

use crate::record::{CpuTimes, IoCounters, MemoryInfo, ProfileCounts, RuntimeMemoryStats};

/// Provider of point-in-time readings for the four stat groups.
///
/// The mandatory groups cannot fail. The optional groups report
/// [`SourceError::Unsupported`] when they can never be obtained on the current
/// platform; any other error is treated as transient.
pub trait MetricSource: Send + Sync + 'static {
    fn profile_counts(&self) -> ProfileCounts;

    fn runtime_memory_stats(&self) -> RuntimeMemoryStats;

    fn cpu_times(&self) -> Result<CpuTimes, SourceError>;

    fn io_counters(&self) -> Result<IoCounters, SourceError>;

    fn memory_info(&self) -> Result<MemoryInfo, SourceError>;
}
