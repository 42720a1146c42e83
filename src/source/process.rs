use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
use super::{ProcIo, ProcStat, SingleLineStat};
use super::{KeyValueStat, MetricSource, ProcStatus, SourceError, allocation_stats};
use crate::fsutil;
use crate::record::{CpuTimes, IoCounters, MemoryInfo, ProfileCounts, RuntimeMemoryStats};

const DEFAULT_PROC_DIR: &str = "/proc/self";

/// [`MetricSource`] for the current process.
#[derive(Debug, Clone)]
pub struct ProcessSource {
    proc_dir: PathBuf,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    ticks_per_second: u64,
}

impl Default for ProcessSource {
    fn default() -> Self {
        Self::with_proc_dir(DEFAULT_PROC_DIR)
    }
}

impl ProcessSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads procfs files from `proc_dir` instead of `/proc/self`.
    pub fn with_proc_dir(proc_dir: impl Into<PathBuf>) -> Self {
        Self {
            proc_dir: proc_dir.into(),
            ticks_per_second: clock_ticks_per_second(),
        }
    }

    pub fn proc_dir(&self) -> &Path {
        &self.proc_dir
    }

    /// Opens `<proc_dir>/<name>` and parses it. A missing file means the
    /// kernel does not provide this statistic.
    fn read<T>(
        &self,
        name: &str,
        parse: impl FnOnce(&mut std::io::BufReader<std::fs::File>) -> std::io::Result<T>,
    ) -> Result<T, SourceError> {
        let path = self.proc_dir.join(name);
        let mut reader = match fsutil::open_file_reader(&path) {
            Ok(reader) => reader,
            Err(err) if err.is_not_found() => return Err(SourceError::Unsupported),
            Err(err) => return Err(err.into()),
        };
        parse(&mut reader).map_err(|source| SourceError::Read { path, source })
    }

    fn thread_count(&self) -> i64 {
        self.read("status", ProcStatus::from_reader)
            .map(|status| status.threads as i64)
            .unwrap_or_default()
    }

    /// Reads `status` for the memory figures reused in the runtime block.
    fn status(&self) -> ProcStatus {
        match self.read("status", ProcStatus::from_reader) {
            Ok(status) => status,
            Err(err) => {
                log::trace!("status unavailable for runtime stats: {err}");
                ProcStatus::default()
            }
        }
    }
}

impl MetricSource for ProcessSource {
    fn profile_counts(&self) -> ProfileCounts {
        let allocs = allocation_stats();
        let tasks = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks() as i64)
            .unwrap_or_default();

        ProfileCounts {
            goroutine: tasks,
            thread_create: self.thread_count(),
            heap: allocs.live_objects() as i64,
            allocs: allocs.mallocs as i64,
            block: 0,
            mutex: 0,
        }
    }

    fn runtime_memory_stats(&self) -> RuntimeMemoryStats {
        let allocs = allocation_stats();
        let status = self.status();

        RuntimeMemoryStats {
            alloc: allocs.live_bytes,
            total_alloc: allocs.total_bytes,
            sys: status.vm_size,
            mallocs: allocs.mallocs,
            frees: allocs.frees,
            heap_alloc: allocs.live_bytes,
            heap_sys: status.vm_data,
            heap_inuse: allocs.live_bytes,
            heap_objects: allocs.live_objects(),
            stack_inuse: status.vm_stk,
            stack_sys: status.vm_stk,
            ..RuntimeMemoryStats::default()
        }
    }

    #[cfg(target_os = "linux")]
    fn cpu_times(&self) -> Result<CpuTimes, SourceError> {
        let stat = self.read("stat", ProcStat::from_reader)?;
        Ok(stat.cpu_times(self.ticks_per_second))
    }

    #[cfg(target_os = "linux")]
    fn io_counters(&self) -> Result<IoCounters, SourceError> {
        let io = self.read("io", ProcIo::from_reader)?;
        Ok(io.io_counters())
    }

    #[cfg(target_os = "linux")]
    fn memory_info(&self) -> Result<MemoryInfo, SourceError> {
        let status = self.read("status", ProcStatus::from_reader)?;
        Ok(status.memory_info())
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_times(&self) -> Result<CpuTimes, SourceError> {
        Err(SourceError::Unsupported)
    }

    #[cfg(not(target_os = "linux"))]
    fn io_counters(&self) -> Result<IoCounters, SourceError> {
        Err(SourceError::Unsupported)
    }

    #[cfg(not(target_os = "linux"))]
    fn memory_info(&self) -> Result<MemoryInfo, SourceError> {
        Err(SourceError::Unsupported)
    }
}

#[cfg(unix)]
fn clock_ticks_per_second() -> u64 {
    // SAFETY: sysconf only reads a configuration value.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 { ticks as u64 } else { 100 }
}

#[cfg(not(unix))]
fn clock_ticks_per_second() -> u64 {
    100
}
