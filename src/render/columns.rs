//! Column tables for every stat group.
//!
//! Each [`Group`] lists its columns once; the header writes the names and the
//! rows evaluate the cells in the same order.

use chrono::{DateTime, Local};

use super::format::{format_duration, human_bytes};
use crate::record::{CpuTimes, IoCounters, MemoryInfo, ProfileCounts, RuntimeMemoryStats};

/// Formatted value and delta of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub delta: i64,
    pub delta_text: String,
}

impl Cell {
    fn count(current: i64, delta: i64) -> Self {
        Self {
            value: current.to_string(),
            delta,
            delta_text: delta.to_string(),
        }
    }

    fn signed(previous: i64, current: i64) -> Self {
        Self::count(current, current.wrapping_sub(previous))
    }

    fn unsigned(previous: impl Into<u64>, current: impl Into<u64>) -> Self {
        let (previous, current): (u64, u64) = (previous.into(), current.into());
        let delta = current.wrapping_sub(previous) as i64;
        Self {
            value: current.to_string(),
            delta,
            delta_text: delta.to_string(),
        }
    }

    fn bytes(previous: u64, current: u64) -> Self {
        let delta = current.wrapping_sub(previous) as i64;
        Self {
            value: human_bytes(current as i64),
            delta,
            delta_text: human_bytes(delta),
        }
    }

    fn nanos(previous: u64, current: u64) -> Self {
        let delta = current.wrapping_sub(previous) as i64;
        Self {
            value: format_duration(current as i64),
            delta,
            delta_text: format_duration(delta),
        }
    }

    /// Fractional seconds, converted to whole nanoseconds before subtracting.
    fn seconds(previous: f64, current: f64) -> Self {
        let previous = (previous * 1e9) as i64;
        let current = (current * 1e9) as i64;
        let delta = current.wrapping_sub(previous);
        Self {
            value: format_duration(current),
            delta,
            delta_text: format_duration(delta),
        }
    }

    /// Nanoseconds since the Unix epoch, shown as a local wall-clock time.
    fn instant(previous: u64, current: u64) -> Self {
        let delta = current.wrapping_sub(previous) as i64;
        let time = DateTime::from_timestamp_nanos(current as i64).with_timezone(&Local);
        Self {
            value: time.format("%H:%M:%S%.9f").to_string(),
            delta,
            delta_text: format_duration(delta),
        }
    }
}

pub struct Column<T: 'static> {
    pub name: &'static str,
    pub cell: fn(&T, &T) -> Cell,
}

pub struct Group<T: 'static> {
    pub label: &'static str,
    pub href: &'static str,
    pub columns: &'static [Column<T>],
}

impl<T: 'static> Group<T> {
    /// Header cells spanned by the group: a value and a delta per column.
    pub fn colspan(&self) -> usize {
        self.columns.len() * 2
    }
}

macro_rules! columns {
    ($ty:ty { $($name:literal => $kind:ident($field:ident)),+ $(,)? }) => {
        &[$(Column::<$ty> {
            name: $name,
            cell: |previous, current| Cell::$kind(previous.$field, current.$field),
        }),+]
    };
}

pub static PROFILE: Group<ProfileCounts> = Group {
    label: "profile counters",
    href: "https://docs.rs/tokio/latest/tokio/runtime/struct.RuntimeMetrics.html",
    columns: columns!(ProfileCounts {
        "goroutine" => signed(goroutine),
        "threadcreate" => signed(thread_create),
        "heap" => signed(heap),
        "allocs" => signed(allocs),
        "block" => signed(block),
        "mutex" => signed(mutex),
    }),
};

pub static RUNTIME: Group<RuntimeMemoryStats> = Group {
    label: "runtime memory",
    href: "https://doc.rust-lang.org/std/alloc/trait.GlobalAlloc.html",
    columns: columns!(RuntimeMemoryStats {
        ".Alloc" => bytes(alloc),
        ".TotalAlloc" => bytes(total_alloc),
        ".Sys" => bytes(sys),
        ".Lookups" => unsigned(lookups),
        ".Mallocs" => unsigned(mallocs),
        ".Frees" => unsigned(frees),
        ".HeapAlloc" => bytes(heap_alloc),
        ".HeapSys" => bytes(heap_sys),
        ".HeapIdle" => bytes(heap_idle),
        ".HeapInuse" => bytes(heap_inuse),
        ".HeapReleased" => bytes(heap_released),
        ".HeapObjects" => unsigned(heap_objects),
        ".StackInuse" => bytes(stack_inuse),
        ".StackSys" => bytes(stack_sys),
        ".MSpanInuse" => bytes(mspan_inuse),
        ".MSpanSys" => bytes(mspan_sys),
        ".MCacheInuse" => bytes(mcache_inuse),
        ".MCacheSys" => bytes(mcache_sys),
        ".BuckHashSys" => bytes(buck_hash_sys),
        ".GCSys" => bytes(gc_sys),
        ".OtherSys" => bytes(other_sys),
        ".NextGC" => bytes(next_gc),
        ".LastGC" => instant(last_gc),
        ".PauseTotalNs" => nanos(pause_total_ns),
        ".NumGC" => unsigned(num_gc),
        ".NumForcedGC" => unsigned(num_forced_gc),
        ".OtherSys" => bytes(other_sys),
    }),
};

pub static MEMORY_INFO: Group<MemoryInfo> = Group {
    label: "process memory",
    href: "https://man7.org/linux/man-pages/man5/proc_pid_status.5.html",
    columns: columns!(MemoryInfo {
        ".RSS" => bytes(rss),
        ".VMS" => bytes(vms),
        ".HWM" => bytes(hwm),
        ".Data" => bytes(data),
        ".Stack" => bytes(stack),
        ".Locked" => bytes(locked),
        ".Swap" => bytes(swap),
    }),
};

pub static CPU_TIMES: Group<CpuTimes> = Group {
    label: "cpu times",
    href: "https://man7.org/linux/man-pages/man5/proc_pid_stat.5.html",
    columns: columns!(CpuTimes {
        ".User" => seconds(user),
        ".System" => seconds(system),
        ".Idle" => seconds(idle),
        ".Nice" => seconds(nice),
        ".Iowait" => seconds(iowait),
        ".Irq" => seconds(irq),
        ".Softirq" => seconds(softirq),
        ".Steal" => seconds(steal),
        ".Guest" => seconds(guest),
        ".GuestNice" => seconds(guest_nice),
    }),
};

pub static IO_COUNTERS: Group<IoCounters> = Group {
    label: "io counters",
    href: "https://man7.org/linux/man-pages/man5/proc_pid_io.5.html",
    columns: columns!(IoCounters {
        ".ReadCount" => unsigned(read_count),
        ".WriteCount" => unsigned(write_count),
        ".ReadBytes" => bytes(read_bytes),
        ".WriteBytes" => bytes(write_bytes),
    }),
};
