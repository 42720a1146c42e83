use std::sync::Arc;

use crate::capabilities::Capabilities;
use crate::record::Record;
use crate::source::{MetricSource, SourceError};

/// Takes [`Record`]s from a [`MetricSource`], gated by the capabilities probed at construction.
pub struct Sampler {
    source: Arc<dyn MetricSource>,
    capabilities: Capabilities,
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Sampler {
    /// Creates a sampler, probing the source once.
    pub fn new(source: Arc<dyn MetricSource>) -> Self {
        let capabilities = Capabilities::probe(source.as_ref());
        Self {
            source,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Takes one snapshot.
    ///
    /// Never fails: an enabled group whose reading fails is logged and zero-filled.
    pub fn sample(&self) -> Record {
        let timestamp = chrono::Local::now();
        let runtime_memory_stats = self.source.runtime_memory_stats();
        let profile_counts = self.source.profile_counts();

        let cpu_times = self
            .capabilities
            .cpu_times
            .then(|| or_zeroed("cpu times", self.source.cpu_times()));
        let io_counters = self
            .capabilities
            .io_counters
            .then(|| or_zeroed("io counters", self.source.io_counters()));
        let memory_info = self
            .capabilities
            .memory_info
            .then(|| or_zeroed("memory info", self.source.memory_info()));

        Record {
            timestamp,
            profile_counts,
            runtime_memory_stats,
            cpu_times,
            io_counters,
            memory_info,
        }
    }
}

/// Takes a snapshot on the blocking pool, keeping procfs reads off the runtime's worker threads.
pub async fn sample_blocking(sampler: &Arc<Sampler>) -> Record {
    let blocking = Arc::clone(sampler);
    match tokio::task::spawn_blocking(move || blocking.sample()).await {
        Ok(record) => record,
        Err(err) => {
            log::error!("blocking sample failed, sampling inline: {err}");
            sampler.sample()
        }
    }
}

fn or_zeroed<T: Default>(group: &str, reading: Result<T, SourceError>) -> T {
    reading.unwrap_or_else(|err| {
        log::warn!("failed to get {group} stats: {err}");
        T::default()
    })
}
