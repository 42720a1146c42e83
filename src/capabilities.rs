use crate::source::{MetricSource, SourceError};

/// Optional stat groups obtainable on the running platform.
///
/// Computed once per handler by [`Capabilities::probe`] and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub cpu_times: bool,
    pub io_counters: bool,
    pub memory_info: bool,
}

impl Capabilities {
    /// All optional groups enabled.
    pub const ALL: Capabilities = Capabilities {
        cpu_times: true,
        io_counters: true,
        memory_info: true,
    };

    /// Attempts one reading of each optional group.
    ///
    /// A group is disabled only when the source reports [`SourceError::Unsupported`];
    /// any other failure is assumed to be transient and leaves the group enabled.
    pub fn probe(source: &dyn MetricSource) -> Self {
        let capabilities = Self {
            cpu_times: is_available("cpu times", source.cpu_times()),
            io_counters: is_available("io counters", source.io_counters()),
            memory_info: is_available("memory info", source.memory_info()),
        };
        log::debug!("probed capabilities: {capabilities:?}");
        capabilities
    }
}

fn is_available<T>(group: &str, reading: Result<T, SourceError>) -> bool {
    match reading {
        Ok(_) => true,
        Err(err) if err.is_unsupported() => false,
        Err(err) => {
            log::debug!("probing {group} failed, keeping it enabled: {err}");
            true
        }
    }
}
