//! Sliding window of recent records, sampled in the background.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::select;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::capabilities::Capabilities;
use crate::config::WindowConfig;
use crate::error::ResultOkLogExt;
use crate::record::Record;
use crate::render;
use crate::sampler::{Sampler, sample_blocking};
use crate::source::MetricSource;

/// Bounded FIFO of records: one writer, any number of concurrent readers.
#[derive(Debug)]
pub struct WindowBuffer {
    capacity: usize,
    records: RwLock<VecDeque<Record>>,
}

impl WindowBuffer {
    /// Creates an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends a record, evicting the oldest one when full.
    pub fn push(&self, record: Record) {
        let mut records = self.records.write();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Copies the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A [`WindowBuffer`] fed by its own sampling task.
#[derive(Debug)]
pub struct Window {
    capabilities: Capabilities,
    buffer: Arc<WindowBuffer>,
    task: JoinHandle<()>,
}

impl Window {
    /// Probes `source` and starts sampling every `config.frequency` until `token` is cancelled.
    ///
    /// The first record is taken one period after the call. Must be called within a tokio runtime.
    pub fn spawn(
        source: Arc<dyn MetricSource>,
        config: WindowConfig,
        token: CancellationToken,
    ) -> Arc<Self> {
        let config = config.with_defaults();
        let sampler = Arc::new(Sampler::new(source));
        let capabilities = sampler.capabilities();
        let buffer = Arc::new(WindowBuffer::new(config.capacity()));

        log::debug!(
            "starting window sampler: window={:?} frequency={:?} capacity={}",
            config.window,
            config.frequency,
            buffer.capacity()
        );
        let task = tokio::spawn(sample_into(
            sampler,
            Arc::clone(&buffer),
            config.frequency,
            token,
        ));

        Arc::new(Self {
            capabilities,
            buffer,
            task,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn buffer(&self) -> &WindowBuffer {
        &self.buffer
    }

    /// Returns `false` once the sampling task has stopped.
    pub fn is_sampling(&self) -> bool {
        !self.task.is_finished()
    }

    /// Renders the whole buffer as an HTML document.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_to(&mut out);
        out
    }

    /// Writes the head and one row per buffered record. The first row diffs the
    /// oldest record against itself.
    ///
    /// Write failures are logged; a failed head ends the render, a failed row is skipped.
    pub fn render_to(&self, w: &mut impl Write) {
        let records = self.buffer.snapshot();

        if render::write_head(w, self.capabilities)
            .ok_log("failed to write window head")
            .is_none()
        {
            return;
        }

        for (i, current) in records.iter().enumerate() {
            let previous = &records[i.saturating_sub(1)];
            render::write_row(w, self.capabilities, previous, current)
                .ok_log("failed to write window row");
        }

        render::write_tail(w).ok_log("failed to write window tail");
    }
}

async fn sample_into(
    sampler: Arc<Sampler>,
    buffer: Arc<WindowBuffer>,
    frequency: Duration,
    token: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + frequency, frequency);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        buffer.push(sample_blocking(&sampler).await);
    }

    log::debug!("window sampler stopped with {} records", buffer.len());
}
