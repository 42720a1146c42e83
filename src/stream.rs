//! Per-connection stream of diff rows.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::config::StreamConfig;
use crate::error::ResultOkLogExt;
use crate::render;
use crate::sampler::{Sampler, sample_blocking};
use crate::source::MetricSource;

/// Number of frames buffered between a session and its response body.
pub const CHANNEL_CAPACITY: usize = 16;

/// Destination of a streamed page.
///
/// Written bytes are buffered until [`push`](ResponseSink::push) hands them to the client.
pub trait ResponseSink: Write + Send {
    /// Whether buffered output can be delivered before the response ends.
    fn can_flush(&self) -> bool;

    /// Delivers everything written since the last push.
    fn push(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Rejects the request.
    ///
    /// A sink that still controls the response status answers `404 Not Found` with no
    /// body. A sink whose status is already committed only discards pending output.
    fn not_found(&mut self);
}

/// One streaming session: a sampler with its own capabilities and sampling period.
#[derive(Debug)]
pub struct Stream {
    sampler: Arc<Sampler>,
    frequency: Duration,
}

impl Stream {
    pub fn new(source: Arc<dyn MetricSource>, config: StreamConfig) -> Self {
        Self {
            sampler: Arc::new(Sampler::new(source)),
            frequency: config.with_defaults().frequency,
        }
    }

    /// Writes the head and then one row per tick until `token` is cancelled.
    ///
    /// A sink that cannot flush is rejected through [`ResponseSink::not_found`] and gets
    /// nothing else. Write and push failures are logged and do not end the session. A push
    /// still pending when `token` is cancelled is abandoned.
    pub async fn serve<S: ResponseSink>(&self, sink: &mut S, token: CancellationToken) {
        if !sink.can_flush() {
            sink.not_found();
            return;
        }

        let capabilities = self.sampler.capabilities();
        render::write_head(sink, capabilities).ok_log("failed to write stream head");
        select! {
            biased;
            _ = token.cancelled() => return,
            result = sink.push() => {
                result.ok_log("failed to push stream head");
            }
        }

        let mut previous = sample_blocking(&self.sampler).await;
        let mut ticker = interval_at(Instant::now() + self.frequency, self.frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let current = sample_blocking(&self.sampler).await;
            render::write_row(sink, capabilities, &previous, &current)
                .ok_log("failed to write stream row");
            select! {
                biased;
                _ = token.cancelled() => break,
                result = sink.push() => {
                    result.ok_log("failed to push stream row");
                }
            }
            previous = current;
        }
    }

    /// Serves into a [`ChannelSink`] on a new task and returns the receiving end.
    ///
    /// Dropping the receiver ends the session; `token` itself is never cancelled by it.
    pub fn spawn(self, token: CancellationToken) -> mpsc::Receiver<io::Result<Bytes>> {
        let (mut sink, rx) = ChannelSink::channel(CHANNEL_CAPACITY);
        let session = token.child_token();

        let sender = sink.sender();
        let watched = session.clone();
        tokio::spawn(async move {
            select! {
                _ = sender.closed() => {
                    log::debug!("stream client disconnected");
                    watched.cancel();
                }
                _ = watched.cancelled() => {}
            }
        });

        tokio::spawn(async move {
            self.serve(&mut sink, session.clone()).await;
            session.cancel();
            log::debug!("stream session ended");
        });

        rx
    }
}

/// [`ResponseSink`] that forwards each push as one frame over a bounded channel.
#[derive(Debug)]
pub struct ChannelSink {
    buf: Vec<u8>,
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl ChannelSink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<io::Result<Bytes>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                buf: Vec::new(),
                tx,
            },
            rx,
        )
    }

    /// A handle for observing when the receiver goes away.
    pub fn sender(&self) -> mpsc::Sender<io::Result<Bytes>> {
        self.tx.clone()
    }
}

impl Write for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for ChannelSink {
    fn can_flush(&self) -> bool {
        true
    }

    async fn push(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let frame = Bytes::from(std::mem::take(&mut self.buf));
        self.tx.send(Ok(frame)).await.map_err(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "stream receiver dropped")
        })
    }

    /// The status is committed before the first frame and this sink always flushes,
    /// so rejecting only drops whatever is buffered.
    fn not_found(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::FakeSource;

    #[derive(Debug, Default)]
    struct BufferSink {
        flushable: bool,
        status: Option<u16>,
        body: Vec<u8>,
        pending: usize,
        pushes: usize,
        failing: bool,
    }

    impl BufferSink {
        fn flushable() -> Self {
            Self {
                flushable: true,
                ..Self::default()
            }
        }

        fn body(&self) -> String {
            String::from_utf8(self.body.clone()).unwrap()
        }
    }

    impl Write for BufferSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.body.extend_from_slice(buf);
            self.pending += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ResponseSink for BufferSink {
        fn can_flush(&self) -> bool {
            self.flushable
        }

        async fn push(&mut self) -> io::Result<()> {
            self.pushes += 1;
            if self.failing {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"));
            }
            self.pending = 0;
            Ok(())
        }

        fn not_found(&mut self) {
            self.status = Some(404);
        }
    }

    fn stream(source: FakeSource, frequency: Duration) -> Stream {
        Stream::new(Arc::new(source), StreamConfig::new(frequency))
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_without_flush_is_not_found() {
        let stream = stream(FakeSource::new(0, 0), Duration::from_millis(100));
        let mut sink = BufferSink::default();

        stream.serve(&mut sink, CancellationToken::new()).await;

        assert_eq!(sink.status, Some(404));
        assert!(sink.body.is_empty());
        assert_eq!(sink.pushes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_until_cancelled() {
        let stream = stream(FakeSource::new(0, 512 * 1024), Duration::from_millis(100));
        let mut sink = BufferSink::flushable();
        let token = CancellationToken::new();
        {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                token.cancel();
            });
        }

        stream.serve(&mut sink, token).await;

        let body = sink.body();
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.matches("<tr>").count() >= 4);
        assert!(sink.pushes >= 5);
        assert_eq!(sink.pending, 0);
        assert!(body.contains("MiB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_keeps_sampling_when_pushes_fail() {
        let source = Arc::new(FakeSource::new(0, 1));
        let stream = Stream::new(source.clone(), StreamConfig::new(Duration::from_millis(100)));
        let mut sink = BufferSink {
            failing: true,
            ..BufferSink::flushable()
        };
        let token = CancellationToken::new();
        {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(550)).await;
                token.cancel();
            });
        }

        stream.serve(&mut sink, token).await;

        assert!(sink.body().matches("<tr>").count() >= 4);
        assert!(sink.pushes >= 5);
        assert!(sink.pending > 0);
        assert!(source.readings() >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_returns_on_cancel_while_client_stalls() {
        let stream = stream(FakeSource::new(0, 1), Duration::from_millis(100));
        let (mut sink, rx) = ChannelSink::channel(2);
        let token = CancellationToken::new();

        let session = {
            let token = token.clone();
            tokio::spawn(async move { stream.serve(&mut sink, token).await })
        };

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!session.is_finished());
        token.cancel();

        let served = tokio::time::timeout(Duration::from_secs(10), session).await;
        assert!(served.is_ok());
        assert_eq!(rx.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_rows_diff_previous_sample() {
        let stream = stream(FakeSource::new(1024, 1024), Duration::from_secs(1));
        let mut sink = BufferSink::flushable();
        let token = CancellationToken::new();
        {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(2500)).await;
                token.cancel();
            });
        }

        stream.serve(&mut sink, token).await;

        let body = sink.body();
        assert_eq!(body.matches("<tr>").count(), 2);
        assert!(body.contains(
            r#"<td style="padding-left: 10px;">2.000 KiB</td><td style="color: green;">1.000 KiB"#
        ));
        assert!(body.contains(
            r#"<td style="padding-left: 10px;">3.000 KiB</td><td style="color: green;">1.000 KiB"#
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_sink_frames() {
        let (mut sink, mut rx) = ChannelSink::channel(4);

        sink.push().await.unwrap();
        sink.write_all(b"<tr>").unwrap();
        sink.write_all(b"</tr>").unwrap();
        sink.push().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().unwrap(), Bytes::from_static(b"<tr></tr>"));
        assert!(rx.try_recv().is_err());

        drop(rx);
        sink.write_all(b"<tr>").unwrap();
        let err = sink.push().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_sink_not_found_discards_pending() {
        let (mut sink, mut rx) = ChannelSink::channel(4);

        sink.write_all(b"<!DOCTYPE html>").unwrap();
        sink.not_found();
        sink.push().await.unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_session_ends_on_disconnect() {
        let source = Arc::new(FakeSource::new(0, 1));
        let stream = Stream::new(source.clone(), StreamConfig::new(Duration::from_millis(100)));
        let token = CancellationToken::new();

        let mut rx = stream.spawn(token.clone());
        let head = rx.recv().await.unwrap().unwrap();
        assert!(head.starts_with(b"<!DOCTYPE html>"));
        let row = rx.recv().await.unwrap().unwrap();
        assert!(row.starts_with(b"<tr>"));

        drop(rx);
        tokio::time::sleep(Duration::from_secs(1)).await;
        let readings = source.readings();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(source.readings(), readings);
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_session_ends_on_shutdown() {
        let stream = stream(FakeSource::new(0, 1), Duration::from_millis(100));
        let token = CancellationToken::new();

        let mut rx = stream.spawn(token.clone());
        assert!(rx.recv().await.is_some());
        token.cancel();

        while rx.recv().await.is_some() {}
    }
}
