#[global_allocator]
static GLOBAL: procrec::source::CountingAllocator = procrec::source::CountingAllocator::new();

/// Entry point for the procrec server.
///
/// Serves the window and stream pages for its own process. The listen address and
/// sampling periods come from `PROCREC_*` environment variables; log output is
/// controlled by `RUST_LOG`.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug PROCREC_WINDOW=1m PROCREC_STREAM_FREQUENCY=250ms cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    procrec::run().await
}
