//! procrec: live process and runtime health tables served over HTTP.
//!
//! A [`window::Window`] keeps a bounded trailing history sampled in the background and
//! renders it in full on every request. A [`stream::Stream`] pushes one diff row per tick
//! to a single connection for as long as it stays open. Both pull readings from a
//! [`source::MetricSource`], by default [`source::ProcessSource`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub mod api;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod record;
pub mod render;
pub mod sampler;
pub mod source;
pub mod stream;
pub mod window;

/// Runs the procrec server until Ctrl-C.
///
/// Reads [`config::Config`] from the environment, starts the window sampler for the
/// current process and serves both pages.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listener cannot be bound.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Config: {config:?}");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("received Ctrl-C, shutting down"),
                Err(err) => log::error!("failed to listen for Ctrl-C: {err}"),
            }
            shutdown.cancel();
        });
    }

    let source: Arc<dyn source::MetricSource> = Arc::new(source::ProcessSource::new());
    let window = window::Window::spawn(Arc::clone(&source), config.window, shutdown.clone());

    let server = api::APIServer::new(window, source, config.stream, shutdown);
    server.listen(config.listen_addr.as_str()).await?;
    Ok(())
}
