use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use tokio::net::ToSocketAddrs;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::config::StreamConfig;
use crate::source::MetricSource;
use crate::stream::Stream;
use crate::window::Window;

pub const WINDOW_PATH: &str = "/debug/procrec/window";
pub const STREAM_PATH: &str = "/debug/procrec/stream";

const CONTENT_TYPE_HTML: &str = "text/html; charset=UTF-8";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Clone)]
struct AppState {
    window: Arc<Window>,
    source: Arc<dyn MetricSource>,
    stream_config: StreamConfig,
    shutdown: CancellationToken,
}

async fn window_handler(State(state): State<AppState>) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE_HTML)], state.window.render()).into_response()
}

async fn stream_handler(State(state): State<AppState>) -> Response {
    let session = Stream::new(Arc::clone(&state.source), state.stream_config);
    let rx = session.spawn(state.shutdown.child_token());

    (
        [(header::CONTENT_TYPE, CONTENT_TYPE_HTML)],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

pub struct APIServer {
    router: axum::Router,
    shutdown: CancellationToken,
}

impl APIServer {
    /// Builds the router. Stream sessions and the server itself stop when `shutdown` is cancelled.
    pub fn new(
        window: Arc<Window>,
        source: Arc<dyn MetricSource>,
        stream_config: StreamConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let state = AppState {
            window,
            source,
            stream_config,
            shutdown: shutdown.clone(),
        };
        let router = axum::Router::new()
            .route(WINDOW_PATH, any(window_handler))
            .route(STREAM_PATH, any(stream_handler))
            .with_state(state);
        Self { router, shutdown }
    }

    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> Result<(), Error> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(Error::Bind)?;
        if let Ok(local) = listener.local_addr() {
            log::info!("serving on http://{local}{WINDOW_PATH} and http://{local}{STREAM_PATH}");
        }
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(self.shutdown.cancelled_owned())
            .await
            .map_err(Error::Serve)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{Method, Request, StatusCode};
    use tokio_stream::StreamExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::WindowConfig;
    use crate::source::testing::FakeSource;

    fn server(token: &CancellationToken) -> APIServer {
        let source: Arc<dyn MetricSource> = Arc::new(FakeSource::new(1024, 1024));
        let window = Window::spawn(
            Arc::clone(&source),
            WindowConfig::new(Duration::from_secs(3), Duration::from_secs(1)),
            token.clone(),
        );
        APIServer::new(
            window,
            source,
            StreamConfig::new(Duration::from_millis(100)),
            token.clone(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_route_any_method() {
        let token = CancellationToken::new();
        let server = server(&token);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        for method in [Method::GET, Method::POST] {
            let response = server
                .router()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(WINDOW_PATH)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "text/html; charset=UTF-8"
            );
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let page = String::from_utf8(body.to_vec()).unwrap();
            assert_eq!(page.matches("<tr>").count(), 2);
        }
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_route() {
        let token = CancellationToken::new();
        let server = server(&token);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri(STREAM_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=UTF-8"
        );

        let mut frames = response.into_body().into_data_stream();
        let head = frames.next().await.unwrap().unwrap();
        assert!(head.starts_with(b"<!DOCTYPE html>"));
        let row = frames.next().await.unwrap().unwrap();
        assert!(row.starts_with(b"<tr>"));

        token.cancel();
        while frames.next().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_route_any_method() {
        let token = CancellationToken::new();
        let response = server(&token)
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(STREAM_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=UTF-8"
        );

        let mut frames = response.into_body().into_data_stream();
        let head = frames.next().await.unwrap().unwrap();
        assert!(head.starts_with(b"<!DOCTYPE html>"));

        token.cancel();
        while frames.next().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_route() {
        let token = CancellationToken::new();
        let response = server(&token)
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        token.cancel();
    }
}
