//! axum HTTP server exposing the chat relay endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures_util::StreamExt;
use proto::{ChatRequest, RelayError};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::backend::CompletionBackend;

/// Builds the relay router with `/api/chat` and `/health` routes.
pub fn router(backend: Arc<dyn CompletionBackend>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .with_state(backend)
        .layer(cors)
}

/// Binds the relay server and runs it until ctrl-c.
pub async fn serve(addr: &str, backend: Arc<dyn CompletionBackend>) -> Result<(), RelayError> {
    let app = router(backend);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RelayError::Server(format!("bind failed: {e}")))?;

    info!(%addr, "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| RelayError::Server(format!("server error: {e}")))?;

    info!("Relay stopped");
    Ok(())
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "ok"
}

/// Streams an assistant completion back as an unbuffered plain-text body.
///
/// The upstream fragments are re-emitted in arrival order with no framing;
/// the response closes once the upstream sequence is exhausted.
async fn chat_handler(
    State(backend): State<Arc<dyn CompletionBackend>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    match backend.stream_completion(&req.messages).await {
        Ok(fragments) => {
            let body = Body::from_stream(fragments.map(|f| f.map(bytes::Bytes::from)));
            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Upstream completion failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FragmentStream;
    use async_trait::async_trait;
    use axum::http::Request;
    use proto::{Role, WireMessage};
    use tower::ServiceExt;

    /// Backend emitting a canned fragment sequence.
    struct StubBackend {
        fragments: Vec<&'static str>,
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn stream_completion(
            &self,
            _messages: &[WireMessage],
        ) -> Result<FragmentStream, RelayError> {
            let items: Vec<Result<String, RelayError>> = self
                .fragments
                .iter()
                .map(|f| Ok((*f).to_string()))
                .collect();
            Ok(Box::pin(futures_util::stream::iter(items)))
        }
    }

    /// Backend that fails before streaming starts.
    struct FailingBackend;

    #[async_trait]
    impl CompletionBackend for FailingBackend {
        async fn stream_completion(
            &self,
            _messages: &[WireMessage],
        ) -> Result<FragmentStream, RelayError> {
            Err(RelayError::Upstream("connection refused".to_string()))
        }
    }

    fn chat_request_body() -> String {
        serde_json::to_string(&ChatRequest {
            messages: vec![WireMessage {
                role: Role::User,
                content: "What is 2+2?".to_string(),
            }],
        })
        .expect("serialize request")
    }

    async fn post_chat(app: Router, body: String) -> Response {
        app.oneshot(
            Request::post("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response")
    }

    #[tokio::test]
    async fn chat_streams_fragments_as_plain_text() {
        let app = router(Arc::new(StubBackend {
            fragments: vec!["2+2 ", "equals ", "4"],
        }));

        let response = post_chat(app, chat_request_body()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .expect("content-type"),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .expect("cache-control"),
            "no-cache"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&bytes[..], b"2+2 equals 4");
    }

    #[tokio::test]
    async fn chat_returns_bad_gateway_when_upstream_unavailable() {
        let app = router(Arc::new(FailingBackend));

        let response = post_chat(app, chat_request_body()).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = router(Arc::new(StubBackend { fragments: vec![] }));

        let response = app
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
