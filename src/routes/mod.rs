// src/routes/mod.rs
pub mod chat;

use crate::state::SharedState;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use chat::{chat_handler, history_handler, reset_handler, root_handler};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/history", get(history_handler))
        .route("/reset", post(reset_handler))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured frontend, or any origin when none is set.
/// Credentials are allowed either way.
pub fn cors_layer(frontend_url: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = frontend_url else {
        return Ok(CorsLayer::very_permissive());
    };

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(HeaderValue::from_str(origin)?))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn preflight(layer: CorsLayer, origin: &str) -> axum::response::Response {
        let app: Router = Router::new().route("/chat", post(|| async {})).layer(layer);
        app.oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/chat")
                .header("origin", origin)
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn wildcard_mirrors_origin() {
        let res = preflight(cors_layer(None).unwrap(), "http://anywhere.test").await;
        assert_eq!(
            res.headers()["access-control-allow-origin"],
            "http://anywhere.test"
        );
        assert_eq!(res.headers()["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn configured_origin_only() {
        let layer = cors_layer(Some("http://localhost:5173")).unwrap();
        let res = preflight(layer.clone(), "http://localhost:5173").await;
        assert_eq!(
            res.headers()["access-control-allow-origin"],
            "http://localhost:5173"
        );

        let res = preflight(layer, "http://evil.test").await;
        assert!(res.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn invalid_origin_is_an_error() {
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }
}
