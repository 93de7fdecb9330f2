use crate::applications::{application_router, ApplicationStore, LoanApplicationService};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const INDEX_PAGE: &str = include_str!("../assets/index.html");

/// Files reachable under `/static/`.
const STATIC_ASSETS: &[(&str, &str)] = &[("script.js", include_str!("../assets/script.js"))];

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn with_application_routes<S>(
    service: Arc<LoanApplicationService<S>>,
    state: AppState,
) -> Router
where
    S: ApplicationStore + 'static,
{
    let operational = Router::new()
        .route("/", get(index_page))
        .route("/static/:file", get(static_asset))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    application_router(service).merge(operational)
}

pub(crate) async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub(crate) async fn static_asset(Path(file): Path<String>) -> Response {
    match STATIC_ASSETS.iter().find(|(name, _)| *name == file) {
        Some((name, body)) => {
            let mime = mime_guess::from_path(name).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                *body,
            )
                .into_response()
        }
        None => {
            let payload = json!({ "error": "asset not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::MemoryApplicationStore;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let service = Arc::new(LoanApplicationService::new(Arc::new(
            MemoryApplicationStore::default(),
        )));
        with_application_routes(service, state)
    }

    async fn fetch(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
    }

    #[tokio::test]
    async fn landing_page_is_html() {
        let response = fetch(app(true), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn static_script_is_served_with_javascript_type() {
        let response = fetch(app(true), "/static/script.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.contains("javascript"), "got {content_type}");

        let missing = fetch(app(true), "/static/missing.css").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let initializing = fetch(app(false), "/ready").await;
        assert_eq!(initializing.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = fetch(app(true), "/ready").await;
        assert_eq!(ready.status(), StatusCode::OK);

        let health = fetch(app(false), "/health").await;
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_are_mounted_alongside_operational_routes() {
        let response = fetch(app(true), "/api/applications").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
