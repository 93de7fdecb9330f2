use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{AcceptRequest, ApplicationNumber, ChangeStatusRequest};
use super::service::{ApplicationServiceError, LoanApplicationService};
use super::store::ApplicationStore;

/// Router builder exposing the intake JSON API.
pub fn application_router<S>(service: Arc<LoanApplicationService<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route("/api/accept", post(accept_handler::<S>))
        .route("/api/status/:application_number", get(status_handler::<S>))
        .route("/api/change_status", post(change_status_handler::<S>))
        .route("/api/applications", get(list_handler::<S>))
        .with_state(service)
}

pub(crate) async fn accept_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
    payload: Result<Json<AcceptRequest>, JsonRejection>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = match payload {
        Ok(Json(request)) => run_blocking(service, move |service| service.accept(request)).await,
        Err(rejection) => Err(malformed_body(rejection)),
    };

    match result {
        Ok(application_number) => {
            let payload = json!({
                "message": "Application accepted successfully",
                "application_number": application_number,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
    Path(application_number): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    // Only integer segments address an application; anything else cannot exist.
    let result = match application_number.parse::<u64>() {
        Ok(number) => {
            run_blocking(service, move |service| {
                service.status(ApplicationNumber(number))
            })
            .await
        }
        Err(_) => Err(ApplicationServiceError::NotFound),
    };

    match result {
        Ok(status) => (StatusCode::OK, Json(json!({ "status": status }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn change_status_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
    payload: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let result = match payload {
        Ok(Json(request)) => {
            run_blocking(service, move |service| service.change_status(request)).await
        }
        Err(rejection) => Err(malformed_body(rejection)),
    };

    match result {
        Ok(()) => {
            let payload = json!({ "message": "Status updated successfully" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match run_blocking(service, |service| service.list()).await {
        Ok(applications) => {
            (StatusCode::OK, Json(json!({ "applications": applications }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Store calls may touch the filesystem, so they run on the blocking pool.
async fn run_blocking<S, T, F>(
    service: Arc<LoanApplicationService<S>>,
    operation: F,
) -> Result<T, ApplicationServiceError>
where
    S: ApplicationStore + 'static,
    T: Send + 'static,
    F: FnOnce(&LoanApplicationService<S>) -> Result<T, ApplicationServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || operation(service.as_ref()))
        .await
        .map_err(|err| ApplicationServiceError::Interrupted(err.to_string()))?
}

fn malformed_body(rejection: JsonRejection) -> ApplicationServiceError {
    ApplicationServiceError::MalformedBody(rejection.body_text())
}

pub(crate) fn error_response(err: ApplicationServiceError) -> Response {
    match err {
        ApplicationServiceError::Duplicate { application_number } => {
            let payload = json!({
                "error": err.to_string(),
                "application_number": application_number,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        ApplicationServiceError::NotFound => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
        }
        err if err.is_validation() => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
        }
        err => {
            error!(error = %err, "application store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
