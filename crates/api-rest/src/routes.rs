use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use xds_core::constants::{FAULT_INTERNAL, SOAP_CONTENT_TYPE};
use xds_core::{encode_soap_fault, mtom::MtomAttachment, FaultCode, TransactionRecord};
use xds_files::DocumentStore;

/// Largest accepted ITI-41 request body.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(paths(health, provide_and_register), components(schemas(HealthRes)))]
pub struct ApiDoc;

/// Builds the mock registry router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/xds/iti41", post(provide_and_register))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(catch_panic_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "XDS mock registry is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/xds/iti41",
    request_body(
        content = Vec<u8>,
        content_type = "multipart/related",
        description = "MTOM package: SOAP control part plus document attachments"
    ),
    responses(
        (status = 200, description = "RegistryResponse envelope", body = String, content_type = "application/soap+xml"),
        (status = 400, description = "SOAP Sender fault", body = String, content_type = "application/soap+xml"),
        (status = 500, description = "SOAP Receiver fault", body = String, content_type = "application/soap+xml")
    )
)]
/// Provide and Register Document Set-b
///
/// Decodes the MTOM package, validates its metadata and acknowledges it with a
/// RegistryResponse, or answers with a SOAP fault naming the failing stage.
///
/// # Returns
/// * `200` with a Success `RegistryResponse` echoing the submitted identifiers
/// * `400` for an invalid content type, undecodable package, invalid metadata or a missing
///   attachment
/// * `500` for unexpected internal failures
#[axum::debug_handler]
async fn provide_and_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let handler = Arc::clone(state.handler());
    let outcome =
        match tokio::task::spawn_blocking(move || handler.handle(content_type.as_deref(), &body))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "ITI-41 handler task failed");
                return internal_fault();
            }
        };

    if let Some(store) = state.store() {
        persist_documents(Arc::clone(store), &outcome.record, outcome.documents);
    }

    let status =
        StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, outcome.content_type)], outcome.body).into_response()
}

/// Stores each attachment on the blocking pool. Failures are logged and otherwise ignored.
fn persist_documents(
    store: Arc<DocumentStore>,
    record: &TransactionRecord,
    documents: Vec<MtomAttachment>,
) {
    if documents.is_empty() {
        return;
    }
    let correlation_id = record.correlation_id.clone();
    tokio::task::spawn_blocking(move || {
        for document in documents {
            match store.store(
                &correlation_id,
                Some(&document.content_type),
                &document.payload,
            ) {
                Ok(stored) => tracing::debug!(
                    correlation_id = %correlation_id,
                    hash = %stored.hash,
                    "stored received document"
                ),
                Err(e) => tracing::warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "failed to store received document"
                ),
            }
        }
    });
}

/// Turns panics anywhere below this layer into the SOAP Receiver fault.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_fault as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_fault(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into());
    tracing::error!(detail = %detail, "request handler panicked");
    internal_fault()
}

fn internal_fault() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, SOAP_CONTENT_TYPE)],
        encode_soap_fault(FaultCode::Receiver, FAULT_INTERNAL),
    )
        .into_response()
}
