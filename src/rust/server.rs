//! HTTP front for the prediction pipeline.
//!
//! Routes:
//! - `POST /process_text`: `{"content": {"text": ..., "footer": {...}}}` → one envelope
//! - `POST /process_bulk`: `{"content": [{"text": ..., "footer": {...}}, ...]}` → list of envelopes
//! - `GET /health`

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use serde_json::{json, Value};

use crate::cdm::Envelope;
use crate::classifier::Classifiable;
use crate::pipeline::{PipelineError, PredictionInput, PredictionPipeline};

const CONTENT_REQUIRED: &str = "Input must be a dictionary with 'content' key";
const TEXT_REQUIRED: &str = "'text' is required";
const LIST_REQUIRED: &str = "Input must be a list of objects";
const ITEM_TEXT_REQUIRED: &str = "Each item must contain 'text'";

/// Error response with a `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::MissingMetadata(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::ModelInference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Prediction failed: {}", err);
        } else {
            warn!("Rejected request: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Shared state for request handlers
pub struct AppState<C: Classifiable> {
    pipeline: Arc<PredictionPipeline<C>>,
}

impl<C: Classifiable> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

/// Builds the router around an already loaded pipeline.
pub fn router<C: Classifiable + 'static>(pipeline: PredictionPipeline<C>) -> Router {
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    Router::new()
        .route("/health", get(health::<C>))
        .route("/process_text", post(process_text::<C>))
        .route("/process_bulk", post(process_bulk::<C>))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve<C: Classifiable + 'static>(pipeline: PredictionPipeline<C>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving CDMv2 classifier on {}", listener.local_addr()?);
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

/// Unwraps the `content` member of a request body. Bodies that are not
/// JSON, or are sent without a JSON content type, get the same answer as a
/// body without `content`.
fn take_content(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            return Err(ApiError::bad_request(CONTENT_REQUIRED));
        }
    };
    match body {
        Value::Object(mut map) => map
            .remove("content")
            .ok_or_else(|| ApiError::bad_request(CONTENT_REQUIRED)),
        _ => Err(ApiError::bad_request(CONTENT_REQUIRED)),
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!("Inference task failed: {}", e);
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Inference task failed".to_string(),
            })
        }
    }
}

async fn health<C: Classifiable + 'static>(State(state): State<AppState<C>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.pipeline.classifier().name(),
    }))
}

async fn process_text<C: Classifiable + 'static>(
    State(state): State<AppState<C>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let content = take_content(body)?;
    let item = PredictionInput::from_json(&content);

    let text = match item.text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::bad_request(TEXT_REQUIRED)),
    };

    let pipeline = Arc::clone(&state.pipeline);
    let footer = item.footer;
    let envelope = run_blocking(move || pipeline.predict(&text, footer.as_ref())).await?;

    Ok(Json(envelope))
}

async fn process_bulk<C: Classifiable + 'static>(
    State(state): State<AppState<C>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Envelope>>, ApiError> {
    let content = take_content(body)?;
    let Value::Array(raw_items) = content else {
        return Err(ApiError::bad_request(LIST_REQUIRED));
    };

    let items: Vec<PredictionInput> = raw_items.iter().map(PredictionInput::from_json).collect();
    if items
        .iter()
        .any(|item| item.text.as_deref().map_or(true, str::is_empty))
    {
        return Err(ApiError::bad_request(ITEM_TEXT_REQUIRED));
    }

    let pipeline = Arc::clone(&state.pipeline);
    let envelopes = run_blocking(move || pipeline.predict_bulk(&items)).await?;

    Ok(Json(envelopes))
}
