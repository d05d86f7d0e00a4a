use crate::config::Config;
use crate::error::LedgerError;
use crate::export::{self, ExportFormat};
use crate::ledger::model::{AssessmentRecord, Hotel, NewEntry};
use crate::ledger::summary::Summary;
use crate::ledger::{Session, View};
use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub session: Arc<Mutex<Session>>,
}

impl ApiState {
    fn session(&self) -> ApiResult<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| ApiError::Internal(anyhow!("session lock poisoned")))
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route(
            "/api/v1/records",
            get(records_get)
                .post(records_post)
                .put(records_put)
                .delete(records_clear),
        )
        .route("/api/v1/records/last", delete(records_undo))
        .route("/api/v1/summary", get(summary_get))
        .route("/api/v1/filter", get(filter_get).put(filter_put))
        .route("/api/v1/export/:format", get(export_download))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    records: usize,
    hotels: Vec<Hotel>,
    persisted_to: Option<String>,
    api_port: u16,
}

#[derive(Debug, Serialize)]
struct MutationPayload {
    changed: bool,
    view: View,
}

#[derive(Debug, Serialize, Deserialize)]
struct FilterPayload {
    hotels: Vec<Hotel>,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let session = state.session()?;

    Ok(Json(StatusPayload {
        records: session.ledger().len(),
        hotels: session.hotel_filter().iter().copied().collect(),
        persisted_to: session
            .store()
            .map(|store| store.path().display().to_string()),
        api_port: state.config.api_port,
    }))
}

async fn records_get(State(state): State<ApiState>) -> ApiResult<Json<View>> {
    let view = state.session()?.refresh();

    Ok(Json(view))
}

async fn records_post(
    State(state): State<ApiState>,
    Json(entry): Json<NewEntry>,
) -> ApiResult<Json<MutationPayload>> {
    let mut session = state.session()?;
    let mutation = session.append(entry)?;

    Ok(Json(MutationPayload {
        changed: mutation.changed,
        view: session.refresh(),
    }))
}

async fn records_put(
    State(state): State<ApiState>,
    Json(table): Json<Vec<AssessmentRecord>>,
) -> ApiResult<Json<MutationPayload>> {
    let mut session = state.session()?;
    let mutation = session.edit_in_place(table);

    Ok(Json(MutationPayload {
        changed: mutation.changed,
        view: session.refresh(),
    }))
}

async fn records_undo(State(state): State<ApiState>) -> ApiResult<Json<MutationPayload>> {
    let mut session = state.session()?;
    let mutation = session.undo_last()?;

    Ok(Json(MutationPayload {
        changed: mutation.changed,
        view: session.refresh(),
    }))
}

async fn records_clear(State(state): State<ApiState>) -> ApiResult<Json<MutationPayload>> {
    let mut session = state.session()?;
    let mutation = session.clear_all()?;

    Ok(Json(MutationPayload {
        changed: mutation.changed,
        view: session.refresh(),
    }))
}

async fn summary_get(State(state): State<ApiState>) -> ApiResult<Json<Summary>> {
    let view = state.session()?.refresh();

    Ok(Json(view.summary))
}

async fn filter_get(State(state): State<ApiState>) -> ApiResult<Json<FilterPayload>> {
    let session = state.session()?;

    Ok(Json(FilterPayload {
        hotels: session.hotel_filter().iter().copied().collect(),
    }))
}

async fn filter_put(
    State(state): State<ApiState>,
    Json(payload): Json<FilterPayload>,
) -> ApiResult<Json<View>> {
    let mut session = state.session()?;
    session.set_hotel_filter(payload.hotels);

    Ok(Json(session.refresh()))
}

async fn export_download(
    State(state): State<ApiState>,
    Path(format): Path<String>,
) -> ApiResult<Response> {
    let format = format
        .parse::<ExportFormat>()
        .map_err(|error| ApiError::BadRequest(error.to_string()))?;
    let view = state.session()?.refresh();
    let payload = export::render(format, &view.records, &state.config.report_options())?;

    let mut response = Response::new(payload.into_response().into_body());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&format.content_type())?,
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", format.file_name()))?,
    );

    Ok(response)
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Validation { .. } => Self::BadRequest(value.to_string()),
            LedgerError::EmptyUndo => Self::Conflict(value.to_string()),
        }
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ApiError {
    fn from(value: axum::http::header::InvalidHeaderValue) -> Self {
        Self::Internal(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{error:#}") })),
            )
                .into_response(),
        }
    }
}
