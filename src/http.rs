//! HTTP boundary for the transcript service.
//!
//! Decodes the JSON body, calls [`crate::fetch_transcript`], and maps the outcome to a status
//! code. Method and CORS policy are enforced here so the core stays transport-agnostic.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::caption::CaptionSource;
use crate::cors::CorsPolicy;
use crate::failure::{FailureCategory, FailureReport};
use crate::opts::Opts;
use crate::transcript::TranscriptRequest;

pub const TRANSCRIPT_PATH: &str = "/api/youtube-transcript";

/// Shared, read-only state handed to every request.
pub struct AppState<S> {
    pub source: Arc<S>,
    pub opts: Arc<Opts>,
}

impl<S> AppState<S> {
    pub fn new(source: S, opts: Opts) -> Self {
        Self {
            source: Arc::new(source),
            opts: Arc::new(opts),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            opts: Arc::clone(&self.opts),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptBody {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error response: `{ "error": ... }` with a status derived from the failure category.
///
/// The category rides along as a response extension so outer middleware can count failures
/// without parsing bodies.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    category: Option<FailureCategory>,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            category: Some(FailureCategory::InvalidInput),
        }
    }
}

impl From<FailureReport> for AppError {
    fn from(report: FailureReport) -> Self {
        Self {
            status: status_for(report.category),
            message: report.message,
            category: Some(report.category),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        let mut response = (self.status, body).into_response();
        if let Some(category) = self.category {
            response.extensions_mut().insert(category);
        }
        response
    }
}

/// HTTP status for each failure category.
pub fn status_for(category: FailureCategory) -> StatusCode {
    match category {
        FailureCategory::InvalidInput => StatusCode::BAD_REQUEST,
        FailureCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureCategory::NotFound => StatusCode::NOT_FOUND,
        FailureCategory::UpstreamError => StatusCode::BAD_GATEWAY,
        FailureCategory::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the application router: transcript endpoint, health checks, and CORS.
pub fn router<S>(state: AppState<S>, cors: &CorsPolicy) -> Router
where
    S: CaptionSource + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(
            TRANSCRIPT_PATH,
            post(transcript::<S>).fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(cors.layer())
}

async fn root() -> &'static str {
    "younotes-server: POST /api/youtube-transcript {\"url\": \"...\", \"lang\": \"en\"}"
}

async fn healthz() -> &'static str {
    "ok"
}

async fn transcript<S>(
    State(state): State<AppState<S>>,
    body: std::result::Result<Json<TranscriptBody>, JsonRejection>,
) -> std::result::Result<Json<TranscriptResponse>, AppError>
where
    S: CaptionSource + Send + Sync + 'static,
{
    let Json(body) = body.map_err(|err| {
        AppError::bad_request(format!("Invalid request body: {}", err.body_text()))
    })?;

    let Some(url) = body.url else {
        return Err(FailureReport::no_url().into());
    };

    let request = TranscriptRequest::new(url, body.lang.as_deref());
    let result = request.fetch(state.source.as_ref(), &state.opts).await?;

    Ok(Json(TranscriptResponse {
        transcript: result.full_text,
    }))
}

async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {method} Not Allowed"),
    )
        .into_response()
}
