//! HTTP error envelope and mapping from domain errors.
//!
//! Keeps the domain free of transport concerns by translating
//! [`GraphError`] into Actix responses here. Cache degradation never
//! reaches this layer; it is absorbed and logged inside the orchestrator.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::GraphError;
use crate::domain::ports::NetworkSourceError;
use crate::middleware::trace::TraceId;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "Trace-Id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The place did not resolve to a road network.
    NotFound,
    /// The external map-data source is unreachable or misbehaving.
    UpstreamUnavailable,
    /// An unexpected error occurred inside the service.
    InternalError,
}

/// Standard error envelope returned by the HTTP adapter.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "place name must not be empty or whitespace-only")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl ApiError {
    /// Build an envelope, capturing any ambient trace identifier.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    fn to_status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::InvalidQuery { message } => Self::new(ErrorCode::InvalidRequest, message),
            GraphError::Retrieval { place, source } => match source {
                NetworkSourceError::NotFound { .. } => Self::new(
                    ErrorCode::NotFound,
                    format!("no road network found for '{place}'"),
                ),
                other => {
                    error!(%place, error = %other, "external source failure");
                    Self::new(
                        ErrorCode::UpstreamUnavailable,
                        format!("map-data source failed for '{place}'"),
                    )
                }
            },
            GraphError::InvalidGraph { message } => {
                error!(%message, "projection precondition violated");
                Self::new(ErrorCode::InternalError, message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        if matches!(self.code, ErrorCode::InternalError) {
            let mut redacted = self.clone();
            redacted.message = "Internal server error".to_owned();
            return builder.json(redacted);
        }
        builder.json(self)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
