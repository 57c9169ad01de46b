//! Uniform JSON response envelope.
//!
//! Every API response, success or failure, is
//! `{"data": ..., "message": ..., "status": ...}`. Error bodies add a stable
//! `code`, an optional per-field `errors` map and the request's `traceId`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::schemas::ErrorCodeSchema;
use crate::domain::{ErrorCode, FieldErrors};

/// Success envelope around a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// Payload, or `null`.
    pub data: Option<T>,
    /// Human-readable outcome.
    pub message: String,
    /// HTTP status, repeated in the body.
    #[schema(example = 200)]
    pub status: u16,
}

impl<T: Serialize> Envelope<T> {
    /// Envelope carrying `data`.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            data,
            message: message.into(),
            status: status.as_u16(),
        }
    }

    /// Render as a JSON response with the envelope's status.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        HttpResponse::build(status).json(self)
    }
}

/// Failure envelope; `data` is always `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `null`.
    #[schema(value_type = Option<Object>, example = json!(null))]
    pub data: Option<serde_json::Value>,
    /// Human-readable reason.
    #[schema(example = "Validation failed")]
    pub message: String,
    /// HTTP status, repeated in the body.
    #[schema(example = 400)]
    pub status: u16,
    /// Stable machine-readable error code.
    #[schema(value_type = ErrorCodeSchema)]
    pub code: ErrorCode,
    /// Field name to message, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// `200 OK` with a payload.
#[must_use]
pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    Envelope::new(StatusCode::OK, message, Some(data)).into_response()
}

/// `201 Created` with a payload.
#[must_use]
pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    Envelope::new(StatusCode::CREATED, message, Some(data)).into_response()
}

/// Envelope with `data: null`.
#[must_use]
pub fn message_only(status: StatusCode, message: &str) -> HttpResponse {
    Envelope::<()>::new(status, message, None).into_response()
}
