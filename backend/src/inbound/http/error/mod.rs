//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! return it directly. Every failure becomes exactly one [`ErrorEnvelope`].
//! Infrastructure failures are logged in full and answered with a generic
//! message.

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use super::envelope::ErrorEnvelope;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";
const ROUTE_NOT_FOUND: &str = "Resource not found";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message safe to show the client.
fn public_message(error: &Error) -> &str {
    match error.code() {
        ErrorCode::InternalError => INTERNAL_MESSAGE,
        ErrorCode::ServiceUnavailable => UNAVAILABLE_MESSAGE,
        _ => error.message(),
    }
}

fn envelope_for(error: &Error) -> ErrorEnvelope {
    ErrorEnvelope {
        data: None,
        message: public_message(error).to_owned(),
        status: status_for(error.code()).as_u16(),
        code: error.code(),
        errors: error.field_errors().cloned(),
        trace_id: error.trace_id().map(str::to_owned),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self.code(),
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable
        ) {
            error!(
                code = ?self.code(),
                trace_id = self.trace_id().unwrap_or("-"),
                detail = self.message(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(envelope_for(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(format!("framework error: {err}"))
    }
}

/// `JsonConfig` error handler: malformed bodies become 400 envelopes.
#[must_use]
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected request body");
    let message = match &err {
        JsonPayloadError::ContentType => "Expected a JSON request body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("Invalid request body: {inner}"),
        _ => "Invalid request body".to_owned(),
    };
    Error::invalid_request(message).into()
}

/// `PathConfig` error handler: malformed path parameters become 400 envelopes.
#[must_use]
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected path parameter");
    Error::invalid_request("Invalid path parameter").into()
}

/// Default service for unknown API routes.
#[expect(clippy::unused_async, reason = "actix default services must return a future")]
pub async fn route_not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found(ROUTE_NOT_FOUND))
}
