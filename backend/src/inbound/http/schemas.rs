//! OpenAPI schema definitions for types that do not derive `ToSchema`.
//!
//! Domain types stay framework-agnostic, so their schemas are registered
//! here through utoipa's external schema support.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No valid session.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not entitled to the resource.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate registration or an existing relationship.
    #[schema(rename = "conflict")]
    Conflict,
    /// A storage dependency timed out or is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected server failure.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Envelope whose `data` is always `null`.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MessageEnvelopeSchema {
    #[schema(value_type = Option<Object>, example = json!(null))]
    data: Option<()>,
    #[schema(example = "Logged out successfully")]
    message: String,
    #[schema(example = 200)]
    status: u16,
}
