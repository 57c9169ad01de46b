//! OpenAPI documentation for the JSON API.
//!
//! [`ApiDoc`] registers every handler under `/api`, the health checks, the
//! envelope schemas and the session cookie security scheme. The document is
//! served by Swagger UI in debug builds and printed by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::dto::{
    AddEggsRequest, Dashboard, EggEntryBody, EggTotal, FriendBody, FriendRequestBody,
    FriendshipBody, LedgerChange, LoginRequest, PendingRequestBody, RegisterRequest, SessionUser,
    UserProfile,
};
use crate::inbound::http::envelope::ErrorEnvelope;
use crate::inbound::http::schemas::{ErrorCodeSchema, MessageEnvelopeSchema};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Opaque session handle issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the egg counter API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Egg counter API",
        description = "Session-authenticated egg ledger with friends, plus health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::auth_status,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::eggs::egg_total,
        crate::inbound::http::eggs::add_eggs,
        crate::inbound::http::eggs::undo_eggs,
        crate::inbound::http::friends::send_friend_request,
        crate::inbound::http::friends::pending_requests,
        crate::inbound::http::friends::accept_request,
        crate::inbound::http::friends::reject_request,
        crate::inbound::http::friends::list_friends,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCodeSchema,
        MessageEnvelopeSchema,
        RegisterRequest,
        LoginRequest,
        AddEggsRequest,
        FriendRequestBody,
        UserProfile,
        SessionUser,
        EggEntryBody,
        EggTotal,
        LedgerChange,
        Dashboard,
        FriendshipBody,
        PendingRequestBody,
        FriendBody,
    )),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "dashboard", description = "Per-user summary"),
        (name = "eggs", description = "Append-only egg ledger"),
        (name = "friends", description = "Friend requests and friend lists"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
