//! HTTP inbound adapter exposing the JSON API under `/api`.

pub mod auth;
pub mod dashboard;
pub mod dto;
pub mod eggs;
pub mod envelope;
pub mod error;
pub mod friends;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Every API route, with body and path rejections rendered as envelopes and
/// unknown paths answered with a 404 envelope.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::auth_status)
        .service(dashboard::dashboard)
        .service(eggs::egg_total)
        .service(eggs::add_eggs)
        .service(eggs::undo_eggs)
        .service(friends::send_friend_request)
        .service(friends::pending_requests)
        .service(friends::accept_request)
        .service(friends::reject_request)
        .service(friends::list_friends)
        .default_service(web::to(error::route_not_found))
}
