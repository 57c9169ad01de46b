//! Egg ledger endpoints.
//!
//! ```text
//! GET /api/eggcount
//! POST /api/eggcount {"amount":6}
//! DELETE /api/eggcount/42
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use tracing::warn;

use super::ApiResult;
use super::dto::{AddEggsRequest, EggEntryBody, EggTotal, LedgerChange};
use super::envelope::{Envelope, ErrorEnvelope, ok};
use super::session::Authenticated;
use super::state::HttpState;
use super::validation::{egg_amount_from, entry_id_from};
use crate::domain::EggEntry;

/// Current total for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/eggcount",
    responses(
        (status = 200, description = "Running total", body = Envelope<EggTotal>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["eggs"],
    operation_id = "eggTotal"
)]
#[get("/eggcount")]
pub async fn egg_total(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let total_eggs = state.eggs.total(&auth.user_id).await?;
    Ok(ok("Egg count retrieved successfully", EggTotal { total_eggs }))
}

/// Record a collection.
#[utoipa::path(
    post,
    path = "/api/eggcount",
    request_body = AddEggsRequest,
    responses(
        (status = 200, description = "Entry appended", body = Envelope<LedgerChange>),
        (status = 400, description = "Invalid amount", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["eggs"],
    operation_id = "addEggs"
)]
#[post("/eggcount")]
pub async fn add_eggs(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<AddEggsRequest>,
) -> ApiResult<HttpResponse> {
    let amount = egg_amount_from(&payload)?;
    let entry = state.eggs.append(&auth.user_id, amount).await?;
    let change = ledger_change(&state, &auth, &entry).await;
    Ok(ok("Egg count added successfully", change))
}

/// Reverse an entry by appending a compensating one.
#[utoipa::path(
    delete,
    path = "/api/eggcount/{id}",
    params(("id" = i64, Path, description = "Ledger entry to reverse")),
    responses(
        (status = 200, description = "Entry reversed", body = Envelope<LedgerChange>),
        (status = 400, description = "Invalid entry id", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 403, description = "Entry belongs to another user", body = ErrorEnvelope),
        (status = 404, description = "Entry not found", body = ErrorEnvelope),
        (status = 409, description = "Entry already reversed", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["eggs"],
    operation_id = "undoEggs"
)]
#[delete("/eggcount/{id}")]
pub async fn undo_eggs(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let entry_id = entry_id_from(path.into_inner())?;
    let compensating = state.eggs.undo(&auth.user_id, entry_id).await?;
    let change = ledger_change(&state, &auth, &compensating).await;
    Ok(ok("Entry successfully undone", change))
}

/// The write has already committed, so a failed total read must not turn
/// the response into an error a client would retry.
async fn ledger_change(state: &HttpState, auth: &Authenticated, entry: &EggEntry) -> LedgerChange {
    let total_eggs = state
        .eggs
        .total(&auth.user_id)
        .await
        .inspect_err(|error| {
            warn!(
                user_id = %auth.user_id,
                entry_id = %entry.id,
                code = ?error.code(),
                "entry stored but total unavailable"
            );
        })
        .ok();
    LedgerChange {
        entry: EggEntryBody::from(entry),
        total_eggs,
    }
}
