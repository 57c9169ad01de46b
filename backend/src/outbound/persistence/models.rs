//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{egg_entries, friendships, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = egg_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EggEntryRow {
    pub id: i64,
    pub user_id: Uuid,
    pub amount: i32,
    pub reverses_entry_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = egg_entries)]
pub(crate) struct NewEggEntryRow {
    pub user_id: Uuid,
    pub amount: i32,
    pub reverses_entry_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendshipRow {
    pub id: i64,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = friendships)]
pub(crate) struct NewFriendshipRow<'a> {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}
