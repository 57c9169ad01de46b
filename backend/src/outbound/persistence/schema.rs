//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly. `diesel print-schema` against a
//! migrated database regenerates them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique, case-sensitive.
        username -> Varchar,
        /// Unique, stored lower-cased.
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only egg ledger.
    egg_entries (id) {
        id -> Int8,
        user_id -> Uuid,
        /// Positive for additions, negative for compensating entries.
        amount -> Int4,
        /// Unique when set: an entry is reversed at most once.
        reverses_entry_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed friend requests.
    friendships (id) {
        id -> Int8,
        from_user_id -> Uuid,
        to_user_id -> Uuid,
        /// `pending`, `accepted`, or `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(egg_entries -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, egg_entries, friendships);
