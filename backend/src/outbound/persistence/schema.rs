//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the deployed schema exactly. The `nick_name`
//! column carries a UNIQUE constraint; that constraint, not the validation
//! stage's fast-path check, is the source of truth for nickname uniqueness.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Primary key: UUID v4 identifier, generated by the application.
        id -> Uuid,
        /// Nickname shown to other users (UNIQUE).
        nick_name -> Varchar,
        /// Age in whole years.
        age -> Int4,
    }
}
