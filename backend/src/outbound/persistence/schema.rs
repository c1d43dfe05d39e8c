//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! regenerate with `diesel print-schema` after schema changes.

diesel::table! {
    /// Organizations table.
    ///
    /// Soft deletion is a tombstone: `deleted_at` set means the row is
    /// invisible to default reads but retained for audit.
    organizations (id) {
        /// Primary key: UUID v4, generated by the database.
        id -> Uuid,
        name -> Varchar,
        /// Latitude/longitude are nullable together; the adapter enforces
        /// the pair invariant when decoding rows.
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        address -> Nullable<Text>,
        description -> Nullable<Text>,
        image_urls -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Users table. Every user references exactly one organization.
    users (id) {
        /// Primary key: UUID v4, generated by the database.
        id -> Uuid,
        /// Unique among live rows (partial unique index).
        email -> Varchar,
        #[max_length = 255]
        name -> Varchar,
        organization_id -> Uuid,
        is_admin -> Bool,
        phone_number -> Nullable<Varchar>,
        social_media -> Nullable<Varchar>,
        description -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        research_categories -> Array<Text>,
        /// Argon2id PHC string; never exposed outbound.
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(users -> organizations (organization_id));
diesel::allow_tables_to_appear_in_same_query!(organizations, users);
