//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        email -> Varchar,
        credential_hash -> Text,
        avatar_ref -> Nullable<Varchar>,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalog entries.
    projects (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        authors_text -> Varchar,
        file_ref -> Nullable<Varchar>,
        /// Starts at 1 and increases on every edit.
        revision -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project to user author associations.
    project_authors (project_id, user_id) {
        project_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    favorites (user_id, project_id) {
        user_id -> Uuid,
        project_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Upload ledger. `claimed` rows are held by a project or profile.
    uploads (file_ref) {
        file_ref -> Varchar,
        uploaded_by -> Nullable<Uuid>,
        uploaded_at -> Timestamptz,
        claimed -> Bool,
    }
}

diesel::joinable!(project_authors -> projects (project_id));
diesel::joinable!(project_authors -> users (user_id));
diesel::joinable!(favorites -> projects (project_id));
diesel::joinable!(favorites -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(favorites, project_authors, projects, uploads, users);
