//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{favorites, project_authors, projects, uploads, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub credential_hash: String,
    pub avatar_ref: Option<String>,
    pub is_admin: bool,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub credential_hash: &'a str,
    pub avatar_ref: Option<&'a str>,
    pub is_admin: bool,
}

/// Profile columns rewritten by `update_profile`. `avatar_ref` is always
/// written so clearing it persists.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub avatar_ref: Option<&'a str>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub authors_text: String,
    pub file_ref: Option<String>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub authors_text: &'a str,
    pub file_ref: Option<&'a str>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
}

/// Editable project columns. The revision is bumped in SQL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub authors_text: &'a str,
    pub file_ref: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectAuthorRow {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = favorites)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = uploads)]
pub(crate) struct NewUploadRow<'a> {
    pub file_ref: &'a str,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
    pub claimed: bool,
}
