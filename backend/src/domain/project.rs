//! Catalog submissions.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{FileRef, UserId};

/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 255;
/// Maximum free-text authors length, in characters.
pub const AUTHORS_TEXT_MAX: usize = 255;
/// Revision assigned to newly created projects.
pub const INITIAL_REVISION: u32 = 1;

/// Validation errors for project fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("project id must be a valid UUID")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("authors must not be empty")]
    EmptyAuthors,
    #[error("authors must be at most {max} characters")]
    AuthorsTooLong { max: usize },
}

impl ProjectValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription => "description",
            Self::EmptyAuthors | Self::AuthorsTooLong { .. } => "authors",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid",
            Self::EmptyTitle | Self::EmptyDescription | Self::EmptyAuthors => "empty",
            Self::TitleTooLong { .. } | Self::AuthorsTooLong { .. } => "too_long",
        }
    }
}

/// Stable project identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, example = "5a2f3c1e-4b6d-4e8f-9a0b-1c2d3e4f5a6b")]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Parse a [`ProjectId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ProjectValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ProjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

fn bounded(
    raw: &str,
    max: usize,
    empty: ProjectValidationError,
    too_long: ProjectValidationError,
) -> Result<String, ProjectValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Validated, editable project fields supplied on create and edit.
///
/// ## Invariants
/// - `title` is trimmed, non-empty, at most [`TITLE_MAX`] characters.
/// - `description` is non-empty once trimmed.
/// - `authors_text` is trimmed, non-empty, at most [`AUTHORS_TEXT_MAX`]
///   characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    title: String,
    description: String,
    authors_text: String,
    file_ref: Option<FileRef>,
}

impl ProjectDraft {
    /// Validate raw form fields.
    ///
    /// # Examples
    /// ```
    /// use catalog::domain::ProjectDraft;
    ///
    /// let draft = ProjectDraft::try_new(" Robots ", "A study", "Ana, Bruno", None).unwrap();
    /// assert_eq!(draft.title(), "Robots");
    /// ```
    pub fn try_new(
        title: &str,
        description: &str,
        authors_text: &str,
        file_ref: Option<FileRef>,
    ) -> Result<Self, ProjectValidationError> {
        let title = bounded(
            title,
            TITLE_MAX,
            ProjectValidationError::EmptyTitle,
            ProjectValidationError::TitleTooLong { max: TITLE_MAX },
        )?;
        if description.trim().is_empty() {
            return Err(ProjectValidationError::EmptyDescription);
        }
        let authors_text = bounded(
            authors_text,
            AUTHORS_TEXT_MAX,
            ProjectValidationError::EmptyAuthors,
            ProjectValidationError::AuthorsTooLong {
                max: AUTHORS_TEXT_MAX,
            },
        )?;
        Ok(Self {
            title,
            description: description.to_owned(),
            authors_text,
            file_ref,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn authors_text(&self) -> &str {
        &self.authors_text
    }

    pub fn file_ref(&self) -> Option<&FileRef> {
        self.file_ref.as_ref()
    }
}

/// Persisted project record.
///
/// `author_ids` is derived from `authors_text` by author reconciliation and
/// is replaced together with it on every edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ref: Option<FileRef>,
    pub authors_text: String,
    #[schema(value_type = Vec<String>)]
    pub author_ids: BTreeSet<UserId>,
    pub revision: u32,
}

impl Project {
    /// Build a first revision from a draft and its reconciled authors.
    pub fn create(
        id: ProjectId,
        draft: ProjectDraft,
        author_ids: BTreeSet<UserId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ProjectDraft {
            title,
            description,
            authors_text,
            file_ref,
        } = draft;
        Self {
            id,
            title,
            description,
            created_at,
            file_ref,
            authors_text,
            author_ids,
            revision: INITIAL_REVISION,
        }
    }

    /// Produce the next revision with the draft applied.
    ///
    /// A draft without a file keeps the current reference.
    pub fn revised(&self, draft: ProjectDraft, author_ids: BTreeSet<UserId>) -> Self {
        let ProjectDraft {
            title,
            description,
            authors_text,
            file_ref,
        } = draft;
        Self {
            id: self.id,
            title,
            description,
            created_at: self.created_at,
            file_ref: file_ref.or_else(|| self.file_ref.clone()),
            authors_text,
            author_ids,
            revision: self.revision.saturating_add(1),
        }
    }

    /// Whether `user` is among the associated authors.
    pub fn has_author(&self, user: &UserId) -> bool {
        self.author_ids.contains(user)
    }
}
