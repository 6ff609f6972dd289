//! Opaque references to stored attachments and avatars.
//!
//! The domain never reads file contents; it only stores and clears
//! references. Reference generation lives here so every blob store adapter
//! applies the same naming rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Extensions accepted for uploaded attachments (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "zip"];

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Longest accepted reference, in bytes.
pub const FILE_REF_MAX: usize = 255;

/// Validation failures for file references and upload names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileRefError {
    /// Reference or file name was blank after sanitising.
    #[error("file name must not be empty")]
    Empty,
    /// Reference exceeded [`FILE_REF_MAX`].
    #[error("file reference must be at most {max} bytes")]
    TooLong { max: usize },
    /// Reference contained a path separator or was a dot component.
    #[error("file reference must not contain path separators or be '.' or '..'")]
    PathTraversal,
    /// The file extension is not in [`ALLOWED_EXTENSIONS`].
    #[error("file type is not allowed: {extension}")]
    DisallowedExtension { extension: String },
}

/// Opaque stored-file reference.
///
/// ## Invariants
/// - Non-empty and at most [`FILE_REF_MAX`] bytes.
/// - Contains no `/` or `\` and is neither `.` nor `..`, so adapters can
///   treat it as a single path component.
///
/// # Examples
/// ```
/// use catalog::domain::FileRef;
///
/// assert!(FileRef::new("0f3c_report.pdf").is_ok());
/// assert!(FileRef::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "9b2f0c4e5d6a47b8a1c2d3e4f5a6b7c8_thesis.pdf")]
pub struct FileRef(String);

impl FileRef {
    /// Validate an existing reference.
    pub fn new(value: impl Into<String>) -> Result<Self, FileRefError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FileRefError::Empty);
        }
        if value.len() > FILE_REF_MAX {
            return Err(FileRefError::TooLong { max: FILE_REF_MAX });
        }
        if value.contains(['/', '\\']) || matches!(value.as_str(), "." | "..") {
            return Err(FileRefError::PathTraversal);
        }
        Ok(Self(value))
    }

    /// Derive a fresh reference for an uploaded file.
    ///
    /// The name is sanitised, checked against [`ALLOWED_EXTENSIONS`], and
    /// prefixed with a random 32-hex-digit identifier so uploads with the same
    /// name never collide.
    pub fn for_upload(original_name: &str) -> Result<Self, FileRefError> {
        let sanitised = sanitise_file_name(original_name);
        if sanitised.is_empty() {
            return Err(FileRefError::Empty);
        }
        ensure_allowed_extension(&sanitised)?;
        let prefix = Uuid::new_v4().simple();
        let mut reference = format!("{prefix}_{sanitised}");
        if reference.len() > FILE_REF_MAX {
            // Keep the extension; trim the stem.
            let extension = extension_of(&sanitised).unwrap_or_default();
            let keep = FILE_REF_MAX - extension.len() - 1;
            reference.truncate(keep);
            reference.push('.');
            reference.push_str(&extension);
        }
        Self::new(reference)
    }

    /// Borrow the reference string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for FileRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FileRef> for String {
    fn from(value: FileRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for FileRef {
    type Error = FileRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Any directory portion is discarded; ASCII alphanumerics, `.`, `-`, and `_`
/// are kept; everything else becomes `_`; leading dots are stripped.
///
/// # Examples
/// ```
/// use catalog::domain::sanitise_file_name;
///
/// assert_eq!(sanitise_file_name("../My Thesis (v2).pdf"), "My_Thesis__v2_.pdf");
/// ```
pub fn sanitise_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let mapped: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_start_matches('.').to_owned()
}

fn extension_of(name: &str) -> Option<String> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Reject names whose extension is not in [`ALLOWED_EXTENSIONS`].
pub fn ensure_allowed_extension(name: &str) -> Result<(), FileRefError> {
    match extension_of(name) {
        Some(extension) if ALLOWED_EXTENSIONS.contains(&extension.as_str()) => Ok(()),
        Some(extension) => Err(FileRefError::DisallowedExtension { extension }),
        None => Err(FileRefError::DisallowedExtension {
            extension: String::new(),
        }),
    }
}
