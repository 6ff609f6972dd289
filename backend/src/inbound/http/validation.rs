//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure reaches the client as `400 invalid_request` with
//! `details { field, code }`, where `field` is the camelCase payload key.

use serde_json::json;

use crate::domain::{
    AccountValidationError, Error, FileRef, FileRefError, ProjectId, ProjectValidationError,
    UserId,
};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: &str, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code,
        }))
    }
}

pub(crate) fn account_error(err: AccountValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

pub(crate) fn project_error(err: ProjectValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

pub(crate) fn file_ref_error(field: FieldName, err: FileRefError) -> Error {
    let code = match err {
        FileRefError::Empty => "empty",
        FileRefError::TooLong { .. } => "too_long",
        FileRefError::PathTraversal | FileRefError::DisallowedExtension { .. } => "invalid",
    };
    ValidationError::new(field.as_str(), err.to_string()).with_code(code)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value("invalid_uuid", value)
}

pub(crate) fn parse_project_id(value: &str, field: FieldName) -> Result<ProjectId, Error> {
    ProjectId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_file_ref(value: String, field: FieldName) -> Result<FileRef, Error> {
    FileRef::new(value).map_err(|err| file_ref_error(field, err))
}

/// Parse an optional reference, treating blank strings as absent.
pub(crate) fn parse_optional_file_ref(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<FileRef>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_file_ref(raw, field))
        .transpose()
}
