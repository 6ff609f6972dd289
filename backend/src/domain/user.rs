//! Identity records.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::FileRef;

/// Maximum allowed length for a display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 120;
/// Maximum allowed length for an email address, in characters.
pub const EMAIL_MAX: usize = 120;

/// Validation errors for identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Human readable display name, also the key authors are matched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ana Souza")]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Login email address. Stored trimmed, otherwise as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ana@example.org")]
pub struct Email(String);

impl Email {
    /// Trim and validate an email address.
    ///
    /// # Examples
    /// ```
    /// use catalog::domain::Email;
    ///
    /// assert!(Email::new(" ana@example.org ").is_ok());
    /// assert!(Email::new("ana@localhost").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = email.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let mut parts = trimmed.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
        if local.is_empty() || !domain_ok || trimmed.contains(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered identity as seen by the rest of the domain.
///
/// The credential hash lives on [`UserAccount`] so it never leaks into
/// serialised profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    display_name: DisplayName,
    email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_ref: Option<FileRef>,
    is_admin: bool,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(
        id: UserId,
        display_name: DisplayName,
        email: Email,
        avatar_ref: Option<FileRef>,
        is_admin: bool,
    ) -> Self {
        Self {
            id,
            display_name,
            email,
            avatar_ref,
            is_admin,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Name shown to other users and matched against author text.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Optional avatar image reference.
    pub fn avatar_ref(&self) -> Option<&FileRef> {
        self.avatar_ref.as_ref()
    }

    /// Whether the identity carries the administrator role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Replace the display name.
    pub fn set_display_name(&mut self, display_name: DisplayName) {
        self.display_name = display_name;
    }

    /// Replace the login email.
    pub fn set_email(&mut self, email: Email) {
        self.email = email;
    }

    /// Replace the avatar reference.
    pub fn set_avatar_ref(&mut self, avatar_ref: Option<FileRef>) {
        self.avatar_ref = avatar_ref;
    }

    /// Grant the administrator role.
    pub fn promote_to_admin(&mut self) {
        self.is_admin = true;
    }
}

/// A [`User`] together with its stored credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub credential_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Ana Souza  ", "Ana Souza")]
    #[case("Bruno", "Bruno")]
    fn display_names_are_trimmed(#[case] input: &str, #[case] expected: &str) {
        let name = DisplayName::new(input).expect("valid display name");
        assert_eq!(name.as_ref(), expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyDisplayName)]
    #[case("   ", UserValidationError::EmptyDisplayName)]
    #[case(&"a".repeat(121), UserValidationError::DisplayNameTooLong { max: DISPLAY_NAME_MAX })]
    fn display_name_rejects_invalid(#[case] input: &str, #[case] expected: UserValidationError) {
        assert_eq!(DisplayName::new(input), Err(expected));
    }

    #[rstest]
    fn display_name_limit_counts_characters() {
        assert!(DisplayName::new("é".repeat(DISPLAY_NAME_MAX)).is_ok());
    }

    #[rstest]
    #[case("ana@example.org")]
    #[case(" Ana.Souza@Uni.Example.edu ")]
    fn accepts_emails(#[case] input: &str) {
        let email = Email::new(input).expect("valid email");
        assert_eq!(email.as_ref(), input.trim());
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("ana", UserValidationError::InvalidEmail)]
    #[case("@example.org", UserValidationError::InvalidEmail)]
    #[case("ana@localhost", UserValidationError::InvalidEmail)]
    #[case("ana@@example.org", UserValidationError::InvalidEmail)]
    #[case("a b@example.org", UserValidationError::InvalidEmail)]
    #[case("ana@.org", UserValidationError::InvalidEmail)]
    fn rejects_emails(#[case] input: &str, #[case] expected: UserValidationError) {
        assert_eq!(Email::new(input), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_email() {
        let input = format!("{}@example.org", "a".repeat(EMAIL_MAX));
        assert_eq!(
            Email::new(input),
            Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
        );
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn user_id_rejects_invalid(#[case] input: &str) {
        assert_eq!(UserId::new(input), Err(UserValidationError::InvalidId));
    }

    #[rstest]
    fn serialised_user_omits_credentials() {
        let user = User::new(
            UserId::random(),
            DisplayName::new("Ana").expect("name"),
            Email::new("ana@example.org").expect("email"),
            None,
            true,
        );
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(value["displayName"], "Ana");
        assert_eq!(value["isAdmin"], true);
        assert!(value.get("avatarRef").is_none());
        assert!(value.get("credentialHash").is_none());
    }
}
