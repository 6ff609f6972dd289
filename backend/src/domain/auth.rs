//! Account payloads: login credentials, registration, and profile updates.
//!
//! Constructors validate raw strings so inbound adapters hand services
//! well-formed values. Passwords are held in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::{DisplayName, Email, FileRef, UserValidationError};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when account payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password confirmation did not match.
    PasswordMismatch,
    /// Name or email failed identity validation.
    Identity(UserValidationError),
}

impl AccountValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "confirmPassword",
            Self::Identity(
                UserValidationError::EmptyDisplayName
                | UserValidationError::DisplayNameTooLong { .. },
            ) => "displayName",
            Self::Identity(UserValidationError::InvalidId) => "id",
            Self::Identity(_) => "email",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyPassword => "empty",
            Self::PasswordTooShort { .. } => "too_short",
            Self::PasswordMismatch => "mismatch",
            Self::Identity(
                UserValidationError::EmptyDisplayName | UserValidationError::EmptyEmail,
            ) => "empty",
            Self::Identity(
                UserValidationError::DisplayNameTooLong { .. }
                | UserValidationError::EmailTooLong { .. },
            ) => "too_long",
            Self::Identity(_) => "invalid",
        }
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::Identity(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AccountValidationError {}

impl From<UserValidationError> for AccountValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Identity(value)
    }
}

fn validate_new_password(
    password: &str,
    confirm: &str,
) -> Result<Zeroizing<String>, AccountValidationError> {
    if password.is_empty() {
        return Err(AccountValidationError::EmptyPassword);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(AccountValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    if password != confirm {
        return Err(AccountValidationError::PasswordMismatch);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. It is not
///   syntax-checked; unknown addresses simply fail authentication.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use catalog::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ana@example.org ", "secret").unwrap();
/// assert_eq!(creds.email(), "ana@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AccountValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration form fields prior to validation.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub avatar_ref: Option<FileRef>,
}

/// Validated registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    display_name: DisplayName,
    email: Email,
    password: Zeroizing<String>,
    avatar_ref: Option<FileRef>,
}

impl RegistrationRequest {
    /// Validate the raw registration fields.
    pub fn try_new(input: RegistrationInput<'_>) -> Result<Self, AccountValidationError> {
        let display_name = DisplayName::new(input.display_name)?;
        let email = Email::new(input.email)?;
        let password = validate_new_password(input.password, input.confirm_password)?;
        Ok(Self {
            display_name,
            email,
            password,
            avatar_ref: input.avatar_ref,
        })
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Requested login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional uploaded avatar.
    pub fn avatar_ref(&self) -> Option<&FileRef> {
        self.avatar_ref.as_ref()
    }
}

/// Raw profile form fields prior to validation. Blank values mean "keep".
#[derive(Debug, Clone, Default)]
pub struct ProfileInput<'a> {
    pub display_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub confirm_password: Option<&'a str>,
    pub avatar_ref: Option<FileRef>,
}

/// Validated partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<DisplayName>,
    pub email: Option<Email>,
    pub password: Option<Zeroizing<String>>,
    pub avatar_ref: Option<FileRef>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProfileUpdate {
    /// Validate the supplied profile fields, ignoring absent or blank ones.
    pub fn try_new(input: ProfileInput<'_>) -> Result<Self, AccountValidationError> {
        let display_name = present(input.display_name)
            .map(DisplayName::new)
            .transpose()?;
        let email = present(input.email).map(Email::new).transpose()?;
        let password = match input.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(validate_new_password(
                password,
                input.confirm_password.unwrap_or_default(),
            )?),
            None => None,
        };
        Ok(Self {
            display_name,
            email,
            password,
            avatar_ref: input.avatar_ref,
        })
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.avatar_ref.is_none()
    }
}
