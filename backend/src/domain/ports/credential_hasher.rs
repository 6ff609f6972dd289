//! Driven port for password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored credential hash is malformed: {message}",
    }
}

/// One-way password hashing producing self-describing (PHC) strings.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plain-text password.
    fn hash(&self, password: &str) -> Result<String, CredentialHashError>;

    /// Check a plain-text password against a stored hash.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialHashError>;
}
