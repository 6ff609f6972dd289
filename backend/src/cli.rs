//! Helpers shared by the maintenance binaries.

use std::env;

/// Problems locating the database for a command-line tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseUrlError {
    #[error("--database-url must not be empty when provided")]
    EmptyFlag,
    #[error("database URL missing: set --database-url or DATABASE_URL")]
    Missing,
    #[error("DATABASE_URL must not be empty")]
    EmptyEnv,
}

/// Use the explicit flag value when given, otherwise `DATABASE_URL`.
///
/// # Errors
///
/// Returns [`DatabaseUrlError`] when neither source yields a non-blank URL.
pub fn resolve_database_url(explicit: Option<String>) -> Result<String, DatabaseUrlError> {
    match explicit {
        Some(value) if value.trim().is_empty() => Err(DatabaseUrlError::EmptyFlag),
        Some(value) => Ok(value),
        None => {
            let from_env = env::var("DATABASE_URL").map_err(|_| DatabaseUrlError::Missing)?;
            if from_env.trim().is_empty() {
                return Err(DatabaseUrlError::EmptyEnv);
            }
            Ok(from_env)
        }
    }
}
