//! Server settings loaded via OrthoConfig and the resolved server config.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use catalog::outbound::persistence::DbPool;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
/// `Key::derive_from` needs at least this many bytes.
const MIN_KEY_MATERIAL: usize = 32;

/// Values read from CLI flags, `CATALOG_*` environment variables, and config
/// files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATALOG")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Directory for uploaded attachments and avatars.
    pub upload_dir: Option<PathBuf>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Ephemeral keys are always permitted in debug builds.
    pub fn ephemeral_key_allowed(&self) -> bool {
        cfg!(debug_assertions) || self.allow_ephemeral_session_key
    }
}

fn read_key_file(path: &Path) -> io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "key path has no file name"))?;
    Dir::open_ambient_dir(parent, ambient_authority())?.read(file_name)
}

fn read_key_material(path: &Path) -> io::Result<Vec<u8>> {
    let bytes = read_key_file(path)?;
    if bytes.len() < MIN_KEY_MATERIAL {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("key material shorter than {MIN_KEY_MATERIAL} bytes"),
        ));
    }
    Ok(bytes)
}

/// Load the session key, falling back to a random key when allowed.
///
/// # Errors
///
/// Returns an I/O error when the key file cannot be read and ephemeral keys
/// are not permitted.
pub fn load_session_key(settings: &ServerSettings) -> io::Result<Key> {
    let path = settings.session_key_file();
    match read_key_material(&path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) if settings.ephemeral_key_allowed() => {
            warn!(path = %path.display(), error = %err, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(err) => Err(io::Error::other(format!(
            "failed to read session key at {}: {err}",
            path.display()
        ))),
    }
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) upload_dir: PathBuf,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, db_pool: DbPool, settings: &ServerSettings) -> Self {
        Self {
            key,
            cookie_secure: settings.cookie_secure,
            same_site: SameSite::Lax,
            bind_addr: settings.bind_addr(),
            db_pool,
            upload_dir: settings.upload_dir(),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
