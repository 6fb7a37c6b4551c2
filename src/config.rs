//! Runtime configuration for the data-access layer. Values come from the
//! process environment (optionally primed from a `.env` file) and are handed
//! to [`crate::Library`] explicitly.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use tracing::debug;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-desk";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";

/// Overrides the database file location.
pub const DB_PATH_VAR: &str = "LIBRARY_DB_PATH";
/// Librarian recorded on every checkout.
pub const LIBRARIAN_ID_VAR: &str = "LIBRARY_LIBRARIAN_ID";

const DEFAULT_LIBRARIAN_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// SQLite file every query opens.
    pub database_path: PathBuf,
    /// Librarian id written into new `Transaction` rows.
    pub librarian_id: i64,
}

impl LibraryConfig {
    /// Config for an explicit database file, recording librarian 1.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            librarian_id: DEFAULT_LIBRARIAN_ID,
        }
    }

    /// Record a different librarian on new checkouts.
    pub fn with_librarian(mut self, librarian_id: i64) -> Self {
        self.librarian_id = librarian_id;
        self
    }

    /// Build the config from `LIBRARY_DB_PATH` and `LIBRARY_LIBRARIAN_ID`,
    /// loading `.env` from the working directory first if one exists. A
    /// malformed `.env` is an error.
    pub fn from_env() -> Result<Self> {
        accept_env_file(dotenvy::dotenv())?;

        let database_path = match env::var_os(DB_PATH_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let librarian_id = match env::var(LIBRARIAN_ID_VAR) {
            Ok(raw) => parse_librarian_id(&raw)?,
            Err(_) => DEFAULT_LIBRARIAN_ID,
        };

        Ok(Self {
            database_path,
            librarian_id,
        })
    }
}

/// A missing `.env` is the normal case; anything else that went wrong while
/// reading it is reported.
fn accept_env_file(loaded: dotenvy::Result<PathBuf>) -> Result<()> {
    match loaded {
        Ok(path) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(())
        }
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("failed to load .env file"),
    }
}

fn parse_librarian_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("{LIBRARIAN_ID_VAR} must be an integer, got {raw:?}"))
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_librarian() {
        let config = LibraryConfig::new("/tmp/lib.sqlite");
        assert_eq!(config.librarian_id, 1);
        assert_eq!(config.database_path, PathBuf::from("/tmp/lib.sqlite"));
    }

    #[test]
    fn missing_env_file_is_fine() {
        let dir = tempfile::TempDir::new().unwrap();
        let loaded = dotenvy::from_path(dir.path().join("absent.env")).map(|()| PathBuf::new());
        assert!(accept_env_file(loaded).is_ok());
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "LIBRARY_DESK_BROKEN='unterminated\n").unwrap();

        let loaded = dotenvy::from_path(&path).map(|()| path.clone());
        let err = accept_env_file(loaded).unwrap_err();
        assert!(err.to_string().contains(".env"), "{err:#}");
    }

    #[test]
    fn librarian_id_must_be_numeric() {
        assert_eq!(parse_librarian_id(" 3 ").unwrap(), 3);
        let err = parse_librarian_id("head librarian").unwrap_err();
        assert!(err.to_string().contains(LIBRARIAN_ID_VAR));
    }
}
