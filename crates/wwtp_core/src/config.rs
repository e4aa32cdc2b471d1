//! Runtime configuration for store hosts.
//!
//! # Responsibility
//! - Resolve database path, logging and file-root settings from the
//!   environment.
//! - Keep lookups injectable so resolution is testable without touching the
//!   process environment.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - An unsupported log level is rejected at resolution time.

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "WWTP_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "WWTP_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "WWTP_LOG_DIR";
pub const FILE_ROOT_VAR: &str = "WWTP_FILE_ROOT";

pub const DEFAULT_DB_PATH: &str = "wwtp_equipment.sqlite3";
pub const DEFAULT_FILE_ROOT: &str = "data/files";

/// Resolved store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is off when `None`.
    pub log_dir: Option<PathBuf>,
    /// Root that relative document paths resolve against.
    pub file_root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
            file_root: PathBuf::from(DEFAULT_FILE_ROOT),
        }
    }
}

impl StoreConfig {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    /// - Returns an error when `WWTP_LOG_LEVEL` names an unsupported level.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level)?,
            None => defaults.log_level,
        };

        Ok(Self {
            db_path: read(DB_PATH_VAR).map_or(defaults.db_path, PathBuf::from),
            log_level,
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
            file_root: read(FILE_ROOT_VAR).map_or(defaults.file_root, PathBuf::from),
        })
    }
}
