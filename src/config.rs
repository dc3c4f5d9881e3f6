use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Environment override for snapshot publishing, read the same way the
/// logging module reads `RUST_LOG_FORMAT`. Works both ways: a truthy
/// value (`1`, `true`, `yes`) enables, a falsy value (`0`, `false`,
/// `no`) disables, and anything else leaves the config-file setting
/// untouched.
const PUBLISH_SNAPSHOTS_ENV: &str = "TESTLEDGER_PUBLISH_SNAPSHOTS";

fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub const DEFAULT_DB_PATH: &str = ".testledger/results.sqlite3";

/// Publisher settings.
///
/// Precedence, lowest to highest: built-in defaults, JSON config file,
/// environment, CLI flags (applied by the caller).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublisherConfig {
    /// When false (the default), suites built from a snapshot version are
    /// suppressed rather than published.
    pub publish_snapshots: bool,
    /// Path of the SQLite ledger.
    pub db_path: PathBuf,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            publish_snapshots: false,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl PublisherConfig {
    /// Load the config file if one was given, then apply environment
    /// overrides.
    pub fn load(config_path: Option<&Path>) -> LedgerResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|error| {
                    LedgerError::Config(format!(
                        "cannot read config file `{}`: {error}",
                        path.display()
                    ))
                })?;
                serde_json::from_str::<Self>(&raw).map_err(|error| {
                    LedgerError::Config(format!(
                        "invalid config file `{}`: {error}",
                        path.display()
                    ))
                })?
            }
            None => Self::default(),
        };

        if let Ok(raw) = std::env::var(PUBLISH_SNAPSHOTS_ENV) {
            if let Some(enabled) = parse_toggle(&raw) {
                config.publish_snapshots = enabled;
            }
        }

        Ok(config)
    }
}
