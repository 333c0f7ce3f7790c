#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! File-backed settings store for the widget-reroll engine.
//!
//! Settings live in a single JSON file that players edit by hand between
//! sessions, so the store is deliberately forgiving: a missing file is
//! replaced with documented defaults, a record written by an older release
//! is restamped to the current schema version with its values kept as-is,
//! and a failure to persist either of those repairs is logged and ignored.
//! Only an unreadable or undecodable file is reported as an error; the
//! store never overwrites a file it could not parse.

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Schema version stamped into freshly written configuration records.
pub const SCHEMA_VERSION: u32 = 2;

const DEFAULT_MIN_WIDGET_COUNT: i32 = 7;
const DEFAULT_MAX_WIDGET_COUNT: i32 = 7;
const DEFAULT_MIN_CUSTOM_INDICATORS: i32 = 1;

/// Versioned configuration record controlling one refresh.
///
/// Replaced wholesale on every reload, never partially mutated. The engine
/// does not require `min_widget_count <= max_widget_count`; out-of-order
/// bounds are symmetrized where the values are consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationRecord {
    /// Version of the schema the record was written with.
    pub schema_version: u32,
    /// Enables randomizing the widget count each bomb.
    pub allow_widget_count_change: bool,
    /// Lower widget-count bound offered to the randomizer.
    pub min_widget_count: i32,
    /// Upper widget-count bound offered to the randomizer.
    pub max_widget_count: i32,
    /// Enables widening each bomb's serial-number character set.
    pub allow_serial_number_change: bool,
    /// Enables appending randomly generated indicator labels to the pool.
    pub allow_custom_indicators: bool,
    /// Minimum number of custom indicator labels offered per refresh.
    pub min_custom_indicators: i32,
}

impl Default for ConfigurationRecord {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            allow_widget_count_change: true,
            min_widget_count: DEFAULT_MIN_WIDGET_COUNT,
            max_widget_count: DEFAULT_MAX_WIDGET_COUNT,
            allow_serial_number_change: true,
            allow_custom_indicators: true,
            min_custom_indicators: DEFAULT_MIN_CUSTOM_INDICATORS,
        }
    }
}

/// Failures surfaced by [`SettingsStore::load`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("settings file I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The settings file contents are not a valid configuration record.
    #[error("failed to decode settings file: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Loads, migrates, and persists the configuration record on demand.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store backed by the provided file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the current configuration record.
    ///
    /// A missing file yields the documented defaults, which are persisted
    /// as a side effect. A record stamped with a foreign schema version is
    /// restamped to [`SCHEMA_VERSION`] and persisted; its field values are
    /// kept untouched and fields absent from the file take their defaults.
    /// Persistence failures are logged and non-fatal; the returned record
    /// is valid either way.
    pub fn load(&self) -> Result<ConfigurationRecord, SettingsError> {
        if !self.path.exists() {
            let record = ConfigurationRecord::default();
            tracing::info!(path = %self.path.display(), "settings file missing, writing defaults");
            self.persist(&record);
            return Ok(record);
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut record: ConfigurationRecord = serde_json::from_str(&contents)?;

        if record.schema_version != SCHEMA_VERSION {
            tracing::info!(
                from = record.schema_version,
                to = SCHEMA_VERSION,
                "settings schema version changed, restamping"
            );
            record.schema_version = SCHEMA_VERSION;
            self.persist(&record);
        }

        Ok(record)
    }

    fn persist(&self, record: &ConfigurationRecord) {
        if let Err(error) = self.try_persist(record) {
            tracing::warn!(
                path = %self.path.display(),
                %error,
                "failed to persist settings, keeping in-memory record"
            );
        }
    }

    fn try_persist(&self, record: &ConfigurationRecord) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
