use crate::types::{CollectorError, CursorPersistence, Result};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Europe::London;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub const CURSOR_RECORD_VERSION: u32 = 1;

/// Single-line format written by older deployments, e.g. `19-Oct-2026 (06:00:00.123456)`,
/// in London wall-clock time.
const LEGACY_FORMAT: &str = "%d-%b-%Y (%H:%M:%S%.f)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorRecord {
    pub version: u32,
    pub collected_until: DateTime<Utc>,
}

impl CursorRecord {
    pub fn new(collected_until: DateTime<Utc>) -> Self {
        Self {
            version: CURSOR_RECORD_VERSION,
            collected_until,
        }
    }
}

/// Decode stored cursor text; `None` when it is neither a known record nor the legacy format.
pub fn parse_cursor(content: &str) -> Option<DateTime<Utc>> {
    let content = content.trim();

    if let Ok(record) = serde_json::from_str::<CursorRecord>(content) {
        if record.version == CURSOR_RECORD_VERSION {
            return Some(record.collected_until);
        }
        warn!("Unsupported cursor record version {}", record.version);
        return None;
    }

    NaiveDateTime::parse_from_str(content, LEGACY_FORMAT)
        .ok()
        .map(legacy_to_utc)
}

/// Ambiguous autumn times resolve to the earlier instant. Times inside the
/// spring gap are read as GMT, which also errs early.
fn legacy_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    London
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Cursor kept in a JSON file, replaced atomically on save.
pub struct FileCursorPersistence {
    path: PathBuf,
}

impl FileCursorPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cursor".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CursorPersistence for FileCursorPersistence {
    async fn load(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cursor stored at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading cursor {}", self.path.display()));
            }
        };

        let parsed = parse_cursor(&content);
        if parsed.is_none() {
            warn!("Ignoring unreadable cursor contents in {}", self.path.display());
        }
        Ok(parsed)
    }

    async fn save(&self, collected_until: DateTime<Utc>) -> anyhow::Result<()> {
        let record = serde_json::to_string(&CursorRecord::new(collected_until))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, record)
            .await
            .with_context(|| format!("writing {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("replacing cursor {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process cursor, with switchable failures for exercising systemic error paths.
#[derive(Default)]
pub struct InMemoryCursorPersistence {
    value: Mutex<Option<DateTime<Utc>>>,
    fail_load: bool,
    fail_save: bool,
}

impl InMemoryCursorPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(collected_until: DateTime<Utc>) -> Self {
        Self {
            value: Mutex::new(Some(collected_until)),
            ..Self::default()
        }
    }

    pub fn failing_loads(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn current(&self) -> Option<DateTime<Utc>> {
        self.value.lock().map(|v| *v).unwrap_or(None)
    }
}

#[async_trait]
impl CursorPersistence for InMemoryCursorPersistence {
    async fn load(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        if self.fail_load {
            anyhow::bail!("cursor store unavailable");
        }
        let value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("cursor lock poisoned"))?;
        Ok(*value)
    }

    async fn save(&self, collected_until: DateTime<Utc>) -> anyhow::Result<()> {
        if self.fail_save {
            anyhow::bail!("cursor store is read-only");
        }
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("cursor lock poisoned"))?;
        *value = Some(collected_until);
        Ok(())
    }
}

/// Read and advance the collection cursor.
#[derive(Clone)]
pub struct CursorStore {
    persistence: Arc<dyn CursorPersistence>,
    default_lookback: Duration,
}

impl CursorStore {
    pub fn new(persistence: Arc<dyn CursorPersistence>, default_lookback: Duration) -> Self {
        Self {
            persistence,
            default_lookback,
        }
    }

    pub fn default_lookback(&self) -> Duration {
        self.default_lookback
    }

    /// The stored cursor, or `now - default_lookback` when none is usable.
    ///
    /// Only a failing store is an error. Missing or corrupt contents and a
    /// cursor later than `now` all fall back to the default window, so the
    /// returned value is never after `now`.
    pub async fn read(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let stored = self
            .persistence
            .load()
            .await
            .map_err(|e| CollectorError::Cursor(format!("{:#}", e)))?;

        match stored {
            Some(cursor) if cursor <= now => Ok(cursor),
            Some(cursor) => {
                warn!(
                    "Stored cursor {} is later than now ({}), ignoring it",
                    cursor.to_rfc3339(),
                    now.to_rfc3339()
                );
                Ok(self.fallback(now))
            }
            None => Ok(self.fallback(now)),
        }
    }

    fn fallback(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let fallback = now
            .checked_sub_signed(self.default_lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        info!(
            "Collecting the last {}h (since {})",
            self.default_lookback.num_hours(),
            fallback.to_rfc3339()
        );
        fallback
    }

    /// Store the start time of a completed run. Returns the value stored.
    pub async fn write(&self, collected_until: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.persistence
            .save(collected_until)
            .await
            .map_err(|e| CollectorError::Cursor(format!("{:#}", e)))?;

        debug!("Cursor advanced to {}", collected_until.to_rfc3339());
        Ok(collected_until)
    }
}
