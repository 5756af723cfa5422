//! Durable local mirror of the remote course catalog.
//!
//! The snapshot lives in two JSON files inside the cache directory:
//! `catalog.json` (courses plus the remote update marker they were fetched
//! with) and `catalog_check.json` (when the remote marker was last queried).
//! Both are replaced with write-then-rename, so a reader only ever sees a
//! complete previous or complete new file.

use super::client::CatalogSource;
use super::error::CatalogError;
use super::types::{CacheStats, CatalogSnapshot, Course};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CATALOG_FILE: &str = "catalog.json";
const CHECK_FILE: &str = "catalog_check.json";

/// Default time between two remote freshness checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(3 * 60 * 60);

#[derive(Deserialize)]
struct StoredCatalog {
    courses: Vec<Course>,
    last_remote_update: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct StoredCatalogRef<'a> {
    courses: &'a [Course],
    last_remote_update: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct CheckMarker {
    last_checked_at: DateTime<Utc>,
}

/// Outcome of a freshness check.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Freshness {
    /// The cached catalog may be served as is
    Fresh,
    /// A full fetch is needed. Carries the remote marker if one was read.
    Stale { remote_update: Option<DateTime<Utc>> },
}

/// Local catalog cache in front of a [`CatalogSource`].
pub struct CatalogCache<S> {
    dir: PathBuf,
    source: S,
    check_interval: TimeDelta,
}

impl<S: CatalogSource> CatalogCache<S> {
    /// Creates a cache in `dir` with the default 3 hour check interval.
    pub fn new(dir: impl Into<PathBuf>, source: S) -> Self {
        Self::with_check_interval(dir, source, DEFAULT_CHECK_INTERVAL)
    }

    /// Creates a cache with a custom check interval.
    pub fn with_check_interval(dir: impl Into<PathBuf>, source: S, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            source,
            check_interval: TimeDelta::from_std(interval).unwrap_or_else(|_| TimeDelta::MAX),
        }
    }

    /// Returns the underlying catalog source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn check_path(&self) -> PathBuf {
        self.dir.join(CHECK_FILE)
    }

    /// Returns the last persisted snapshot.
    ///
    /// Missing, unreadable or corrupt files yield an empty snapshot.
    pub fn load(&self) -> CatalogSnapshot {
        let stored = read_json::<StoredCatalog>(&self.catalog_path()).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable catalog cache");
            None
        });
        let marker = read_json::<CheckMarker>(&self.check_path()).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable catalog check marker");
            None
        });

        let (courses, last_remote_update) = match stored {
            Some(s) => (s.courses, s.last_remote_update),
            None => (Vec::new(), None),
        };

        CatalogSnapshot {
            courses,
            last_remote_update,
            last_checked_at: marker.map(|m| m.last_checked_at),
        }
    }

    /// Persists a snapshot, replacing the previous one atomically.
    pub fn store(&self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        let catalog = serde_json::to_vec(&StoredCatalogRef {
            courses: &snapshot.courses,
            last_remote_update: snapshot.last_remote_update,
        })?;
        write_atomic(&self.catalog_path(), &catalog)?;

        if let Some(checked_at) = snapshot.last_checked_at {
            self.record_check(checked_at)?;
        }

        debug!(courses = snapshot.len(), "Stored catalog snapshot");
        Ok(())
    }

    fn record_check(&self, checked_at: DateTime<Utc>) -> Result<(), CatalogError> {
        let marker = serde_json::to_vec(&CheckMarker {
            last_checked_at: checked_at,
        })?;
        write_atomic(&self.check_path(), &marker)
    }

    /// Decides whether the catalog has to be fetched again.
    ///
    /// Within the check interval of the previous check this never contacts
    /// the remote source.
    pub async fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        let snapshot = self.load();
        matches!(
            self.check_freshness(now, &snapshot).await,
            Freshness::Stale { .. }
        )
    }

    async fn check_freshness(&self, now: DateTime<Utc>, snapshot: &CatalogSnapshot) -> Freshness {
        if let Some(last_checked) = snapshot.last_checked_at {
            let elapsed = now.signed_duration_since(last_checked);
            // A negative elapsed time means the clock moved backwards; check again.
            if elapsed >= TimeDelta::zero() && elapsed < self.check_interval {
                debug!(
                    elapsed_secs = elapsed.num_seconds(),
                    "Catalog checked recently, skipping remote check"
                );
                return Freshness::Fresh;
            }
        }

        let remote = self.source.fetch_last_updated().await;

        // Bound the check frequency whatever the outcome was.
        if let Err(e) = self.record_check(now) {
            warn!(error = %e, "Failed to record catalog check time");
        }

        match remote {
            Ok(Some(remote_update)) => match snapshot.last_remote_update {
                Some(local) if remote_update <= local => Freshness::Fresh,
                _ => {
                    info!(
                        remote_update = %remote_update,
                        "Remote catalog changed since last fetch"
                    );
                    Freshness::Stale {
                        remote_update: Some(remote_update),
                    }
                }
            },
            Ok(None) => {
                warn!("Remote catalog has no last-update marker, assuming stale");
                Freshness::Stale {
                    remote_update: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not reach catalog source, assuming stale");
                Freshness::Stale {
                    remote_update: None,
                }
            }
        }
    }

    /// Returns the catalog, fetching it from the source when needed.
    ///
    /// Falls back to the cached courses if the fetch fails. The snapshot is
    /// written only once the complete catalog has been received, so dropping
    /// this future midway leaves the cache untouched.
    pub async fn get_catalog(&self, force_refresh: bool) -> Vec<Course> {
        let correlation_id = generate_correlation_id();
        let now = Utc::now();
        let snapshot = self.load();

        let remote_update = if force_refresh || snapshot.is_empty() {
            info!(
                correlation_id = %correlation_id,
                force_refresh,
                cached = snapshot.len(),
                "Fetching catalog from source"
            );
            match self.source.fetch_last_updated().await {
                Ok(marker) => marker,
                Err(e) => {
                    warn!(correlation_id = %correlation_id, error = %e, "Failed to read catalog marker");
                    None
                }
            }
        } else {
            match self.check_freshness(now, &snapshot).await {
                Freshness::Fresh => {
                    debug!(
                        correlation_id = %correlation_id,
                        courses = snapshot.len(),
                        "Returning cached catalog"
                    );
                    return snapshot.courses;
                }
                Freshness::Stale { remote_update } => remote_update,
            }
        };

        let start = Instant::now();
        match self.source.fetch_catalog().await {
            Ok(courses) if !courses.is_empty() => {
                let fresh = CatalogSnapshot {
                    courses,
                    last_remote_update: remote_update.or(snapshot.last_remote_update),
                    last_checked_at: Some(now),
                };
                if let Err(e) = self.store(&fresh) {
                    warn!(correlation_id = %correlation_id, error = %e, "Failed to persist catalog");
                }
                info!(
                    correlation_id = %correlation_id,
                    courses = fresh.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Catalog refreshed"
                );
                fresh.courses
            }
            Ok(_) => {
                warn!(
                    correlation_id = %correlation_id,
                    "Source returned an empty catalog, keeping cached courses"
                );
                snapshot.courses
            }
            Err(e) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    cached = snapshot.len(),
                    "Catalog fetch failed, serving cached courses"
                );
                snapshot.courses
            }
        }
    }

    /// Maps groups of course ids (e.g. one group per semester) to cached courses.
    ///
    /// Ids missing from the cache are dropped.
    pub fn resolve_groups(&self, ids: &[Vec<String>]) -> Vec<Vec<Course>> {
        resolve_groups_in(&self.load().courses, ids)
    }

    /// Like [`Self::resolve_groups`], but goes through [`Self::get_catalog`] if
    /// any id could not be resolved from the cache.
    ///
    /// The refetch obeys the check interval, so ids the remote does not know
    /// either do not trigger a download on every call.
    pub async fn resolve_groups_or_fetch(&self, ids: &[Vec<String>]) -> Vec<Vec<Course>> {
        let cached = self.resolve_groups(ids);
        if resolved_count(&cached) == requested_count(ids) {
            debug!("Resolved all course groups from cache");
            return cached;
        }

        let courses = self.get_catalog(false).await;
        resolve_groups_in(&courses, ids)
    }

    /// Size of the catalog file in bytes, if it exists.
    pub fn cache_size(&self) -> Option<u64> {
        fs::metadata(self.catalog_path()).ok().map(|m| m.len())
    }

    /// Gets cache statistics.
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.load();
        CacheStats {
            courses: snapshot.len(),
            last_remote_update: snapshot.last_remote_update,
            last_checked_at: snapshot.last_checked_at,
            size: self
                .cache_size()
                .map(format_bytes)
                .unwrap_or_else(|| "File does not exist".to_string()),
        }
    }
}

/// Maps groups of ids to courses from `courses`, dropping unknown ids.
pub fn resolve_groups_in(courses: &[Course], ids: &[Vec<String>]) -> Vec<Vec<Course>> {
    let by_id: HashMap<&str, &Course> = courses.iter().map(|c| (c.id.as_str(), c)).collect();
    ids.iter()
        .map(|group| {
            group
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).map(|&c| c.clone()))
                .collect()
        })
        .collect()
}

fn resolved_count(groups: &[Vec<Course>]) -> usize {
    groups.iter().map(Vec::len).sum()
}

fn requested_count(ids: &[Vec<String>]) -> usize {
    ids.iter().map(Vec::len).sum()
}

/// Human readable file size, e.g. "512 Bytes", "1.50 KB", "2.00 MB".
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} Bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Reads and decodes a JSON file. A missing file is `Ok(None)`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CatalogError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Writes `bytes` to a unique temp file next to `path`, syncs it, then renames
/// it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CatalogError> {
    let parent = path.parent().ok_or_else(|| CatalogError::Io {
        message: format!("{} has no parent directory", path.display()),
    })?;
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("catalog");
    let nonce: u32 = rand::thread_rng().gen();
    let tmp = parent.join(format!(".{}.tmp.{}.{:08x}", file_name, std::process::id(), nonce));

    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

fn generate_correlation_id() -> String {
    let timestamp = Utc::now().timestamp_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
