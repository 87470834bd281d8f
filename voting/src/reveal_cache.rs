//! Local cache of `(score, nonce)` between commit and reveal.
//!
//! Lets the client that committed auto-fill its own reveal. The cache is a
//! convenience only: losing it forces manual re-entry of score and nonce, and a
//! reviewer who also lost the nonce can no longer reveal. Nothing here is
//! authoritative and a damaged cache file is treated as empty.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use vetted_crypto::Nonce;
use vetted_types::{ApplicationId, ExpertId, Score, Timestamp};

/// File name used inside the cache directory.
pub const CACHE_FILE_NAME: &str = "reveal-cache.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write reveal cache {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("failed to serialize reveal cache: {0}")]
    Serialization(String),
}

/// What a reviewer needs to reveal a committed vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedVote {
    pub score: Score,
    pub nonce: Nonce,
    pub committed_at: Timestamp,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    application_id: ApplicationId,
    expert_id: ExpertId,
    #[serde(flatten)]
    vote: CachedVote,
}

#[derive(Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    entries: Vec<CacheEntry>,
}

/// Per-`(application, expert)` cache, optionally persisted as JSON.
#[derive(Debug, Default)]
pub struct RevealCache {
    path: Option<PathBuf>,
    entries: HashMap<(ApplicationId, ExpertId), CachedVote>,
}

impl RevealCache {
    /// A cache that lives only as long as this process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the cache stored in `dir`. A missing file yields an empty cache; an
    /// unreadable or corrupt one is logged and also yields an empty cache.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(CACHE_FILE_NAME);
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<CacheFile>(&json) {
                Ok(file) => file
                    .entries
                    .into_iter()
                    .map(|e| ((e.application_id, e.expert_id), e.vote))
                    .collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "reveal cache is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reveal cache unreadable, starting empty");
                HashMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store the values used for a commitment, replacing any earlier entry.
    pub fn remember(
        &mut self,
        application: ApplicationId,
        expert: ExpertId,
        vote: CachedVote,
    ) -> Result<(), CacheError> {
        self.entries.insert((application, expert), vote);
        self.persist()
    }

    pub fn recall(&self, application: &ApplicationId, expert: &ExpertId) -> Option<&CachedVote> {
        self.entries.get(&(application.clone(), expert.clone()))
    }

    /// Drop the entry after a successful reveal. Returns whether one existed.
    pub fn forget(&mut self, application: &ApplicationId, expert: &ExpertId) -> Result<bool, CacheError> {
        let removed = self
            .entries
            .remove(&(application.clone(), expert.clone()))
            .is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = CacheFile {
            version: 1,
            entries: self
                .entries
                .iter()
                .map(|((application_id, expert_id), vote)| CacheEntry {
                    application_id: application_id.clone(),
                    expert_id: expert_id.clone(),
                    vote: vote.clone(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let write_err = |e: std::io::Error| CacheError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(app: &str, expert: &str) -> (ApplicationId, ExpertId) {
        (ApplicationId::new(app).unwrap(), ExpertId::new(expert).unwrap())
    }

    fn vote(score: i64, nonce: &str) -> CachedVote {
        CachedVote {
            score: Score::new(score).unwrap(),
            nonce: Nonce::new(nonce),
            committed_at: Timestamp::new(42),
        }
    }

    #[test]
    fn in_memory_remember_recall_forget() {
        let mut cache = RevealCache::in_memory();
        let (a, e) = key("app", "alice");
        cache.remember(a.clone(), e.clone(), vote(80, "n")).unwrap();
        assert_eq!(cache.recall(&a, &e), Some(&vote(80, "n")));
        assert!(cache.forget(&a, &e).unwrap());
        assert!(!cache.forget(&a, &e).unwrap());
        assert!(cache.is_empty());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (a, e) = key("app", "alice");
        {
            let mut cache = RevealCache::open(dir.path());
            cache.remember(a.clone(), e.clone(), vote(55, "secret")).unwrap();
        }
        let reopened = RevealCache::open(dir.path());
        assert_eq!(reopened.recall(&a, &e), Some(&vote(55, "secret")));
    }

    #[test]
    fn forget_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let (a, e) = key("app", "alice");
        let mut cache = RevealCache::open(dir.path());
        cache.remember(a.clone(), e.clone(), vote(1, "x")).unwrap();
        cache.forget(&a, &e).unwrap();
        assert!(RevealCache::open(dir.path()).is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CACHE_FILE_NAME), "{not json").unwrap();
        let mut cache = RevealCache::open(dir.path());
        assert!(cache.is_empty());

        // Still usable; the next write replaces the corrupt file.
        let (a, e) = key("app", "bob");
        cache.remember(a.clone(), e.clone(), vote(3, "y")).unwrap();
        assert_eq!(RevealCache::open(dir.path()).len(), 1);
    }

    #[test]
    fn missing_directory_is_created_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut cache = RevealCache::open(&nested);
        let (a, e) = key("app", "carol");
        cache.remember(a, e, vote(9, "z")).unwrap();
        assert!(nested.join(CACHE_FILE_NAME).exists());
    }
}
