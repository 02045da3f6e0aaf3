//! Persistent cache of relevance judgments
//!
//! Entries are keyed by the md5 of `title:market_id` and never expire: a
//! judgment stays valid for as long as the file exists. Entries this build
//! cannot read are carried through `save` untouched.

use crate::error::Result;
use crate::storage;
use crate::types::RelevanceJudgment;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Stable cache key for a (news title, market id) pair
pub fn cache_key(news_title: &str, market_id: &str) -> String {
    hex::encode(Md5::digest(format!("{}:{}", news_title, market_id).as_bytes()))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    cache: HashMap<String, Value>,
}

/// Judgment store bound to one pipeline run: load, use, save
#[derive(Debug, Default)]
pub struct AnalysisCache {
    path: Option<PathBuf>,
    entries: HashMap<String, RelevanceJudgment>,
    unreadable: HashMap<String, Value>,
    dirty: bool,
}

impl AnalysisCache {
    /// Cache that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache file; a missing or unreadable file starts an empty cache
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let raw = match storage::load_json_opt::<CacheFile>(&path).await {
            Ok(Some(file)) => file.cache,
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!("Ignoring unreadable analysis cache {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        let mut entries = HashMap::with_capacity(raw.len());
        let mut unreadable = HashMap::new();
        for (key, value) in raw {
            match serde_json::from_value::<RelevanceJudgment>(value.clone()) {
                Ok(judgment) => {
                    entries.insert(key, judgment);
                }
                Err(e) => {
                    warn!("Skipping cache entry {}: {}", key, e);
                    unreadable.insert(key, value);
                }
            }
        }
        info!("Loaded {} cached judgments", entries.len());

        Self {
            path: Some(path),
            entries,
            unreadable,
            dirty: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&RelevanceJudgment> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, judgment: RelevanceJudgment) {
        self.entries.insert(key, judgment);
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the cache back if anything was added
    pub async fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let mut cache = self.unreadable.clone();
        for (key, judgment) in &self.entries {
            cache.insert(key.clone(), serde_json::to_value(judgment)?);
        }
        let file = CacheFile { cache };
        storage::save_json(path, &file).await?;
        self.dirty = false;
        info!("Saved {} cached judgments to {}", file.cache.len(), path.display());
        Ok(())
    }
}
