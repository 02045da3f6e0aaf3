//! JSON file persistence for snapshots, the analysis cache and the dashboard payload

use crate::error::Result;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// On-disk shape of the market snapshots (raw events or scored markets)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot<T> {
    pub markets: Vec<T>,
    pub timestamp: String,
    pub count: usize,
}

impl<T> MarketSnapshot<T> {
    pub fn new(markets: Vec<T>) -> Self {
        Self {
            count: markets.len(),
            markets,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Write `value` as pretty JSON, replacing the file only once the write completed
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let body = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    tokio::fs::write(&tmp, &body).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!("Saved {} bytes to {}", body.len(), path.display());
    Ok(())
}

pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`load_json`], but a missing file is `None`
pub async fn load_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_save_creates_parent_dirs_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/data.json");
        let mut value = HashMap::new();
        value.insert("count".to_string(), 3);

        save_json(&path, &value).await.unwrap();
        let loaded: HashMap<String, i32> = load_json(&path).await.unwrap();
        assert_eq!(loaded, value);
        assert!(!dir.path().join("nested/deeper/data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_opt_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Vec<i32>> = load_json_opt(&dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_market_snapshot_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        save_json(&path, &MarketSnapshot::new(vec!["a", "b"])).await.unwrap();
        let raw: serde_json::Value = load_json(&path).await.unwrap();
        assert_eq!(raw["count"], 2);
        assert_eq!(raw["markets"][1], "b");
        assert!(raw["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_load_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_json::<Vec<i32>>(&path).await.is_err());
    }
}
