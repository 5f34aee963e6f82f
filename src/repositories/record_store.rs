//! Poll records on disk: one pretty-printed JSON file per snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::error::AppResult;
use crate::models::poll::{EndTime, PollOption, PollSnapshot};

/// What gets stored for each poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollRecord {
    pub title: String,
    pub ends: EndTime,
    pub options: Vec<PollOption>,
    pub received_at: DateTime<Utc>,
}

impl PollRecord {
    pub fn from_snapshot(snapshot: &PollSnapshot) -> Self {
        Self {
            title: snapshot.title.clone(),
            ends: snapshot.ends.clone(),
            options: snapshot.options.clone(),
            received_at: Utc::now(),
        }
    }
}

/// Storage for poll records, keyed by a readable name.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn persist(&self, name: &str, record: &PollRecord) -> AppResult<()>;
}

/// Writes `<dir>/<name>.json`, creating the directory on demand.
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    dir: PathBuf,
}

impl FsRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    async fn persist(&self, name: &str, record: &PollRecord) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(name);
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), "poll record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poll::Label;

    #[tokio::test]
    async fn writes_named_json_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordStore::new(dir.path().join("polls"));
        let snapshot = PollSnapshot::new(
            "Lunch",
            EndTime::Unix(60),
            vec![PollOption::new(Label::from_code(65).unwrap(), "Soup")],
        );
        let name = snapshot.record_name();
        store
            .persist(&name, &PollRecord::from_snapshot(&snapshot))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path_for(&name)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["title"], "Lunch");
        assert_eq!(json["ends"], 60);
        assert_eq!(json["options"][0]["label"], 65);
        assert_eq!(json["options"][0]["text"], "Soup");
        assert!(name.starts_with("lunch_1970-01-01"));
    }

    #[tokio::test]
    async fn unwritable_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let store = FsRecordStore::new(blocker.join("sub"));
        let snapshot = PollSnapshot::new("x", EndTime::Unix(0), vec![]);
        assert!(store
            .persist("x", &PollRecord::from_snapshot(&snapshot))
            .await
            .is_err());
    }
}
