//! JSON-lines transaction log
//!
//! Records are only ever appended. Each line is a complete
//! [`PersistedRecord`] so a torn final line loses at most one record.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::{PersistedRecord, TransactionRecord};
use crate::ports::{StoreError, TransactionStore};

pub const DEFAULT_STORE_FILE: &str = "transactions.jsonl";

pub struct JsonlTransactionStore {
    path: PathBuf,
    /// When set, records for any other assignment are refused
    known_assignments: Option<HashSet<String>>,
    write_lock: Mutex<()>,
}

impl JsonlTransactionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            known_assignments: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_known_assignments<I, S>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_assignments = Some(assignments.into_iter().map(Into::into).collect());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in file order
    pub async fn load_all(&self) -> Result<Vec<PersistedRecord>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::ReadError(e.to_string())),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .map_err(|e| StoreError::ReadError(format!("line {}: {}", i + 1, e)))
            })
            .collect()
    }

    async fn append_line(&self, line: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::WriteError(format!("{}: {}", parent.display(), e)))?;
        }

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::WriteError(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::WriteError(e.to_string()))?;
        file.flush().await.map_err(|e| StoreError::WriteError(e.to_string()))
    }
}

#[async_trait]
impl TransactionStore for JsonlTransactionStore {
    async fn create_record(&self, record: TransactionRecord) -> Result<PersistedRecord, StoreError> {
        if let Some(known) = &self.known_assignments {
            if !known.contains(&record.strategy_assignment_id) {
                return Err(StoreError::UnknownAssignment(record.strategy_assignment_id));
            }
        }

        let persisted = PersistedRecord {
            id: uuid::Uuid::new_v4(),
            record,
        };
        let mut line = serde_json::to_string(&persisted)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        line.push('\n');

        self.append_line(&line).await?;
        tracing::debug!("Appended record {} to {}", persisted.id, self.path.display());
        Ok(persisted)
    }
}
