use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::{PersistedRecord, TransactionRecord};
use crate::ports::{StoreError, TransactionStore};

/// Keeps records in process memory
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    records: Mutex<Vec<PersistedRecord>>,
    fail_writes: Mutex<Option<String>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every subsequent write with `WriteError(reason)`
    pub fn fail_writes(&self, reason: impl Into<String>) {
        if let Ok(mut slot) = self.fail_writes.lock() {
            *slot = Some(reason.into());
        }
    }

    pub fn records(&self) -> Vec<PersistedRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create_record(&self, record: TransactionRecord) -> Result<PersistedRecord, StoreError> {
        if let Some(reason) = self
            .fail_writes
            .lock()
            .map_err(|e| StoreError::WriteError(e.to_string()))?
            .clone()
        {
            return Err(StoreError::WriteError(reason));
        }

        let persisted = PersistedRecord {
            id: uuid::Uuid::new_v4(),
            record,
        };
        self.records
            .lock()
            .map_err(|e| StoreError::WriteError(e.to_string()))?
            .push(persisted.clone());
        Ok(persisted)
    }
}
