//! Transaction store port
//!
//! Append-only persistence for [`TransactionRecord`]s. Records reference a
//! strategy assignment that must already exist in the backing store.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{PersistedRecord, TransactionRecord};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Failed to serialize record: {0}")]
    SerializationError(String),
    #[error("Failed to write record: {0}")]
    WriteError(String),
    #[error("Failed to read records: {0}")]
    ReadError(String),
    #[error("Unknown strategy assignment: {0}")]
    UnknownAssignment(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create_record(&self, record: TransactionRecord) -> Result<PersistedRecord, StoreError>;
}

#[async_trait]
impl<T: TransactionStore + ?Sized> TransactionStore for Arc<T> {
    async fn create_record(&self, record: TransactionRecord) -> Result<PersistedRecord, StoreError> {
        (**self).create_record(record).await
    }
}
