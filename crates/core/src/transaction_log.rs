//! Per-request transaction records.
//!
//! Logging is best effort: a failed write is reported through `tracing` and never reaches
//! the transaction being logged.

use crate::XdsResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line of the transaction log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: DateTime<Utc>,
    /// Generated per request; also names persisted documents.
    pub correlation_id: String,
    pub request_message_id: Option<String>,
    pub submission_set_id: Option<String>,
    pub document_ids: Vec<String>,
    pub patient_id: Option<String>,
    pub http_status: u16,
    pub fault_reason: Option<String>,
}

impl TransactionRecord {
    pub fn received(correlation_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            correlation_id: correlation_id.into(),
            request_message_id: None,
            submission_set_id: None,
            document_ids: Vec::new(),
            patient_id: None,
            http_status: 0,
            fault_reason: None,
        }
    }
}

/// Sink for transaction records.
pub trait TransactionLog: Send + Sync {
    /// Records one transaction. Implementations must not panic or block for long.
    fn record(&self, record: &TransactionRecord);
}

/// Emits each record as a `tracing` event. Used when no log directory is configured.
#[derive(Clone, Debug, Default)]
pub struct TracingTransactionLog;

impl TransactionLog for TracingTransactionLog {
    fn record(&self, record: &TransactionRecord) {
        tracing::info!(
            correlation_id = %record.correlation_id,
            message_id = record.request_message_id.as_deref().unwrap_or("-"),
            submission_set_id = record.submission_set_id.as_deref().unwrap_or("-"),
            documents = record.document_ids.len(),
            status = record.http_status,
            fault = record.fault_reason.as_deref().unwrap_or("-"),
            "transaction"
        );
    }
}

/// Appends JSON lines to `transactions-YYYYMMDD.log` under a directory.
#[derive(Debug)]
pub struct FileTransactionLog {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTransactionLog {
    /// Creates the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> XdsResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("transactions-{}.log", date.format("%Y%m%d")))
    }

    /// Appends `record` to the file for its timestamp's UTC date.
    pub fn append(&self, record: &TransactionRecord) -> XdsResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(record.timestamp.date_naive()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl TransactionLog for FileTransactionLog {
    fn record(&self, record: &TransactionRecord) {
        if let Err(e) = self.append(record) {
            tracing::warn!(
                correlation_id = %record.correlation_id,
                error = %e,
                "failed to write transaction log"
            );
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryTransactionLog {
    records: Mutex<Vec<TransactionRecord>>,
}

impl MemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TransactionLog for MemoryTransactionLog {
    fn record(&self, record: &TransactionRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
    }
}
