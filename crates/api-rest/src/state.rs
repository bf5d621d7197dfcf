use std::sync::Arc;
use tokio::runtime::Handle;
use xds_core::{
    FileTransactionLog, MockServerConfig, RegistryRequestHandler, TracingTransactionLog,
    TransactionLog, TransactionRecord,
};
use xds_files::DocumentStore;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    handler: Arc<RegistryRequestHandler>,
    store: Option<Arc<DocumentStore>>,
}

impl AppState {
    /// Builds the handler, transaction log and optional document store from `config`.
    ///
    /// Must be called inside a tokio runtime when a transaction log directory is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the log or store directory cannot be created.
    pub fn from_config(config: &MockServerConfig) -> anyhow::Result<Self> {
        let log: Arc<dyn TransactionLog> = match config.transaction_log_dir() {
            Some(dir) => {
                let file_log = FileTransactionLog::new(dir)?;
                tracing::info!("-- Transaction log directory: {}", file_log.dir().display());
                Arc::new(BackgroundTransactionLog::new(Arc::new(file_log)))
            }
            None => Arc::new(TracingTransactionLog),
        };

        let store = match config.document_store_dir() {
            Some(dir) => {
                tracing::info!("-- Document store directory: {}", dir.display());
                Some(DocumentStore::new(dir)?)
            }
            None => None,
        };

        Ok(Self::new(
            RegistryRequestHandler::new(config.validation_mode(), log),
            store,
        ))
    }

    pub fn new(handler: RegistryRequestHandler, store: Option<DocumentStore>) -> Self {
        Self {
            handler: Arc::new(handler),
            store: store.map(Arc::new),
        }
    }

    pub fn handler(&self) -> &Arc<RegistryRequestHandler> {
        &self.handler
    }

    pub fn store(&self) -> Option<&Arc<DocumentStore>> {
        self.store.as_ref()
    }
}

/// Runs another log's writes on tokio's blocking pool without waiting for them.
///
/// Outside a runtime the write happens inline.
pub struct BackgroundTransactionLog {
    inner: Arc<dyn TransactionLog>,
    runtime: Option<Handle>,
}

impl BackgroundTransactionLog {
    pub fn new(inner: Arc<dyn TransactionLog>) -> Self {
        Self {
            inner,
            runtime: Handle::try_current().ok(),
        }
    }
}

impl TransactionLog for BackgroundTransactionLog {
    fn record(&self, record: &TransactionRecord) {
        match &self.runtime {
            Some(runtime) => {
                let inner = Arc::clone(&self.inner);
                let record = record.clone();
                runtime.spawn_blocking(move || inner.record(&record));
            }
            None => self.inner.record(record),
        }
    }
}
