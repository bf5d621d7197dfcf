//! XDS Document Store
//!
//! Persistence for documents received by the mock registry.
//!
//! ## Design Principles
//!
//! - Documents are content-addressed by SHA-256; the hash is the only identifier on disk
//! - Stored bytes are immutable; storing identical content again is a no-op
//! - Each document has a YAML sidecar naming the transaction that first delivered it
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── documents/
//!     └── sha256/
//!         └── ab/
//!             └── cd/
//!                 ├── abcd3f9e…
//!                 └── abcd3f9e….yaml
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use xds_files::DocumentStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DocumentStore::new(Path::new("received"))?;
//! let stored = store.store("urn:uuid:0b6f…", Some("text/xml"), b"<ClinicalDocument/>")?;
//! assert_eq!(store.read(stored.hash.as_str())?, b"<ClinicalDocument/>");
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::{DocumentStore, StoredDocument, DOCUMENTS_FOLDER_NAME};

/// Errors that can occur during document storage
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root path exists but is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// No document is stored under the hash
    #[error("Document not found for hash: {0}")]
    NotFound(String),

    /// Malformed hash or empty correlation id
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] xds_types::TextError),

    /// Sidecar could not be written or read
    #[error("Sidecar error: {0}")]
    Sidecar(#[from] serde_yaml::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
