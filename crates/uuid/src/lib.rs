//! Identifier generation for registry metadata and MTOM packages.
//!
//! Three kinds of identifiers leave this crate:
//!
//! - [`UuidService`]: `urn:uuid:` tokens used for registry object ids, message ids and the
//!   random-unique identifier scheme. Backed by UUID v4, which draws from the OS random
//!   source and is safe to call from any thread or process.
//! - [`OidSuffix`]: the distinguishing suffix appended to a configured root OID for the
//!   hierarchical identifier scheme. Never repeats within one process lifetime.
//! - [`ContentId`]: MIME `Content-ID` values referenced from `cid:` URIs.
//!
//! ## Canonical URN form
//! `urn:uuid:` followed by the lower-case hyphenated UUID, e.g.
//! `urn:uuid:550e8400-e29b-41d4-a716-446655440000`.

mod service;

pub use service::{ContentId, OidSuffix, Uuid, UuidService, URN_UUID_PREFIX};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
