//! The clinical document carried by a submission.

use crate::constants::DOCUMENT_MIME_TYPE;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use xds_types::Sha256Hash;

/// A document ready for submission.
///
/// Content is immutable once constructed. Hash and size are derived from it exactly once,
/// either by the producer via [`Document::with_integrity`] or lazily by
/// [`Document::ensure_integrity`] when the document is attached to a build.
#[derive(Clone, Debug)]
pub struct Document {
    id: String,
    patient_id: String,
    content: Bytes,
    mime_type: String,
    hash: Option<Sha256Hash>,
    size: Option<u64>,
    created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            content: content.into(),
            mime_type: DOCUMENT_MIME_TYPE.to_owned(),
            hash: None,
            size: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Attaches a hash and size computed elsewhere (for example while the content was
    /// streamed to disk). They are trusted as-is.
    pub fn with_integrity(mut self, hash: Sha256Hash, size: u64) -> Self {
        self.hash = Some(hash);
        self.size = Some(size);
        self
    }

    /// Computes hash and size from the content if they are not already known.
    pub fn ensure_integrity(&mut self) {
        if self.hash.is_none() {
            self.hash = Some(Sha256Hash::of(&self.content));
        }
        if self.size.is_none() {
            self.size = Some(self.content.len() as u64);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn hash(&self) -> Option<&Sha256Hash> {
        self.hash.as_ref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
