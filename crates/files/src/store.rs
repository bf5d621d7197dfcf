//! Content-addressed document storage.
//!
//! Files are stored using their SHA-256 hash as the identifier, which gives:
//!
//! - **Deduplication**: the same document delivered twice is stored once
//! - **Integrity**: stored content can be verified against its name
//! - **Immutability**: content never changes under an existing name
//!
//! Writes go to a uniquely named temporary file that is renamed into place, so concurrent
//! stores of the same content never expose a partial file.

use crate::FilesError;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use xds_types::{NonEmptyText, Sha256Hash};
use xds_uuid::UuidService;

/// Top-level folder under the store root.
pub const DOCUMENTS_FOLDER_NAME: &str = "documents";

const SIDECAR_EXTENSION: &str = "yaml";

/// Sidecar record for a stored document.
///
/// Serialised to YAML next to the document bytes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredDocument {
    /// Hashing algorithm used (always "sha256")
    pub hash_algorithm: String,

    /// Hexadecimal digest of the content
    pub hash: Sha256Hash,

    /// Path relative to the store root
    pub relative_path: String,

    pub size_bytes: u64,

    /// MIME type declared by the sender's MIME part
    pub declared_media_type: Option<String>,

    /// Media type sniffed from the bytes. Best effort only; XML is usually not detected.
    pub detected_media_type: Option<String>,

    /// Transaction that first delivered this content
    pub correlation_id: NonEmptyText,

    pub stored_at: DateTime<Utc>,
}

/// Store for received documents rooted at one directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Opens a store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// - `FilesError::InvalidRootDirectory` if `root` exists but is not a directory
    /// - `FilesError::Io` if it cannot be created
    pub fn new(root: &Path) -> Result<Self, FilesError> {
        if root.exists() && !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores `bytes` on behalf of transaction `correlation_id`.
    ///
    /// When the content is already present the existing record is returned unchanged and
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the correlation id is blank or any write fails.
    pub fn store(
        &self,
        correlation_id: &str,
        declared_media_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredDocument, FilesError> {
        let correlation_id = NonEmptyText::new(correlation_id)?;
        let hash = Sha256Hash::of(bytes);
        let storage_path = self.storage_path(&hash);
        let sidecar_path = sidecar_path(&storage_path);

        if storage_path.is_file() && sidecar_path.is_file() {
            return self.metadata(hash.as_str());
        }

        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = StoredDocument {
            hash_algorithm: "sha256".into(),
            relative_path: relative_path(&hash),
            size_bytes: bytes.len() as u64,
            declared_media_type: declared_media_type
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned),
            detected_media_type: infer::get(bytes).map(|kind| kind.mime_type().to_owned()),
            correlation_id,
            stored_at: Utc::now(),
            hash,
        };

        write_atomically(&storage_path, bytes)?;
        write_atomically(&sidecar_path, serde_yaml::to_string(&record)?.as_bytes())?;

        Ok(record)
    }

    /// Reads stored bytes by hash.
    pub fn read(&self, hash: &str) -> Result<Vec<u8>, FilesError> {
        let hash = Sha256Hash::parse(hash)?;
        match fs::read(self.storage_path(&hash)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FilesError::NotFound(hash.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the sidecar record by hash.
    pub fn metadata(&self, hash: &str) -> Result<StoredDocument, FilesError> {
        let hash = Sha256Hash::parse(hash)?;
        let path = sidecar_path(&self.storage_path(&hash));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FilesError::NotFound(hash.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_yaml::from_str(&text)?)
    }

    /// `<root>/documents/sha256/<ab>/<cd>/<hash>`
    fn storage_path(&self, hash: &Sha256Hash) -> PathBuf {
        self.root.join(relative_path(hash))
    }
}

fn relative_path(hash: &Sha256Hash) -> String {
    let hex = hash.as_str();
    format!(
        "{}/sha256/{}/{}/{}",
        DOCUMENTS_FOLDER_NAME,
        &hex[0..2],
        &hex[2..4],
        hex
    )
}

fn sidecar_path(storage_path: &Path) -> PathBuf {
    let mut name = storage_path.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), FilesError> {
    let tmp = path.with_extension(format!("tmp-{}", UuidService::new().uuid().simple()));
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_writes_sharded_file_and_sidecar() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(&temp.path().join("store")).unwrap();

        let stored = store
            .store("urn:uuid:tx-1", Some("text/xml"), b"<ClinicalDocument/>")
            .unwrap();

        let hex = stored.hash.as_str();
        let expected = temp
            .path()
            .join("store/documents/sha256")
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(hex);
        assert!(expected.is_file());
        assert!(sidecar_path(&expected).is_file());
        assert_eq!(stored.size_bytes, 19);
        assert_eq!(stored.declared_media_type.as_deref(), Some("text/xml"));
        assert_eq!(stored.correlation_id.as_str(), "urn:uuid:tx-1");
        assert_eq!(store.read(hex).unwrap(), b"<ClinicalDocument/>");
        assert_eq!(store.metadata(hex).unwrap(), stored);
    }

    #[test]
    fn test_restoring_identical_content_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path()).unwrap();

        let first = store.store("tx-1", None, b"same").unwrap();
        let second = store.store("tx-2", Some("text/plain"), b"same").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.correlation_id.as_str(), "tx-1");
    }

    #[test]
    fn test_empty_document_is_stored() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path()).unwrap();
        let stored = store.store("tx", None, b"").unwrap();
        assert_eq!(
            stored.hash.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(store.read(stored.hash.as_str()).unwrap().is_empty());
    }

    #[test]
    fn test_detects_binary_media_type() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path()).unwrap();
        let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";
        let stored = store.store("tx", None, pdf).unwrap();
        assert_eq!(stored.detected_media_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_blank_correlation_id_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path()).unwrap();
        assert!(matches!(
            store.store("  ", None, b"x"),
            Err(FilesError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_read_unknown_and_malformed_hash() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path()).unwrap();
        let unknown = "a".repeat(64);
        assert!(matches!(store.read(&unknown), Err(FilesError::NotFound(_))));
        assert!(matches!(store.read("xyz"), Err(FilesError::InvalidInput(_))));
        assert!(matches!(store.metadata(&unknown), Err(FilesError::NotFound(_))));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            DocumentStore::new(&file),
            Err(FilesError::InvalidRootDirectory(_))
        ));
    }
}
