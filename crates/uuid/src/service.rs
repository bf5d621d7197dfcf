//! Internal implementation of the identifier services.

use crate::{UuidError, UuidResult};
use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{fmt, str::FromStr};
use xds_types::Oid;

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Fixed marker prefixed to every random-unique identifier.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";

/// Domain suffix appended to generated content ids.
const CONTENT_ID_DOMAIN: &str = "xds.harness";

/// Process-wide sequence for hierarchical suffixes.
static OID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// A `urn:uuid:` identifier in canonical (lower-case, hyphenated) form.
///
/// # Construction
/// - [`UuidService::new`] generates a fresh random identifier.
/// - [`UuidService::parse`] validates an externally supplied URN.
///
/// # Display format
/// Always `urn:uuid:xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UuidService(Uuid);

impl Default for UuidService {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidService {
    /// Generates a new random identifier (UUID v4).
    ///
    /// Used for registry object ids, WS-Addressing message ids and the random-unique
    /// identifier scheme. Draws from the OS random source, so concurrent callers in any
    /// thread or process never collide in practice.
    ///
    /// # Returns
    ///
    /// Returns a fresh identifier that displays as `urn:uuid:{hyphenated lower-case}`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a `urn:uuid:` string that must already be canonical.
    ///
    /// # Arguments
    ///
    /// * `input` - Identifier as read from metadata, e.g. a `wsa:MessageID` value.
    ///
    /// # Returns
    ///
    /// Returns a validated [`UuidService`] on success.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` lacks the prefix, is upper-case, or the
    /// UUID part is not hyphenated.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_canonical(input) {
            let uuid = Uuid::parse_str(&input[URN_UUID_PREFIX.len()..])
                .map_err(|e| UuidError::InvalidInput(e.to_string()))?;
            return Ok(Self(uuid));
        }
        Err(UuidError::InvalidInput(format!(
            "identifier must be 'urn:uuid:' followed by a lower-case hyphenated UUID, got: '{}'",
            input
        )))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Purely syntactic check: prefix, 36 characters, hyphens at 8/13/18/23, lower-case hex.
    pub fn is_canonical(input: &str) -> bool {
        let Some(rest) = input.strip_prefix(URN_UUID_PREFIX) else {
            return false;
        };
        rest.len() == 36
            && rest.bytes().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => b == b'-',
                _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
            })
    }
}

impl fmt::Display for UuidService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", URN_UUID_PREFIX, self.0.hyphenated())
    }
}

impl FromStr for UuidService {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UuidService::parse(s)
    }
}

/// Distinguishing suffix for hierarchical (`{root}.{suffix}`) identifiers.
///
/// The suffix is `{unix millis}.{sequence}` where the sequence is a process-wide atomic
/// counter, so two calls within one process never produce the same value regardless of
/// clock resolution or thread interleaving.
pub struct OidSuffix;

impl OidSuffix {
    /// Returns the next suffix.
    ///
    /// Safe to call from any thread; the sequence is a lock-free atomic counter.
    ///
    /// # Returns
    ///
    /// Returns `{unix millis}.{sequence}`, two numeric arcs ready to append to a root OID.
    pub fn next() -> String {
        let seq = OID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis().max(0);
        format!("{}.{}", millis, seq)
    }

    /// Returns `{root}.{next suffix}`.
    ///
    /// # Arguments
    ///
    /// * `root` - Configured root OID of the hierarchical identifier scheme.
    pub fn next_under(root: &Oid) -> String {
        root.child(&Self::next())
    }
}

/// A MIME `Content-ID` value, without the angle brackets used in the header form.
///
/// Format: `{32 hex}.{8 hex}@xds.harness`. The random tail is drawn from the thread-local
/// CSPRNG in addition to the UUID so ids stay distinct even if a caller seeds the UUID
/// source deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentId {
    /// Generates a fresh content id.
    ///
    /// # Returns
    ///
    /// Returns a `ContentId` unique across calls, threads and processes, suitable both as a
    /// MIME `Content-ID` header value and as the target of a `cid:` URI.
    pub fn new() -> Self {
        let tail: u32 = rand::thread_rng().gen();
        Self(format!(
            "{}.{:08x}@{}",
            Uuid::new_v4().simple(),
            tail,
            CONTENT_ID_DOMAIN
        ))
    }

    /// Wraps an existing content id, stripping surrounding angle brackets if present.
    ///
    /// # Arguments
    ///
    /// * `value` - A `Content-ID` header value (`<id>`) or a bare id. Whitespace is trimmed.
    pub fn from_header_value(value: &str) -> Self {
        let trimmed = value.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|v| v.strip_suffix('>'))
            .unwrap_or(trimmed);
        Self(inner.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Header form: `<id>`.
    pub fn header_value(&self) -> String {
        format!("<{}>", self.0)
    }

    /// URI form used inside `xop:Include/@href`: `cid:id`.
    pub fn cid_uri(&self) -> String {
        format!("cid:{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_generates_canonical_urn() {
        let id = UuidService::new().to_string();

        assert!(id.starts_with("urn:uuid:"));
        assert_eq!(id.len(), URN_UUID_PREFIX.len() + 36);
        assert!(UuidService::is_canonical(&id));
    }

    #[test]
    fn test_parse_valid_urn() {
        let urn = "urn:uuid:550e8400-e29b-41d4-a716-446655440000";
        let parsed = UuidService::parse(urn).expect("valid urn");

        assert_eq!(parsed.to_string(), urn);
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        let result = UuidService::parse("550e8400-e29b-41d4-a716-446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => assert!(msg.contains("urn:uuid:")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_and_simple_forms() {
        assert!(UuidService::parse("urn:uuid:550E8400-E29B-41D4-A716-446655440000").is_err());
        assert!(UuidService::parse("urn:uuid:550e8400e29b41d4a716446655440000").is_err());
    }

    #[test]
    fn test_oid_suffix_never_repeats() {
        let root = Oid::parse("1.2.3.4").unwrap();
        let ids: HashSet<String> = (0..5_000).map(|_| OidSuffix::next_under(&root)).collect();

        assert_eq!(ids.len(), 5_000);
        assert!(ids.iter().all(|id| Oid::parse(id).is_ok()));
    }

    #[test]
    fn test_oid_suffix_unique_across_threads() {
        let all: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..500).map(|_| OidSuffix::next()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<&String> = all.iter().collect();

        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_content_id_forms() {
        let cid = ContentId::from_header_value("<doc1@test>");

        assert_eq!(cid.as_str(), "doc1@test");
        assert_eq!(cid.header_value(), "<doc1@test>");
        assert_eq!(cid.cid_uri(), "cid:doc1@test");
    }

    #[test]
    fn test_content_ids_are_distinct() {
        let ids: HashSet<ContentId> = (0..1_000).map(|_| ContentId::new()).collect();

        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|c| c.as_str().ends_with("@xds.harness")));
    }
}
