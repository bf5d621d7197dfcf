//! Validated text primitives shared across the XDS harness crates.
//!
//! Each type guarantees its invariant once constructed, so downstream code never re-checks
//! the same string: [`NonEmptyText`] is trimmed and non-empty, [`Oid`] is a dot-separated
//! numeric object identifier and [`Sha256Hash`] is a 64 character lower-case hex digest.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static OID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+$").expect("OID pattern is a valid regex"));

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input is not a dot-separated numeric OID
    #[error("Invalid OID: '{0}'")]
    InvalidOid(String),

    /// The input is not a lower-case hex SHA-256 digest
    #[error("Invalid SHA-256 hash: '{0}'")]
    InvalidHash(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Text to validate. Leading and trailing whitespace is removed first.
    ///
    /// # Returns
    ///
    /// Returns the trimmed text wrapped in `NonEmptyText`.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// An ISO object identifier such as `1.2.840.113619.6.197`.
///
/// At least two numeric arcs separated by single dots. Empty arcs (`1..2`), letters and
/// surrounding whitespace are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(String);

impl Oid {
    /// Validates `input` against `^[0-9]+(\.[0-9]+)+$` (ASCII digits only).
    ///
    /// No normalisation is applied: surrounding whitespace or a leading `urn:oid:` prefix is
    /// rejected rather than stripped.
    ///
    /// # Arguments
    ///
    /// * `input` - Candidate object identifier, e.g. `1.3.6.1.4.1.21367`.
    ///
    /// # Returns
    ///
    /// Returns the validated [`Oid`].
    ///
    /// # Errors
    ///
    /// Returns [`TextError::InvalidOid`] if the input does not match.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        if OID_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(TextError::InvalidOid(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends one further arc, e.g. `1.2.3` + `17` -> `1.2.3.17`.
    pub fn child(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix)
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Oid {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::parse(s)
    }
}

impl serde::Serialize for Oid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Oid::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Lower-case hex SHA-256 digest of a byte payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Digests `bytes` and hex-encodes the result.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The exact content that will be transmitted or stored.
    ///
    /// # Returns
    ///
    /// Returns the 64 character lower-case hex digest.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Accepts an existing digest; must be exactly 64 lower-case hex characters.
    ///
    /// # Arguments
    ///
    /// * `input` - Hex digest, typically read back from a sidecar or a hash slot.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::InvalidHash`] for the wrong length, upper-case letters or
    /// non-hex characters.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let ok = input.len() == 64
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if ok {
            Ok(Self(input.to_owned()))
        } else {
            Err(TextError::InvalidHash(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Sha256Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Sha256Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  abc ").unwrap().as_str(), "abc");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn oid_accepts_dotted_numeric() {
        assert_eq!(Oid::parse("1.2.3.4.5").unwrap().as_str(), "1.2.3.4.5");
        assert!(Oid::parse("2.16.840.1.113883.2.4.6.3").is_ok());
    }

    #[test]
    fn oid_rejects_malformed_input() {
        for bad in ["not-an-oid", "", "1..2", "1", "1.2.", ".1.2", "1.2a", " 1.2"] {
            assert!(
                matches!(Oid::parse(bad), Err(TextError::InvalidOid(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn oid_child_appends_arc() {
        let oid = Oid::parse("1.2.3").unwrap();
        assert_eq!(oid.child("42"), "1.2.3.42");
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            Sha256Hash::of(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_parse_rejects_uppercase() {
        let upper = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
        assert!(Sha256Hash::parse(upper).is_err());
        assert!(Sha256Hash::parse(&upper.to_lowercase()).is_ok());
    }

    #[test]
    fn oid_deserialises_with_validation() {
        let ok: Oid = serde_json::from_str("\"1.2.3\"").unwrap();
        assert_eq!(ok.as_str(), "1.2.3");
        assert!(serde_json::from_str::<Oid>("\"abc\"").is_err());
    }
}
