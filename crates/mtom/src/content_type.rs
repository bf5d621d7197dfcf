//! `Content-Type` header values with parameters.

use crate::{MtomError, MtomResult, MULTIPART_RELATED};

/// A parsed `Content-Type` value: the media type essence plus its parameters.
///
/// The essence and parameter names are stored lower-cased; parameter values keep their case
/// with surrounding quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    essence: String,
    params: Vec<(String, String)>,
}

impl ContentType {
    pub fn parse(value: &str) -> Self {
        let mut pieces = split_params(value).into_iter();
        let essence = pieces
            .next()
            .map(|e| e.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let params = pieces
            .filter_map(|piece| {
                let (name, value) = piece.split_once('=')?;
                let name = name.trim().to_ascii_lowercase();
                if name.is_empty() {
                    return None;
                }
                Some((name, unquote(value.trim())))
            })
            .collect();

        Self { essence, params }
    }

    /// Parses a value that must describe an MTOM package.
    ///
    /// # Errors
    ///
    /// [`MtomError::InvalidContentType`] if the essence is not `multipart/related` or there is
    /// no non-empty `boundary` parameter.
    pub fn parse_multipart(value: &str) -> MtomResult<Self> {
        let parsed = Self::parse(value);
        if parsed.essence != MULTIPART_RELATED {
            return Err(MtomError::InvalidContentType(format!(
                "expected {}, got '{}'",
                MULTIPART_RELATED, parsed.essence
            )));
        }
        match parsed.boundary() {
            Some(b) if !b.is_empty() => Ok(parsed),
            _ => Err(MtomError::InvalidContentType(
                "missing boundary parameter".into(),
            )),
        }
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// Case-insensitive parameter lookup.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }

    /// The `start` parameter with any angle brackets removed.
    pub fn start(&self) -> Option<&str> {
        self.param("start").map(strip_angle_brackets)
    }

    pub fn is_multipart_related(&self) -> bool {
        self.essence == MULTIPART_RELATED
    }
}

pub(crate) fn strip_angle_brackets(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(trimmed)
}

/// Splits on `;` outside double quotes.
fn split_params(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pieces.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&value[start..]);
    pieces
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_parameters_case_insensitively() {
        let ct = ContentType::parse(
            r#"Multipart/Related; BOUNDARY="MIMEBoundary_abc;def"; type="application/xop+xml"; start="<root@x>""#,
        );

        assert_eq!(ct.essence(), "multipart/related");
        assert_eq!(ct.boundary(), Some("MIMEBoundary_abc;def"));
        assert_eq!(ct.param("TYPE"), Some("application/xop+xml"));
        assert_eq!(ct.start(), Some("root@x"));
    }

    #[test]
    fn unquoted_boundary_is_accepted() {
        let ct = ContentType::parse_multipart("multipart/related; boundary=abc123").unwrap();
        assert_eq!(ct.boundary(), Some("abc123"));
        assert_eq!(ct.start(), None);
    }

    #[test]
    fn missing_boundary_is_rejected() {
        let err = ContentType::parse_multipart("multipart/related; type=\"application/xop+xml\"")
            .unwrap_err();
        assert!(matches!(err, MtomError::InvalidContentType(_)));
    }

    #[test]
    fn non_multipart_is_rejected() {
        let err = ContentType::parse_multipart("application/soap+xml; boundary=abc").unwrap_err();
        assert!(matches!(err, MtomError::InvalidContentType(msg) if msg.contains("multipart/related")));
    }
}
