//! `xop:Include` discovery inside the control part.

use crate::content_type::strip_angle_brackets;
use crate::{MtomError, MtomResult, XOP_NAMESPACE};
use percent_encoding::percent_decode_str;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Returns the content ids referenced by `Include` elements, in document order.
///
/// An element counts as an include when its local name is `Include` and it is either bound to
/// the XOP namespace or not bound to any namespace. References are returned without the
/// `cid:` scheme and percent-decoded (RFC 2392).
pub fn xop_references(xml: &str) -> MtomResult<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    let mut references = Vec::new();

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| MtomError::MalformedPackage(format!("control part is not XML: {e}")))?;
        let in_xop_scope = match ns {
            ResolveResult::Bound(Namespace(uri)) => uri == XOP_NAMESPACE.as_bytes(),
            ResolveResult::Unbound => true,
            ResolveResult::Unknown(_) => false,
        };

        match event {
            Event::Start(e) | Event::Empty(e)
                if in_xop_scope && e.local_name().as_ref() == b"Include" =>
            {
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| {
                        MtomError::MalformedPackage(format!("bad attribute in control part: {e}"))
                    })?;
                    if attr.key.local_name().as_ref() != b"href" {
                        continue;
                    }
                    let href = attr.unescape_value().map_err(|e| {
                        MtomError::MalformedPackage(format!("bad attribute in control part: {e}"))
                    })?;
                    if href.trim_start().to_ascii_lowercase().starts_with("cid:") {
                        references.push(normalise_cid(&href));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(references)
}

/// Canonical comparison form of a content id: no `cid:` scheme, no angle brackets,
/// percent-decoded.
pub(crate) fn normalise_cid(value: &str) -> String {
    let trimmed = value.trim();
    let without_scheme = match trimmed.get(..4) {
        Some(scheme) if scheme.eq_ignore_ascii_case("cid:") => &trimmed[4..],
        _ => trimmed,
    };
    percent_decode_str(strip_angle_brackets(without_scheme))
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_prefixed_and_default_namespace_includes() {
        let xml = r#"<Envelope>
            <Document id="d1"><xop:Include xmlns:xop="http://www.w3.org/2004/08/xop/include" href="cid:a@x"/></Document>
            <Document id="d2"><Include xmlns="http://www.w3.org/2004/08/xop/include" href="cid:b%40x"></Include></Document>
        </Envelope>"#;

        assert_eq!(xop_references(xml).unwrap(), vec!["a@x", "b@x"]);
    }

    #[test]
    fn ignores_include_elements_from_other_namespaces() {
        let xml = r#"<r xmlns:o="urn:other"><o:Include href="cid:z@x"/></r>"#;
        assert!(xop_references(xml).unwrap().is_empty());
    }

    #[test]
    fn non_cid_hrefs_are_not_references() {
        let xml = r#"<Include href="http://example.org/doc"/>"#;
        assert!(xop_references(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_reported() {
        let err = xop_references("<a><b></a>").unwrap_err();
        assert!(matches!(err, MtomError::MalformedPackage(_)));
    }
}
