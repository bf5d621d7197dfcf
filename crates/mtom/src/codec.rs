//! Encoding and decoding of `multipart/related` MTOM packages.

use crate::content_type::ContentType;
use crate::package::{MtomAttachment, MtomPackage, BINARY_TRANSFER_ENCODING};
use crate::xop::normalise_cid;
use crate::{MtomError, MtomResult, MULTIPART_RELATED, SOAP_MIME_TYPE, XOP_MIME_TYPE};
use base64::{engine::general_purpose, Engine as _};
use bytes::{Bytes, BytesMut};
use std::io::Write;
use std::ops::Range;
use xds_uuid::{ContentId, Uuid};

/// Attachments at or above this size are emitted as their own segment instead of being
/// copied into the contiguous header buffer.
pub const DEFAULT_LARGE_DOCUMENT_THRESHOLD: usize = 1024 * 1024;

const CRLF: &[u8] = b"\r\n";

/// Stateless MTOM encoder/decoder. Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct MtomCodec {
    large_document_threshold: usize,
}

impl Default for MtomCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MtomCodec {
    pub fn new() -> Self {
        Self {
            large_document_threshold: DEFAULT_LARGE_DOCUMENT_THRESHOLD,
        }
    }

    pub fn with_large_document_threshold(mut self, bytes: usize) -> Self {
        self.large_document_threshold = bytes;
        self
    }

    pub fn large_document_threshold(&self) -> usize {
        self.large_document_threshold
    }

    /// A collision-resistant `Content-ID` value (no angle brackets).
    pub fn generate_content_id() -> String {
        ContentId::new().to_string()
    }

    /// A random boundary token. 128 bits of randomness make a clash with payload bytes or a
    /// concurrently generated boundary negligible.
    pub fn generate_boundary() -> String {
        format!("MIMEBoundary_{}", Uuid::new_v4().simple())
    }

    /// Encodes `control_xml` followed by `attachments`.
    ///
    /// A fresh root content id is generated for the control part; `boundary` defaults to
    /// [`MtomCodec::generate_boundary`].
    pub fn encode(
        &self,
        control_xml: &str,
        attachments: &[MtomAttachment],
        boundary: Option<&str>,
    ) -> EncodedBody {
        let package = MtomPackage {
            boundary: boundary
                .map(str::to_owned)
                .unwrap_or_else(Self::generate_boundary),
            root_content_id: Self::generate_content_id(),
            control_xml: control_xml.to_owned(),
            attachments: attachments.to_vec(),
        };
        self.encode_package(&package)
    }

    /// Encodes an already assembled package, keeping its boundary and root content id.
    pub fn encode_package(&self, package: &MtomPackage) -> EncodedBody {
        let boundary = package.boundary.as_str();
        let inline_payload: usize = package
            .attachments
            .iter()
            .filter(|a| a.len() < self.large_document_threshold)
            .map(MtomAttachment::len)
            .sum();
        let mut current = BytesMut::with_capacity(
            package.control_xml.len() + inline_payload + 256 * (package.attachments.len() + 1),
        );
        let mut segments = Vec::new();

        write_part_headers(
            &mut current,
            boundary,
            &control_part_content_type(),
            &package.root_content_id,
        );
        current.extend_from_slice(package.control_xml.as_bytes());
        current.extend_from_slice(CRLF);

        for attachment in &package.attachments {
            write_part_headers(
                &mut current,
                boundary,
                &attachment.content_type,
                &attachment.content_id,
            );
            if attachment.len() >= self.large_document_threshold {
                tracing::debug!(
                    content_id = %attachment.content_id,
                    bytes = attachment.len(),
                    "large attachment kept as separate segment"
                );
                segments.push(current.split().freeze());
                segments.push(attachment.payload.clone());
            } else {
                current.extend_from_slice(&attachment.payload);
            }
            current.extend_from_slice(CRLF);
        }

        current.extend_from_slice(b"--");
        current.extend_from_slice(boundary.as_bytes());
        current.extend_from_slice(b"--");
        current.extend_from_slice(CRLF);
        segments.push(current.freeze());

        EncodedBody {
            segments,
            content_type: package_content_type(boundary, &package.root_content_id),
        }
    }

    /// Decodes a package and checks that every `cid:` reference resolves.
    ///
    /// # Errors
    ///
    /// - [`MtomError::InvalidContentType`] when the header is not multipart/related or has no
    ///   boundary.
    /// - [`MtomError::MalformedPackage`] when fewer than two parts are found or a part has no
    ///   header/body separator.
    /// - [`MtomError::MissingAttachment`] when a `cid:` reference has no matching part.
    pub fn decode(&self, body: &Bytes, content_type: &str) -> MtomResult<MtomPackage> {
        let package = self.decode_parts(body, content_type)?;
        package.resolve_references()?;
        Ok(package)
    }

    /// Splits and classifies the parts without resolving `cid:` references.
    ///
    /// Attachment payloads are zero-copy slices of `body` unless the part declares a base64
    /// transfer encoding, in which case the decoded bytes are returned.
    pub fn decode_parts(&self, body: &Bytes, content_type: &str) -> MtomResult<MtomPackage> {
        self.split_package(body, content_type, 2)
    }

    /// Decodes a package that may carry the SOAP envelope alone, as registry
    /// acknowledgments do. Attachments, if any, are returned as with [`Self::decode_parts`].
    ///
    /// # Errors
    ///
    /// As [`Self::decode_parts`], except that a single part is accepted.
    pub fn decode_envelope(&self, body: &Bytes, content_type: &str) -> MtomResult<MtomPackage> {
        self.split_package(body, content_type, 1)
    }

    fn split_package(
        &self,
        body: &Bytes,
        content_type: &str,
        min_parts: usize,
    ) -> MtomResult<MtomPackage> {
        let content_type = ContentType::parse_multipart(content_type)?;
        let boundary = content_type.boundary().unwrap_or_default().to_owned();

        let ranges = split_parts(body, &boundary);
        if ranges.len() < min_parts {
            return Err(MtomError::MalformedPackage(format!(
                "expected at least {min_parts} parts, found {}",
                ranges.len()
            )));
        }

        let mut parts = ranges
            .into_iter()
            .enumerate()
            .map(|(index, range)| parse_part(body, range, index))
            .collect::<MtomResult<Vec<_>>>()?;

        let root_index = match content_type.start() {
            Some(start) => {
                let wanted = normalise_cid(start);
                parts
                    .iter()
                    .position(|p| normalise_cid(&p.content_id) == wanted)
                    .ok_or_else(|| {
                        MtomError::MalformedPackage(format!(
                            "no part matches start parameter '{start}'"
                        ))
                    })?
            }
            None => 0,
        };

        let root = parts.remove(root_index);
        let control_xml = std::str::from_utf8(&root.payload)
            .map_err(|e| MtomError::MalformedPackage(format!("control part is not UTF-8: {e}")))?
            .to_owned();

        Ok(MtomPackage {
            boundary,
            root_content_id: root.content_id,
            control_xml,
            attachments: parts,
        })
    }
}

/// Output of [`MtomCodec::encode`]: the body as ordered segments plus the `Content-Type`
/// header value to send with it.
#[derive(Debug, Clone)]
pub struct EncodedBody {
    segments: Vec<Bytes>,
    content_type: String,
}

impl EncodedBody {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Body segments in wire order. Concatenated they form the complete body.
    pub fn segments(&self) -> &[Bytes] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Streams every segment into `sink` without joining them first.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> MtomResult<()> {
        for segment in &self.segments {
            sink.write_all(segment)?;
        }
        Ok(())
    }

    /// Joins the segments into one contiguous buffer. A single-segment body is returned
    /// without copying.
    pub fn into_bytes(mut self) -> Bytes {
        if self.segments.len() == 1 {
            return self.segments.pop().unwrap_or_default();
        }
        let mut joined = BytesMut::with_capacity(self.len());
        for segment in &self.segments {
            joined.extend_from_slice(segment);
        }
        joined.freeze()
    }
}

fn control_part_content_type() -> String {
    format!("{XOP_MIME_TYPE}; charset=UTF-8; type=\"{SOAP_MIME_TYPE}\"")
}

fn package_content_type(boundary: &str, root_content_id: &str) -> String {
    let start = ContentId::from_header_value(root_content_id).header_value();
    format!(
        "{MULTIPART_RELATED}; boundary=\"{boundary}\"; type=\"{XOP_MIME_TYPE}\"; \
         start=\"{start}\"; start-info=\"{SOAP_MIME_TYPE}\""
    )
}

fn write_part_headers(out: &mut BytesMut, boundary: &str, content_type: &str, content_id: &str) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(CRLF);
    out.extend_from_slice(b"Content-Type: ");
    out.extend_from_slice(content_type.as_bytes());
    out.extend_from_slice(CRLF);
    out.extend_from_slice(b"Content-Transfer-Encoding: ");
    out.extend_from_slice(BINARY_TRANSFER_ENCODING.as_bytes());
    out.extend_from_slice(CRLF);
    out.extend_from_slice(b"Content-ID: ");
    out.extend_from_slice(ContentId::from_header_value(content_id).header_value().as_bytes());
    out.extend_from_slice(CRLF);
    out.extend_from_slice(CRLF);
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Open { at: usize, content_start: usize },
    Close { at: usize },
}

/// Finds delimiter lines. A delimiter must start a line (or be preceded only by whitespace)
/// and be followed by `--`, optional padding plus a line break, or end of input.
fn find_markers(body: &[u8], boundary: &str) -> Vec<Marker> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let mut markers = Vec::new();
    let mut from = 0;

    while let Some(offset) = find(&body[from..], delimiter) {
        let at = from + offset;
        from = at + delimiter.len();

        let starts_line = at == 0
            || body[at - 1] == b'\n'
            || (markers.is_empty() && body[..at].iter().all(u8::is_ascii_whitespace));
        if !starts_line {
            continue;
        }

        let after = at + delimiter.len();
        if body[after..].starts_with(b"--") {
            markers.push(Marker::Close { at });
            continue;
        }

        let mut cursor = after;
        while cursor < body.len() && matches!(body[cursor], b' ' | b'\t') {
            cursor += 1;
        }
        let content_start = if cursor == body.len() {
            cursor
        } else if body[cursor..].starts_with(CRLF) {
            cursor + 2
        } else if body[cursor] == b'\n' {
            cursor + 1
        } else {
            // Longer token that merely starts with the boundary.
            continue;
        };
        markers.push(Marker::Open { at, content_start });
    }

    markers
}

fn split_parts(body: &[u8], boundary: &str) -> Vec<Range<usize>> {
    let markers = find_markers(body, boundary);
    let mut ranges = Vec::new();

    for (index, marker) in markers.iter().enumerate() {
        let Marker::Open { content_start, .. } = *marker else {
            break;
        };
        let end = match markers.get(index + 1) {
            Some(Marker::Open { at, .. } | Marker::Close { at }) => {
                trim_line_break(body, content_start, *at)
            }
            None => {
                if body[content_start..].iter().all(u8::is_ascii_whitespace) {
                    break;
                }
                body.len()
            }
        };
        ranges.push(content_start..end);
    }

    ranges
}

/// The line break before a delimiter belongs to the delimiter, not to the part.
fn trim_line_break(body: &[u8], start: usize, end: usize) -> usize {
    if end >= start + 2 && &body[end - 2..end] == CRLF {
        end - 2
    } else if end > start && body[end - 1] == b'\n' {
        end - 1
    } else {
        end
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns `(header_end, body_start)` for a part.
fn header_split(part: &[u8]) -> Option<(usize, usize)> {
    if part.starts_with(CRLF) {
        return Some((0, 2));
    }
    if part.starts_with(b"\n") {
        return Some((0, 1));
    }
    let crlf = find(part, b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = find(part, b"\n\n").map(|i| (i, i + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_headers(raw: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in raw.lines() {
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }
    headers
}

fn parse_part(body: &Bytes, range: Range<usize>, index: usize) -> MtomResult<MtomAttachment> {
    let part = &body[range.clone()];
    let (header_end, body_start) = header_split(part).ok_or_else(|| {
        MtomError::MalformedPackage(format!(
            "part {index} has no blank line between headers and content"
        ))
    })?;

    let headers = parse_headers(&String::from_utf8_lossy(&part[..header_end]));
    let header = |name: &str| {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };

    let content_id = header("content-id")
        .map(|v| normalise_cid(v))
        .unwrap_or_default();
    let content_type = header("content-type").unwrap_or("text/plain").to_owned();
    let transfer_encoding = header("content-transfer-encoding")
        .unwrap_or(BINARY_TRANSFER_ENCODING)
        .to_ascii_lowercase();

    let raw_payload = body.slice(range.start + body_start..range.end);
    let payload = if transfer_encoding == "base64" {
        let compact: Vec<u8> = raw_payload
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let decoded = general_purpose::STANDARD.decode(compact).map_err(|e| {
            MtomError::MalformedPackage(format!("part {index} has invalid base64 content: {e}"))
        })?;
        Bytes::from(decoded)
    } else {
        raw_payload
    };

    Ok(MtomAttachment {
        content_id,
        content_type,
        transfer_encoding,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    const XOP_DOC: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><Document id="Document01"><xop:Include xmlns:xop="http://www.w3.org/2004/08/xop/include" href="cid:doc1@test"/></Document></s:Body></s:Envelope>"#;

    fn text_attachment(id: &str, payload: &'static [u8]) -> MtomAttachment {
        MtomAttachment::binary(id, "text/xml", Bytes::from_static(payload))
    }

    #[test]
    fn encode_then_decode_recovers_control_and_attachment() {
        let codec = MtomCodec::new();
        let encoded = codec.encode("<root/>", &[text_attachment("doc1@test", b"<ccd/>")], None);
        let content_type = encoded.content_type().to_owned();

        let decoded = codec.decode(&encoded.into_bytes(), &content_type).unwrap();

        assert_eq!(decoded.control_xml, "<root/>");
        assert_eq!(decoded.attachments.len(), 1);
        assert_eq!(decoded.attachments[0].content_id, "doc1@test");
        assert_eq!(decoded.attachments[0].content_type, "text/xml");
        assert_eq!(decoded.attachments[0].payload.as_ref(), b"<ccd/>");
    }

    #[test]
    fn encoded_layout_uses_crlf_and_closing_delimiter() {
        let encoded = MtomCodec::new().encode(
            "<root/>",
            &[text_attachment("doc1@test", b"abc")],
            Some("BOUNDARY"),
        );
        let content_type = encoded.content_type().to_owned();
        let text = String::from_utf8(encoded.into_bytes().to_vec()).unwrap();

        assert!(text.starts_with("--BOUNDARY\r\nContent-Type: application/xop+xml; charset=UTF-8; type=\"application/soap+xml\"\r\nContent-Transfer-Encoding: binary\r\nContent-ID: <"));
        assert!(text.contains("\r\n--BOUNDARY\r\nContent-Type: text/xml\r\nContent-Transfer-Encoding: binary\r\nContent-ID: <doc1@test>\r\n\r\nabc\r\n"));
        assert!(text.ends_with("\r\n--BOUNDARY--\r\n"));
        assert!(content_type.starts_with("multipart/related; boundary=\"BOUNDARY\"; type=\"application/xop+xml\"; start=\"<"));
    }

    #[test]
    fn binary_payload_survives_byte_for_byte() {
        let mut payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        payload.extend_from_slice(b"\r\n--not-the-boundary\r\n\r\n");
        let codec = MtomCodec::new();
        let attachment = MtomAttachment::binary("bin@test", "application/octet-stream", payload.clone());

        let encoded = codec.encode(XOP_DOC.replace("doc1@test", "bin@test").as_str(), &[attachment], None);
        let content_type = encoded.content_type().to_owned();
        let decoded = codec.decode(&encoded.into_bytes(), &content_type).unwrap();

        assert_eq!(decoded.attachments[0].payload.as_ref(), payload.as_slice());
    }

    #[test]
    fn empty_attachment_round_trips() {
        let codec = MtomCodec::new();
        let encoded = codec.encode(XOP_DOC, &[text_attachment("doc1@test", b"")], None);
        let content_type = encoded.content_type().to_owned();

        let decoded = codec.decode(&encoded.into_bytes(), &content_type).unwrap();

        assert!(decoded.attachments[0].is_empty());
    }

    #[test]
    fn large_attachment_is_a_separate_zero_copy_segment() {
        let mut payload = vec![0u8; 3 * 1024 * 1024];
        rand::thread_rng().fill_bytes(&mut payload);
        let payload = Bytes::from(payload);
        let codec = MtomCodec::new().with_large_document_threshold(1024);
        let attachment = MtomAttachment::binary("doc1@test", "text/xml", payload.clone());

        let encoded = codec.encode(XOP_DOC, &[attachment], None);

        assert_eq!(encoded.segments().len(), 3);
        assert_eq!(encoded.segments()[1].as_ptr(), payload.as_ptr());

        let mut streamed = Vec::new();
        encoded.write_to(&mut streamed).unwrap();
        assert_eq!(streamed.len(), encoded.len());

        let content_type = encoded.content_type().to_owned();
        let decoded = codec.decode(&Bytes::from(streamed), &content_type).unwrap();
        assert_eq!(decoded.attachments[0].payload, payload);
    }

    #[test]
    fn small_attachments_are_inlined_into_one_segment() {
        let encoded = MtomCodec::new().encode("<root/>", &[text_attachment("a@x", b"1")], None);
        assert_eq!(encoded.segments().len(), 1);
    }

    #[test]
    fn decode_tolerates_preamble_lf_and_missing_close() {
        let body = Bytes::from_static(
            b"\r\n  --b1\nContent-ID: <root@x>\nContent-Type: application/xop+xml\n\n<root/>\n--b1\nContent-ID: <a@x>\n\nPAYLOAD\n--b1\n",
        );
        let pkg = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=b1")
            .unwrap();

        assert_eq!(pkg.control_xml, "<root/>");
        assert_eq!(pkg.root_content_id, "root@x");
        assert_eq!(pkg.attachments[0].payload.as_ref(), b"PAYLOAD");
    }

    #[test]
    fn start_parameter_selects_control_part() {
        let body = Bytes::from_static(
            b"--b\r\nContent-ID: <a@x>\r\n\r\nATTACH\r\n--b\r\nContent-ID: <root@x>\r\n\r\n<root/>\r\n--b--",
        );
        let pkg = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=\"b\"; start=\"<root@x>\"")
            .unwrap();

        assert_eq!(pkg.control_xml, "<root/>");
        assert_eq!(pkg.attachments.len(), 1);
        assert_eq!(pkg.attachments[0].content_id, "a@x");
    }

    #[test]
    fn unknown_start_is_malformed() {
        let body = Bytes::from_static(b"--b\r\n\r\n<root/>\r\n--b\r\n\r\nX\r\n--b--");
        let err = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=b; start=\"<nope@x>\"")
            .unwrap_err();
        assert!(matches!(err, MtomError::MalformedPackage(_)));
    }

    #[test]
    fn single_part_is_malformed() {
        let body = Bytes::from_static(b"--b\r\nContent-ID: <root@x>\r\n\r\n<root/>\r\n--b--\r\n");
        let err = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=b")
            .unwrap_err();
        assert!(matches!(err, MtomError::MalformedPackage(msg) if msg.contains("at least 2 parts")));
    }

    #[test]
    fn bracketed_content_ids_are_not_double_wrapped() {
        let attachment = MtomAttachment::binary("<doc@x>", "text/xml", &b"abc"[..]);
        let body = MtomCodec::new().encode("<root/>", &[attachment], Some("b"));
        let text = String::from_utf8(body.into_bytes().to_vec()).unwrap();

        assert!(text.contains("Content-ID: <doc@x>\r\n"));
        assert!(!text.contains("<<"));
    }

    #[test]
    fn envelope_only_package_decodes_without_attachments() {
        let codec = MtomCodec::new();
        let encoded = codec.encode("<Envelope/>", &[], None);
        let content_type = encoded.content_type().to_owned();
        let body = encoded.into_bytes();

        assert!(codec.decode_parts(&body, &content_type).is_err());

        let package = codec.decode_envelope(&body, &content_type).unwrap();
        assert_eq!(package.control_xml, "<Envelope/>");
        assert!(package.attachments.is_empty());
    }

    #[test]
    fn envelope_decode_still_requires_a_part() {
        let err = MtomCodec::new()
            .decode_envelope(&Bytes::from_static(b"no delimiters"), "multipart/related; boundary=b")
            .unwrap_err();
        assert!(matches!(err, MtomError::MalformedPackage(_)));
    }

    #[test]
    fn part_without_blank_line_is_malformed() {
        let body = Bytes::from_static(
            b"--b\r\nContent-ID: <root@x>\r\n\r\n<root/>\r\n--b\r\nContent-ID: <a@x>\r\n--b--",
        );
        let err = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=b")
            .unwrap_err();
        assert!(matches!(err, MtomError::MalformedPackage(msg) if msg.contains("blank line")));
    }

    #[test]
    fn missing_boundary_parameter_is_invalid_content_type() {
        let err = MtomCodec::new()
            .decode(&Bytes::from_static(b""), "multipart/related; type=\"application/xop+xml\"")
            .unwrap_err();
        assert!(matches!(err, MtomError::InvalidContentType(_)));
    }

    #[test]
    fn unresolved_cid_is_missing_attachment() {
        let codec = MtomCodec::new();
        let encoded = codec.encode(XOP_DOC, &[text_attachment("other@test", b"x")], None);
        let content_type = encoded.content_type().to_owned();

        let err = codec
            .decode(&encoded.into_bytes(), &content_type)
            .unwrap_err();

        assert!(matches!(err, MtomError::MissingAttachment(cid) if cid == "doc1@test"));
    }

    #[test]
    fn base64_parts_are_decoded() {
        let body = Bytes::from_static(
            b"--b\r\nContent-ID: <root@x>\r\n\r\n<root/>\r\n--b\r\nContent-ID: <a@x>\r\nContent-Transfer-Encoding: BASE64\r\n\r\naGVs\r\nbG8=\r\n--b--",
        );
        let pkg = MtomCodec::new()
            .decode(&body, "multipart/related; boundary=b")
            .unwrap();
        assert_eq!(pkg.attachments[0].payload.as_ref(), b"hello");
    }

    #[test]
    fn generated_boundaries_and_content_ids_are_unique() {
        let boundaries: std::collections::HashSet<String> =
            (0..500).map(|_| MtomCodec::generate_boundary()).collect();
        let cids: std::collections::HashSet<String> =
            (0..500).map(|_| MtomCodec::generate_content_id()).collect();
        assert_eq!(boundaries.len(), 500);
        assert_eq!(cids.len(), 500);
    }
}
