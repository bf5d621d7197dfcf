//! MTOM/XOP packaging.
//!
//! Binary-safe packaging of one XML control part plus N binary attachments as a single
//! `multipart/related` byte stream, and the reverse.
//!
//! ## Wire layout
//!
//! ```text
//! --{boundary}\r\n
//! Content-Type: application/xop+xml; charset=UTF-8; type="application/soap+xml"\r\n
//! Content-Transfer-Encoding: binary\r\n
//! Content-ID: <root>\r\n
//! \r\n
//! {control xml}\r\n
//! --{boundary}\r\n
//! Content-Type: text/xml\r\n
//! Content-Transfer-Encoding: binary\r\n
//! Content-ID: <doc>\r\n
//! \r\n
//! {payload bytes}\r\n
//! --{boundary}--\r\n
//! ```
//!
//! Payloads are never re-encoded on the way out. Attachments at or above the codec's
//! large-document threshold are not copied at all: [`EncodedBody`] keeps them as separate
//! reference-counted segments that a transport can stream in order. On the way in,
//! attachment payloads are zero-copy slices of the received body.

mod codec;
mod content_type;
mod package;
mod xop;

pub use codec::{EncodedBody, MtomCodec, DEFAULT_LARGE_DOCUMENT_THRESHOLD};
pub use content_type::ContentType;
pub use package::{MtomAttachment, MtomPackage};
pub use xop::xop_references;

/// MIME type of the XOP control part.
pub const XOP_MIME_TYPE: &str = "application/xop+xml";

/// SOAP 1.2 media type carried in the `type`/`start-info` parameters.
pub const SOAP_MIME_TYPE: &str = "application/soap+xml";

/// Top-level media type of every package.
pub const MULTIPART_RELATED: &str = "multipart/related";

/// XOP include namespace.
pub const XOP_NAMESPACE: &str = "http://www.w3.org/2004/08/xop/include";

/// Errors reported by the codec. None are retried here.
#[derive(Debug, thiserror::Error)]
pub enum MtomError {
    /// Missing boundary parameter, or the top-level type is not multipart/related
    #[error("Invalid Content-Type: {0}")]
    InvalidContentType(String),

    /// The body could not be split into well-formed parts
    #[error("Malformed MTOM package: {0}")]
    MalformedPackage(String),

    /// A `cid:` reference in the control part has no matching attachment
    #[error("Missing attachment for reference: {0}")]
    MissingAttachment(String),

    /// Writing an encoded body to a sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MtomResult<T> = Result<T, MtomError>;
