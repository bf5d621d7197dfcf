//! Minimal XML tree reading and writing on top of `quick-xml`.

mod dom;
mod writer;

pub use dom::{Element, NsCandidates};
pub use writer::XmlElement;

/// XML declaration prepended to serialised documents.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
