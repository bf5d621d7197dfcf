use crate::{XdsError, XdsResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Ordered namespace candidates for a lookup.
///
/// Producers do not all bind the same namespace for an element, so lookups try the canonical
/// namespace first and then the namespace the document root actually uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NsCandidates<'a>(Vec<Option<&'a str>>);

impl<'a> NsCandidates<'a> {
    /// Canonical namespace only.
    pub fn only(canonical: &'a str) -> Self {
        Self(vec![Some(canonical)])
    }

    /// Canonical namespace, then `root`'s namespace when different.
    pub fn with_root(canonical: &'a str, root: &'a Element) -> Self {
        let mut candidates = vec![Some(canonical)];
        if root.namespace() != Some(canonical) {
            candidates.push(root.namespace());
        }
        Self(candidates)
    }

    /// Appends another namespace to try.
    pub fn or(mut self, namespace: &'a str) -> Self {
        self.0.push(Some(namespace));
        self
    }

    /// Appends "no namespace" as a candidate.
    pub fn or_unqualified(mut self) -> Self {
        self.0.push(None);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a str>> + '_ {
        self.0.iter().copied()
    }
}

/// A parsed element with resolved namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Parses `xml` into a tree. Comments, processing instructions and the declaration are
    /// dropped; text and CDATA are concatenated per element.
    ///
    /// # Errors
    ///
    /// Returns `XdsError::Xml` for malformed markup and `XdsError::InvalidInput` when the
    /// input has no root element or ends inside one.
    pub fn parse(xml: &str) -> XdsResult<Element> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(start) => stack.push(Element::from_start(ns, &start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(ns, &start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XdsError::InvalidInput(
                "XML ended before the root element was closed".into(),
            ));
        }
        root.ok_or_else(|| XdsError::InvalidInput("XML has no root element".into()))
    }

    fn from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> XdsResult<Element> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
        };

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((name, attr.unescape_value()?.into_owned()));
        }

        Ok(Element {
            namespace,
            local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text content of this element (not of its descendants).
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn is_named(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.namespace() == namespace && self.local_name == local_name
    }

    /// First direct child matching the first candidate namespace that yields a match.
    pub fn child(&self, candidates: &NsCandidates<'_>, local_name: &str) -> Option<&Element> {
        candidates.iter().find_map(|ns| {
            self.children
                .iter()
                .find(|child| child.is_named(ns, local_name))
        })
    }

    /// Direct children matching the first candidate namespace that yields any.
    pub fn children_named(&self, candidates: &NsCandidates<'_>, local_name: &str) -> Vec<&Element> {
        for ns in candidates.iter() {
            let found: Vec<&Element> = self
                .children
                .iter()
                .filter(|child| child.is_named(ns, local_name))
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// First element in document order, `self` included.
    pub fn find(&self, candidates: &NsCandidates<'_>, local_name: &str) -> Option<&Element> {
        candidates
            .iter()
            .find_map(|ns| self.find_with(ns, local_name))
    }

    /// All matching elements in document order for the first candidate namespace that yields
    /// any, `self` included.
    pub fn find_all(&self, candidates: &NsCandidates<'_>, local_name: &str) -> Vec<&Element> {
        for ns in candidates.iter() {
            let mut found = Vec::new();
            self.collect_with(ns, local_name, &mut found);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    fn find_with(&self, ns: Option<&str>, local_name: &str) -> Option<&Element> {
        if self.is_named(ns, local_name) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_with(ns, local_name))
    }

    fn collect_with<'e>(&'e self, ns: Option<&str>, local_name: &str, out: &mut Vec<&'e Element>) {
        if self.is_named(ns, local_name) {
            out.push(self);
        }
        for child in &self.children {
            child.collect_with(ns, local_name, out);
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIM: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:rim:3.0";

    #[test]
    fn test_parses_namespaces_attributes_and_text() {
        let root = Element::parse(
            r#"<?xml version="1.0"?><a:Root xmlns:a="urn:a" id="r1"><a:Child>  hi &amp; bye </a:Child><Plain/></a:Root>"#,
        )
        .unwrap();

        assert_eq!(root.namespace(), Some("urn:a"));
        assert_eq!(root.local_name(), "Root");
        assert_eq!(root.attr("id"), Some("r1"));
        assert_eq!(root.attr("a"), None);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].text(), "hi & bye");
        assert_eq!(root.children()[1].namespace(), None);
    }

    #[test]
    fn test_lookup_falls_back_to_root_namespace() {
        let xml = r#"<r:Doc xmlns:r="urn:legacy"><r:ExternalIdentifier value="x"/></r:Doc>"#;
        let root = Element::parse(xml).unwrap();

        let canonical_only = NsCandidates::only(RIM);
        assert!(root.find(&canonical_only, "ExternalIdentifier").is_none());

        let candidates = NsCandidates::with_root(RIM, &root);
        let found = root.find(&candidates, "ExternalIdentifier").unwrap();
        assert_eq!(found.attr("value"), Some("x"));
    }

    #[test]
    fn test_canonical_namespace_wins_over_root_namespace() {
        let xml = format!(
            r#"<Doc xmlns="urn:legacy" xmlns:rim="{RIM}"><Slot name="legacy"/><rim:Slot name="canonical"/></Doc>"#
        );
        let root = Element::parse(&xml).unwrap();
        let candidates = NsCandidates::with_root(RIM, &root);

        let slots = root.find_all(&candidates, "Slot");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].attr("name"), Some("canonical"));
    }

    #[test]
    fn test_rejects_malformed_and_empty_input() {
        assert!(Element::parse("<a><b></a>").is_err());
        assert!(Element::parse("").is_err());
        assert!(Element::parse("<a>").is_err());
    }
}
