use quick_xml::escape::escape;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Element(XmlElement),
    Text(String),
    /// Pre-serialised markup inserted verbatim.
    Raw(String),
}

/// An owned element tree that serialises to a string.
///
/// Names are written exactly as given, so callers supply prefixed names (`rim:Slot`) and
/// declare namespaces with ordinary `xmlns:*` attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends already-serialised markup. The caller is responsible for it being well formed.
    pub fn raw(mut self, markup: impl Into<String>) -> Self {
        self.children.push(Node::Raw(markup.into()));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(Node::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(out),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
                Node::Raw(markup) => out.push_str(markup),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_nested_elements_and_escapes() {
        let xml = XmlElement::new("rim:Slot")
            .attr("name", "a&b \"q\"")
            .child(XmlElement::new("rim:Value").text("1 < 2"))
            .child(XmlElement::new("rim:Empty"))
            .to_xml_string();

        assert_eq!(
            xml,
            r#"<rim:Slot name="a&amp;b &quot;q&quot;"><rim:Value>1 &lt; 2</rim:Value><rim:Empty/></rim:Slot>"#
        );
    }

    #[test]
    fn test_raw_markup_is_inserted_verbatim() {
        let xml = XmlElement::new("Header")
            .raw("<wsse:Security>signed</wsse:Security>")
            .to_xml_string();
        assert_eq!(xml, "<Header><wsse:Security>signed</wsse:Security></Header>");
    }
}
