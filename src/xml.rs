//! Owned XML element tree.
//!
//! Components read parsed input and write their rendered form exclusively through
//! [`XmlElement`]. Parsing is delegated to `roxmltree`; serialization is ours so
//! that output is deterministic: prefixed namespace declarations are emitted on the
//! root in first-use order, a prefix rebound further down is redeclared where it
//! changes, and attributes keep insertion order.

use std::fmt::Write as _;

use crate::error::{DdmsError, Result};

/// An attribute with its namespace binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: String,
    pub namespace: String,
    pub local: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local: local.into(),
            value: value.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.prefix, &self.local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    prefix: String,
    namespace: String,
    local: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
}

fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

impl XmlElement {
    pub fn new(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local: local.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse `text` and return its root element.
    pub fn parse(text: &str) -> Result<Self> {
        let document =
            roxmltree::Document::parse(text).map_err(|e| DdmsError::XmlParse(e.to_string()))?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let namespace = node.tag_name().namespace().unwrap_or_default();
        let prefix = if namespace.is_empty() {
            ""
        } else {
            node.lookup_prefix(namespace).unwrap_or_default()
        };
        let mut element = XmlElement::new(prefix, namespace, node.tag_name().name());

        for attribute in node.attributes() {
            let namespace = attribute.namespace().unwrap_or_default();
            let prefix = if namespace.is_empty() {
                ""
            } else {
                node.lookup_prefix(namespace).unwrap_or_default()
            };
            element.attributes.push(XmlAttribute::new(
                prefix,
                namespace,
                attribute.name(),
                attribute.value(),
            ));
        }

        for child in node.children() {
            if child.is_element() {
                element.children.push(XmlNode::Element(Self::from_node(child)));
            } else if child.is_text() {
                let text = child.text().unwrap_or_default();
                if !text.trim().is_empty() {
                    element.children.push(XmlNode::Text(text.to_string()));
                }
            }
        }
        element
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.prefix, &self.local)
    }

    /// True when this element is `{namespace}local`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Attribute value by namespace URI and local name. An empty `namespace`
    /// selects unqualified attributes.
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace == namespace && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Like [`attribute`](Self::attribute) but an absent attribute reads as "".
    pub fn attribute_value(&self, namespace: &str, local: &str) -> String {
        self.attribute(namespace, local).unwrap_or_default().to_string()
    }

    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        namespace: &'n str,
        local: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'n
    where
        'a: 'n,
    {
        self.children().filter(move |c| c.is(namespace, local))
    }

    pub fn first_child(&self, namespace: &str, local: &str) -> Option<&XmlElement> {
        self.children_named(namespace, local).next()
    }

    /// Text of a named child, or "" when the child is absent.
    pub fn child_text(&self, namespace: &str, local: &str) -> String {
        self.first_child(namespace, local)
            .map(|c| c.text())
            .unwrap_or_default()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    pub fn add_attribute(
        &mut self,
        prefix: &str,
        namespace: &str,
        local: &str,
        value: impl Into<String>,
    ) {
        self.attributes
            .push(XmlAttribute::new(prefix, namespace, local, value));
    }

    /// Adds the attribute only when `value` is non-empty.
    pub fn add_optional_attribute(&mut self, prefix: &str, namespace: &str, local: &str, value: &str) {
        if !value.is_empty() {
            self.add_attribute(prefix, namespace, local, value);
        }
    }

    pub fn push_attribute(&mut self, attribute: XmlAttribute) {
        self.attributes.push(attribute);
    }

    pub fn append_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn append_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    pub fn with_attribute(mut self, prefix: &str, namespace: &str, local: &str, value: &str) -> Self {
        self.add_attribute(prefix, namespace, local, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.append_text(text);
        self
    }

    /// Serialize without an XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut declarations: Vec<(String, String)> = Vec::new();
        self.collect_namespaces(&mut declarations);

        let mut out = String::new();
        self.write(&mut out, &declarations, &[], "");
        out
    }

    /// First binding of every prefix, in first-use order.
    fn collect_namespaces(&self, declarations: &mut Vec<(String, String)>) {
        for (prefix, namespace) in self.bindings() {
            if !declarations.iter().any(|(p, _)| p == prefix) {
                declarations.push((prefix.to_string(), namespace.to_string()));
            }
        }
        for child in self.children() {
            child.collect_namespaces(declarations);
        }
    }

    /// Prefix bindings this element and its attributes rely on.
    fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((self.prefix.as_str(), self.namespace.as_str()))
            .chain(
                self.attributes
                    .iter()
                    .map(|a| (a.prefix.as_str(), a.namespace.as_str())),
            )
            .filter(|(prefix, namespace)| {
                !prefix.is_empty() && *prefix != "xml" && !namespace.is_empty()
            })
    }

    /// `declarations` are emitted on this element unconditionally; `scope` holds
    /// the bindings inherited from ancestors, innermost last.
    fn write(
        &self,
        out: &mut String,
        declarations: &[(String, String)],
        scope: &[(String, String)],
        default_ns: &str,
    ) {
        let name = self.qualified_name();
        out.push('<');
        out.push_str(&name);

        let mut local: Vec<(String, String)> = declarations.to_vec();
        for (prefix, namespace) in self.bindings() {
            let bound = local
                .iter()
                .rev()
                .chain(scope.iter().rev())
                .find(|(p, _)| p == prefix)
                .map(|(_, ns)| ns.as_str());
            if bound != Some(namespace) && !local.iter().any(|(p, _)| p == prefix) {
                local.push((prefix.to_string(), namespace.to_string()));
            }
        }
        for (prefix, namespace) in &local {
            let _ = write!(out, " xmlns:{}=\"{}\"", prefix, escape_attribute(namespace));
        }
        if self.prefix.is_empty() && self.namespace != default_ns {
            let _ = write!(out, " xmlns=\"{}\"", escape_attribute(&self.namespace));
        }
        for attribute in &self.attributes {
            let _ = write!(
                out,
                " {}=\"{}\"",
                attribute.qualified_name(),
                escape_attribute(&attribute.value)
            );
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let default_ns = if self.prefix.is_empty() {
            self.namespace.as_str()
        } else {
            default_ns
        };
        let mut inner = scope.to_vec();
        inner.extend(local);
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write(out, &[], &inner, default_ns),
                XmlNode::Text(text) => out.push_str(&escape_text(text)),
            }
        }
        let _ = write!(out, "</{}>", name);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
