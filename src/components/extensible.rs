use crate::component::{Builder, Component, OutputPair};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

/// A foreign-namespace element carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensibleElement {
    version: SchemaVersion,
    element: XmlElement,
}

impl ExtensibleElement {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        Self::new(element.clone(), ctx)
    }

    pub fn new(element: XmlElement, ctx: &ValidationContext) -> Result<Self> {
        if element.namespace().is_empty() || SchemaVersion::is_ddms_namespace(element.namespace()) {
            return Err(DdmsError::invalid(
                "Extensible elements cannot be defined in the DDMS namespace.",
            )
            .locate(&format!("/{}", element.qualified_name())));
        }
        Ok(Self {
            version: ctx.version(),
            element,
        })
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }
}

impl Component for ExtensibleElement {
    fn name(&self) -> &str {
        self.element.local_name()
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn prefix(&self) -> &str {
        self.element.prefix()
    }

    fn namespace(&self) -> &str {
        self.element.namespace()
    }

    fn qualified_name(&self) -> String {
        self.element.qualified_name()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    /// Extensible content is not rendered.
    fn output_pairs(&self, _prefix: &str, _suffix: &str) -> Vec<OutputPair> {
        Vec::new()
    }

    fn to_xml(&self) -> XmlElement {
        self.element.clone()
    }
}

/// Stages the element as raw XML text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensibleElementBuilder {
    pub xml: String,
}

impl Builder for ExtensibleElementBuilder {
    type Output = ExtensibleElement;

    fn is_empty(&self) -> bool {
        self.xml.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<ExtensibleElement>> {
        if self.is_empty() {
            return Ok(None);
        }
        let element = XmlElement::parse(&self.xml)?;
        ExtensibleElement::new(element, ctx).map(Some)
    }
}

impl From<&ExtensibleElement> for ExtensibleElementBuilder {
    fn from(extensible: &ExtensibleElement) -> Self {
        Self {
            xml: extensible.element.to_xml_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    const FOREIGN: &str = r#"<ddmsence:extension xmlns:ddmsence="http://ddmsence.urizone.net/">This is an extensible element.</ddmsence:extension>"#;

    #[test]
    fn test_foreign_element_kept_verbatim() {
        let ctx = ctx(SchemaVersion::V4_1);
        let element = ExtensibleElement::from_xml(&XmlElement::parse(FOREIGN).unwrap(), &ctx).unwrap();
        assert_eq!(element.qualified_name(), "ddmsence:extension");
        assert_eq!(element.namespace(), "http://ddmsence.urizone.net/");
        assert_eq!(element.to_xml_string(), FOREIGN);
        assert!(element.output_pairs("", "").is_empty());
    }

    #[test]
    fn test_ddms_namespace_rejected() {
        let version = SchemaVersion::V4_1;
        let xml = format!(
            r#"<ddms:title xmlns:ddms="{}">x</ddms:title>"#,
            version.ddms_namespace()
        );
        let err = ExtensibleElement::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx(version)).unwrap_err();
        assert_eq!(err.message(), "Extensible elements cannot be defined in the DDMS namespace.");
    }

    #[test]
    fn test_builder_round_trip() {
        let ctx = ctx(SchemaVersion::V3_0);
        let element = ExtensibleElement::from_xml(&XmlElement::parse(FOREIGN).unwrap(), &ctx).unwrap();
        assert_eq!(ExtensibleElementBuilder::from(&element).commit(&ctx).unwrap(), Some(element));
        assert!(ExtensibleElementBuilder::default().commit(&ctx).unwrap().is_none());
    }
}
