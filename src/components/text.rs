use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{Builder, Component, OutputPair, ddms_element, push_pair};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    Title,
    Subtitle,
    Description,
}

impl TextKind {
    pub const ALL: [TextKind; 3] = [TextKind::Title, TextKind::Subtitle, TextKind::Description];

    pub fn local_name(&self) -> &'static str {
        match self {
            TextKind::Title => "title",
            TextKind::Subtitle => "subtitle",
            TextKind::Description => "description",
        }
    }

    fn locator(&self) -> String {
        format!("/ddms:{}", self.local_name())
    }

    /// The kind whose element `element` is, if any.
    pub fn of(element: &XmlElement, version: SchemaVersion) -> Option<TextKind> {
        Self::ALL
            .into_iter()
            .find(|k| element.is(version.ddms_namespace(), k.local_name()))
    }
}

/// A marked, free-text child of the resource: title, subtitle or description.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    kind: TextKind,
    version: SchemaVersion,
    text: String,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl TextElement {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let kind = TextKind::of(element, ctx.version()).ok_or_else(|| {
            DdmsError::invalid(format!(
                "Unexpected element for a title, subtitle or description: {}",
                element.qualified_name()
            ))
        })?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(&kind.locator()))?;
        Self::new(kind, element.text(), security, ctx)
    }

    pub fn new(
        kind: TextKind,
        text: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut element = Self {
            kind,
            version: ctx.version(),
            text: text.into(),
            security,
            warnings: Vec::new(),
        };
        element.validate().map_err(|e| e.locate(&kind.locator()))?;
        element.warnings = element.validate_warnings();
        Ok(element)
    }

    pub fn title(text: impl Into<String>, security: SecurityAttributes, ctx: &ValidationContext) -> Result<Self> {
        Self::new(TextKind::Title, text, security, ctx)
    }

    fn validate(&self) -> Result<()> {
        if self.kind == TextKind::Title && self.text.trim().is_empty() {
            return Err(DdmsError::invalid("A ddms:title must have a non-empty value."));
        }
        self.security.require_marking()
    }

    fn validate_warnings(&self) -> Vec<ValidationMessage> {
        if self.kind != TextKind::Title && self.text.trim().is_empty() {
            vec![ValidationMessage::warning(
                format!("A ddms:{} element was found with no value.", self.kind.local_name()),
                self.kind.locator(),
            )]
        } else {
            Vec::new()
        }
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for TextElement {
    fn name(&self) -> &str {
        self.kind.local_name()
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, self.kind.local_name(), suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, base.clone(), &self.text);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, self.kind.local_name());
        self.security.add_to(&mut element, self.version);
        element.append_text(self.text.clone());
        element
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElementBuilder {
    pub kind: TextKind,
    pub text: String,
    pub security: SecurityAttributesBuilder,
}

impl TextElementBuilder {
    pub fn new(kind: TextKind) -> Self {
        Self {
            kind,
            text: String::new(),
            security: SecurityAttributesBuilder::default(),
        }
    }
}

impl Default for TextElementBuilder {
    fn default() -> Self {
        Self::new(TextKind::Title)
    }
}

impl Builder for TextElementBuilder {
    type Output = TextElement;

    fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<TextElement>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self
            .security
            .build(ctx)
            .map_err(|e| e.locate(&self.kind.locator()))?;
        TextElement::new(self.kind, &self.text, security, ctx).map(Some)
    }
}

impl From<&TextElement> for TextElementBuilder {
    fn from(element: &TextElement) -> Self {
        Self {
            kind: element.kind,
            text: element.text.clone(),
            security: SecurityAttributesBuilder::from(&element.security),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SecurityField;
    use crate::component::RenderFormat;
    use crate::test_support::{ctx, unclassified, xmlns};

    #[test]
    fn test_from_xml_reads_kind_and_markings() {
        for version in SchemaVersion::ALL {
            let xml = format!(
                r#"<ddms:subtitle {} ism:classification="U" ism:ownerProducer="USA">Version 0.1</ddms:subtitle>"#,
                xmlns(version)
            );
            let element = XmlElement::parse(&xml).unwrap();
            let subtitle = TextElement::from_xml(&element, &ctx(version)).unwrap();
            assert_eq!(subtitle.kind(), TextKind::Subtitle);
            assert_eq!(subtitle.text(), "Version 0.1");
            assert_eq!(subtitle.security().classification(), Some("U"));
            assert!(subtitle.warnings().is_empty());
        }
    }

    #[test]
    fn test_title_requires_text_and_markings() {
        let ctx = ctx(SchemaVersion::V4_1);
        let err = TextElement::title("", unclassified(&ctx), &ctx).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:title"));

        let err = TextElement::title("DDMSence", SecurityAttributes::default(), &ctx).unwrap_err();
        assert_eq!(err.message(), "classification is required.");
        assert_eq!(err.to_string(), "classification is required. (at /ddms:title)");
    }

    #[test]
    fn test_empty_description_warns() {
        let ctx = ctx(SchemaVersion::V3_1);
        let description =
            TextElement::new(TextKind::Description, "", unclassified(&ctx), &ctx).unwrap();
        assert_eq!(description.warnings().len(), 1);
        assert_eq!(description.warnings()[0].locator, "/ddms:description");
        assert_eq!(
            description.warnings()[0].text,
            "A ddms:description element was found with no value."
        );
    }

    #[test]
    fn test_renderers_share_pairs() {
        let ctx = ctx(SchemaVersion::V4_1);
        let title = TextElement::title("DDMSence", unclassified(&ctx), &ctx).unwrap();
        assert_eq!(
            title.render(RenderFormat::Text),
            "title: DDMSence\ntitle.classification: U\ntitle.ownerProducer: USA\n"
        );
        assert_eq!(
            title.render(RenderFormat::Html),
            "<meta name=\"title\" content=\"DDMSence\" />\n\
             <meta name=\"title.classification\" content=\"U\" />\n\
             <meta name=\"title.ownerProducer\" content=\"USA\" />\n"
        );
    }

    #[test]
    fn test_xml_round_trip() {
        let ctx = ctx(SchemaVersion::V4_1);
        let title = TextElement::title("A & B", unclassified(&ctx), &ctx).unwrap();
        let xml = title.to_xml_string();
        assert!(xml.starts_with("<ddms:title xmlns:ddms="));
        let reparsed = TextElement::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx).unwrap();
        assert_eq!(reparsed, title);
    }

    #[test]
    fn test_builder() {
        let ctx = ctx(SchemaVersion::V2_0);
        assert_eq!(TextElementBuilder::new(TextKind::Subtitle).commit(&ctx).unwrap(), None);

        let mut builder = TextElementBuilder::new(TextKind::Title);
        builder.text = "DDMSence".to_string();
        builder.security.set(SecurityField::Classification, "U");
        let err = builder.commit(&ctx).unwrap_err();
        assert_eq!(err.message(), "At least 1 ownerProducer must be set.");

        builder.security.set(SecurityField::OwnerProducer, "USA");
        let title = builder.commit(&ctx).unwrap().unwrap();
        assert_eq!(TextElementBuilder::from(&title).commit(&ctx).unwrap(), Some(title));
    }
}
