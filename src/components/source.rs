use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, ddms_element, expect_element, push_pair,
    require_uri,
};
use crate::context::ValidationContext;
use crate::error::{Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "source";
const LOCATOR: &str = "/ddms:source";
const ATTRIBUTES: [&str; 4] = ["qualifier", "value", "schemaQualifier", "schemaHref"];

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    version: SchemaVersion,
    /// qualifier, value, schemaQualifier, schemaHref
    values: [String; 4],
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl Source {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(LOCATOR))?;
        let [qualifier, value, schema_qualifier, schema_href] =
            ATTRIBUTES.map(|name| element.attribute_value(ns, name));
        Self::new(qualifier, value, schema_qualifier, schema_href, security, ctx)
    }

    pub fn new(
        qualifier: impl Into<String>,
        value: impl Into<String>,
        schema_qualifier: impl Into<String>,
        schema_href: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut source = Self {
            version: ctx.version(),
            values: [
                qualifier.into(),
                value.into(),
                schema_qualifier.into(),
                schema_href.into(),
            ],
            security,
            warnings: Vec::new(),
        };
        source.validate().map_err(|e| e.locate(LOCATOR))?;
        if source.values.iter().all(String::is_empty) {
            source.warnings.push(ValidationMessage::warning(
                "A completely empty ddms:source element was found.",
                LOCATOR,
            ));
        }
        Ok(source)
    }

    fn validate(&self) -> Result<()> {
        if !self.schema_href().is_empty() {
            require_uri(self.schema_href(), "schemaHref attribute")?;
        }
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    pub fn qualifier(&self) -> &str {
        &self.values[0]
    }

    pub fn value(&self) -> &str {
        &self.values[1]
    }

    pub fn schema_qualifier(&self) -> &str {
        &self.values[2]
    }

    pub fn schema_href(&self) -> &str {
        &self.values[3]
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for Source {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let mut pairs = Vec::new();
        for (name, value) in ATTRIBUTES.iter().zip(&self.values) {
            push_pair(&mut pairs, format!("{}.{}", base, name), value);
        }
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        for (name, value) in ATTRIBUTES.iter().zip(&self.values) {
            add_ddms_attribute(&mut element, self.version, name, value);
        }
        self.security.add_to(&mut element, self.version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuilder {
    pub qualifier: String,
    pub value: String,
    pub schema_qualifier: String,
    pub schema_href: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for SourceBuilder {
    type Output = Source;

    fn is_empty(&self) -> bool {
        [&self.qualifier, &self.value, &self.schema_qualifier, &self.schema_href]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Source>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate(LOCATOR))?;
        Source::new(
            &self.qualifier,
            &self.value,
            &self.schema_qualifier,
            &self.schema_href,
            security,
            ctx,
        )
        .map(Some)
    }
}

impl From<&Source> for SourceBuilder {
    fn from(source: &Source) -> Self {
        Self {
            qualifier: source.qualifier().to_string(),
            value: source.value().to_string(),
            schema_qualifier: source.schema_qualifier().to_string(),
            schema_href: source.schema_href().to_string(),
            security: SecurityAttributesBuilder::from(&source.security),
        }
    }
}
