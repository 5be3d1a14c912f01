use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, ddms_element, expect_element, push_pair,
    require_uri, require_value,
};
use crate::context::ValidationContext;
use crate::error::{Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "identifier";

/// `ddms:identifier`: a qualifier URI plus a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    version: SchemaVersion,
    qualifier: String,
    value: String,
}

impl Identifier {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate("/ddms:identifier"))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "value"),
            ctx,
        )
    }

    pub fn new(qualifier: impl Into<String>, value: impl Into<String>, ctx: &ValidationContext) -> Result<Self> {
        let identifier = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            value: value.into(),
        };
        identifier
            .validate()
            .map_err(|e| e.locate("/ddms:identifier"))?;
        Ok(identifier)
    }

    fn validate(&self) -> Result<()> {
        require_uri(&self.qualifier, "qualifier attribute")?;
        require_value(&self.value, "value attribute")
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Identifier {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        push_pair(&mut pairs, format!("{}.value", base), &self.value);
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut element, self.version, "value", &self.value);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierBuilder {
    pub qualifier: String,
    pub value: String,
}

impl Builder for IdentifierBuilder {
    type Output = Identifier;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Identifier>> {
        if self.is_empty() {
            return Ok(None);
        }
        Identifier::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(identifier: &Identifier) -> Self {
        Self {
            qualifier: identifier.qualifier.clone(),
            value: identifier.value.clone(),
        }
    }
}
