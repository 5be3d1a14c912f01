use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, ddms_element, expect_element, push_pair,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "type";
const LOCATOR: &str = "/ddms:type";

/// `ddms:type`: a qualified value describing the kind of resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    version: SchemaVersion,
    qualifier: String,
    value: String,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl Type {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(LOCATOR))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "value"),
            security,
            ctx,
        )
    }

    pub fn new(
        qualifier: impl Into<String>,
        value: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut type_ = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            value: value.into(),
            security,
            warnings: Vec::new(),
        };
        type_.validate().map_err(|e| e.locate(LOCATOR))?;
        if type_.qualifier.is_empty() && type_.value.is_empty() {
            type_.warnings.push(ValidationMessage::warning(
                "A completely empty ddms:type element was found.",
                LOCATOR,
            ));
        }
        Ok(type_)
    }

    fn validate(&self) -> Result<()> {
        if !self.value.is_empty() && self.qualifier.is_empty() {
            return Err(DdmsError::invalid("A qualifier must exist when a value is set."));
        }
        self.security.check_legal_since(SchemaVersion::V4_0_1, self.version)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for Type {
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
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        push_pair(&mut pairs, format!("{}.value", base), &self.value);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut element, self.version, "value", &self.value);
        self.security.add_to(&mut element, self.version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBuilder {
    pub qualifier: String,
    pub value: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for TypeBuilder {
    type Output = Type;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Type>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate(LOCATOR))?;
        Type::new(&self.qualifier, &self.value, security, ctx).map(Some)
    }
}

impl From<&Type> for TypeBuilder {
    fn from(type_: &Type) -> Self {
        Self {
            qualifier: type_.qualifier.clone(),
            value: type_.value.clone(),
            security: SecurityAttributesBuilder::from(&type_.security),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, unclassified};

    const QUALIFIER: &str = "DCMITYPE";
    const VALUE: &str = "http://purl.org/dc/dcmitype/Text";

    #[test]
    fn test_value_needs_qualifier() {
        let ctx = ctx(SchemaVersion::V3_1);
        let err = Type::new("", VALUE, SecurityAttributes::default(), &ctx).unwrap_err();
        assert_eq!(err.message(), "A qualifier must exist when a value is set.");
    }

    #[test]
    fn test_markings_need_ddms_4() {
        let marked = unclassified(&ctx(SchemaVersion::V4_1));
        assert!(Type::new(QUALIFIER, VALUE, marked.clone(), &ctx(SchemaVersion::V3_1)).is_err());
        Type::new(QUALIFIER, VALUE, marked, &ctx(SchemaVersion::V4_0_1)).unwrap();
    }

    #[test]
    fn test_round_trips() {
        let ctx = ctx(SchemaVersion::V4_1);
        let type_ = Type::new(QUALIFIER, VALUE, unclassified(&ctx), &ctx).unwrap();
        let reparsed = Type::from_xml(&XmlElement::parse(&type_.to_xml_string()).unwrap(), &ctx).unwrap();
        assert_eq!(reparsed, type_);
        assert_eq!(TypeBuilder::from(&type_).commit(&ctx).unwrap(), Some(type_));
    }
}
