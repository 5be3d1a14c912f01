use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, ddms_element, expect_element, push_pair,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "language";
const LOCATOR: &str = "/ddms:language";

#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    version: SchemaVersion,
    qualifier: String,
    value: String,
    warnings: Vec<ValidationMessage>,
}

impl Language {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "value"),
            ctx,
        )
    }

    pub fn new(qualifier: impl Into<String>, value: impl Into<String>, ctx: &ValidationContext) -> Result<Self> {
        let mut language = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            value: value.into(),
            warnings: Vec::new(),
        };
        if !language.value.is_empty() && language.qualifier.is_empty() {
            return Err(DdmsError::invalid("A qualifier must exist when a value is set.").locate(LOCATOR));
        }
        if language.qualifier.is_empty() && language.value.is_empty() {
            language.warnings.push(ValidationMessage::warning(
                "Neither a qualifier nor a value was set on this language.",
                LOCATOR,
            ));
        } else if language.value.is_empty() {
            language.warnings.push(ValidationMessage::warning(
                "A qualifier has been set without an accompanying value attribute.",
                LOCATOR,
            ));
        }
        Ok(language)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Language {
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
pub struct LanguageBuilder {
    pub qualifier: String,
    pub value: String,
}

impl Builder for LanguageBuilder {
    type Output = Language;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Language>> {
        if self.is_empty() {
            return Ok(None);
        }
        Language::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

impl From<&Language> for LanguageBuilder {
    fn from(language: &Language) -> Self {
        Self {
            qualifier: language.qualifier.clone(),
            value: language.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    #[test]
    fn test_value_needs_qualifier() {
        let ctx = ctx(SchemaVersion::V4_1);
        let err = Language::new("", "en", &ctx).unwrap_err();
        assert_eq!(err.message(), "A qualifier must exist when a value is set.");
        assert_eq!(err.locator(), Some(LOCATOR));
    }

    #[test]
    fn test_warnings() {
        let ctx = ctx(SchemaVersion::V3_0);
        assert!(Language::new("ISO 639-1", "en", &ctx).unwrap().warnings().is_empty());
        let language = Language::new("ISO 639-1", "", &ctx).unwrap();
        assert_eq!(
            language.warnings()[0].text,
            "A qualifier has been set without an accompanying value attribute."
        );
        let language = Language::new("", "", &ctx).unwrap();
        assert_eq!(language.warnings().len(), 1);
    }

    #[test]
    fn test_xml_round_trip() {
        let ctx = ctx(SchemaVersion::V2_0);
        let language = Language::new("ISO 639-1", "en", &ctx).unwrap();
        let element = XmlElement::parse(&language.to_xml_string()).unwrap();
        assert_eq!(Language::from_xml(&element, &ctx).unwrap(), language);
    }

    #[test]
    fn test_builder_round_trip() {
        let ctx = ctx(SchemaVersion::V4_0_1);
        let language = Language::new("ISO 639-1", "en", &ctx).unwrap();
        assert_eq!(LanguageBuilder::from(&language).commit(&ctx).unwrap(), Some(language));
        assert_eq!(LanguageBuilder::default().commit(&ctx).unwrap(), None);
    }
}
