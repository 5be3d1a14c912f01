//! ISM attribute groups.
//!
//! An attribute group is a bag of optional string fields living in the ISM
//! namespace. Each field carries a small static description (its kind, the
//! controlled vocabulary it draws from, the versions it is legal in) and
//! validation walks those descriptions instead of hard-coding one check per
//! field. Values are kept verbatim so that rendering is byte-stable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::component::{Builder, OutputPair, VersionRange, parse_bool};
use crate::context::ValidationContext;
use crate::datetime::validate_date;
use crate::error::{DdmsError, Result};
use crate::version::{ISM_PREFIX, SchemaVersion};
use crate::vocabulary;
use crate::xml::{XmlAttribute, XmlElement};

const MAX_NOTICE_TEXT: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Token,
    Tokens,
    Date,
    Boolean,
}

/// Static description of one attribute.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub vocabulary: Option<&'static str>,
    pub legal: VersionRange,
    pub max_length: Option<usize>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            vocabulary: None,
            legal: VersionRange::ALL,
            max_length: None,
        }
    }

    const fn vocabulary(mut self, key: &'static str) -> Self {
        self.vocabulary = Some(key);
        self
    }

    const fn legal(mut self, range: VersionRange) -> Self {
        self.legal = range;
        self
    }

    const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

pub trait AttributeField: Copy + Ord + fmt::Debug + 'static {
    /// Every field, in validation and output order.
    const ALL: &'static [Self];

    fn spec(self) -> FieldSpec;

    fn name(self) -> &'static str {
        self.spec().name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityField {
    AtomicEnergyMarkings,
    Classification,
    ClassificationReason,
    ClassifiedBy,
    CompilationReason,
    CompliesWith,
    DateOfExemptedSource,
    DeclassDate,
    DeclassEvent,
    DeclassException,
    DeclassManualReview,
    DerivativelyClassifiedBy,
    DerivedFrom,
    DisplayOnlyTo,
    DisseminationControls,
    FgiSourceOpen,
    FgiSourceProtected,
    NonIcMarkings,
    NonUsControls,
    OwnerProducer,
    ReleasableTo,
    SarIdentifier,
    SciControls,
    TypeOfExemptedSource,
}

impl AttributeField for SecurityField {
    const ALL: &'static [Self] = &[
        SecurityField::AtomicEnergyMarkings,
        SecurityField::Classification,
        SecurityField::ClassificationReason,
        SecurityField::ClassifiedBy,
        SecurityField::CompilationReason,
        SecurityField::CompliesWith,
        SecurityField::DateOfExemptedSource,
        SecurityField::DeclassDate,
        SecurityField::DeclassEvent,
        SecurityField::DeclassException,
        SecurityField::DeclassManualReview,
        SecurityField::DerivativelyClassifiedBy,
        SecurityField::DerivedFrom,
        SecurityField::DisplayOnlyTo,
        SecurityField::DisseminationControls,
        SecurityField::FgiSourceOpen,
        SecurityField::FgiSourceProtected,
        SecurityField::NonIcMarkings,
        SecurityField::NonUsControls,
        SecurityField::OwnerProducer,
        SecurityField::ReleasableTo,
        SecurityField::SarIdentifier,
        SecurityField::SciControls,
        SecurityField::TypeOfExemptedSource,
    ];

    fn spec(self) -> FieldSpec {
        use FieldKind::*;
        use SchemaVersion::*;
        match self {
            SecurityField::AtomicEnergyMarkings => FieldSpec::new("atomicEnergyMarkings", Tokens)
                .vocabulary(vocabulary::ATOMIC_ENERGY_MARKINGS)
                .legal(VersionRange::since(V4_0_1)),
            SecurityField::Classification => FieldSpec::new("classification", Token)
                .vocabulary(vocabulary::CLASSIFICATION_ALL),
            SecurityField::ClassificationReason => FieldSpec::new("classificationReason", Text),
            SecurityField::ClassifiedBy => FieldSpec::new("classifiedBy", Text),
            SecurityField::CompilationReason => {
                FieldSpec::new("compilationReason", Text).legal(VersionRange::since(V3_0))
            }
            SecurityField::CompliesWith => FieldSpec::new("compliesWith", Tokens)
                .vocabulary(vocabulary::COMPLIES_WITH)
                .legal(VersionRange::since(V3_1)),
            SecurityField::DateOfExemptedSource => {
                FieldSpec::new("dateOfExemptedSource", Date).legal(VersionRange::until(V3_0))
            }
            SecurityField::DeclassDate => FieldSpec::new("declassDate", Date),
            SecurityField::DeclassEvent => FieldSpec::new("declassEvent", Text),
            SecurityField::DeclassException => FieldSpec::new("declassException", Token)
                .vocabulary(vocabulary::DECLASS_EXCEPTION),
            SecurityField::DeclassManualReview => {
                FieldSpec::new("declassManualReview", Boolean).legal(VersionRange::only(V2_0))
            }
            SecurityField::DerivativelyClassifiedBy => {
                FieldSpec::new("derivativelyClassifiedBy", Text)
            }
            SecurityField::DerivedFrom => FieldSpec::new("derivedFrom", Text),
            SecurityField::DisplayOnlyTo => FieldSpec::new("displayOnlyTo", Tokens)
                .vocabulary(vocabulary::DISPLAY_ONLY_TO)
                .legal(VersionRange::since(V4_0_1)),
            SecurityField::DisseminationControls => FieldSpec::new("disseminationControls", Tokens)
                .vocabulary(vocabulary::DISSEMINATION_CONTROLS),
            SecurityField::FgiSourceOpen => {
                FieldSpec::new("FGIsourceOpen", Tokens).vocabulary(vocabulary::FGI_SOURCE_OPEN)
            }
            SecurityField::FgiSourceProtected => FieldSpec::new("FGIsourceProtected", Tokens)
                .vocabulary(vocabulary::FGI_SOURCE_PROTECTED),
            SecurityField::NonIcMarkings => {
                FieldSpec::new("nonICmarkings", Tokens).vocabulary(vocabulary::NON_IC_MARKINGS)
            }
            SecurityField::NonUsControls => FieldSpec::new("nonUSControls", Tokens)
                .vocabulary(vocabulary::NON_US_CONTROLS)
                .legal(VersionRange::since(V4_0_1)),
            SecurityField::OwnerProducer => {
                FieldSpec::new("ownerProducer", Tokens).vocabulary(vocabulary::OWNER_PRODUCER)
            }
            SecurityField::ReleasableTo => {
                FieldSpec::new("releasableTo", Tokens).vocabulary(vocabulary::RELEASABLE_TO)
            }
            SecurityField::SarIdentifier => {
                FieldSpec::new("SARIdentifier", Tokens).vocabulary(vocabulary::SAR_IDENTIFIER)
            }
            SecurityField::SciControls => {
                FieldSpec::new("SCIcontrols", Tokens).vocabulary(vocabulary::SCI_CONTROLS)
            }
            SecurityField::TypeOfExemptedSource => FieldSpec::new("typeOfExemptedSource", Token)
                .vocabulary(vocabulary::SOURCE_MARKED)
                .legal(VersionRange::until(V3_0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeField {
    NoticeType,
    NoticeReason,
    NoticeDate,
    UnregisteredNoticeType,
    ExternalNotice,
}

impl AttributeField for NoticeField {
    const ALL: &'static [Self] = &[
        NoticeField::NoticeType,
        NoticeField::NoticeReason,
        NoticeField::NoticeDate,
        NoticeField::UnregisteredNoticeType,
        NoticeField::ExternalNotice,
    ];

    fn spec(self) -> FieldSpec {
        use FieldKind::*;
        use SchemaVersion::*;
        let notice = VersionRange::since(V4_0_1);
        match self {
            NoticeField::NoticeType => FieldSpec::new("noticeType", Token)
                .vocabulary(vocabulary::NOTICE)
                .legal(notice),
            NoticeField::NoticeReason => FieldSpec::new("noticeReason", Text)
                .legal(notice)
                .max_length(MAX_NOTICE_TEXT),
            NoticeField::NoticeDate => FieldSpec::new("noticeDate", Date).legal(notice),
            NoticeField::UnregisteredNoticeType => FieldSpec::new("unregisteredNoticeType", Text)
                .legal(notice)
                .max_length(MAX_NOTICE_TEXT),
            NoticeField::ExternalNotice => {
                FieldSpec::new("externalNotice", Boolean).legal(VersionRange::since(V4_1))
            }
        }
    }
}

/// A validated set of ISM attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup<F: AttributeField> {
    values: BTreeMap<F, String>,
}

pub type SecurityAttributes = AttributeGroup<SecurityField>;
pub type NoticeAttributes = AttributeGroup<NoticeField>;

impl<F: AttributeField> Default for AttributeGroup<F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<F: AttributeField> AttributeGroup<F> {
    /// Read the group off `element`'s ISM attributes.
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let namespace = ctx.ism_namespace();
        let values = F::ALL
            .iter()
            .filter_map(|&field| {
                element
                    .attribute(namespace, field.name())
                    .map(|value| (field, value.to_string()))
            })
            .collect::<Vec<_>>();
        Self::new(values, ctx)
    }

    /// Build from raw values. Blank values are treated as absent.
    pub fn new(
        values: impl IntoIterator<Item = (F, String)>,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let group = Self {
            values: values
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .collect(),
        };
        group.validate(ctx)?;
        Ok(group)
    }

    /// Gates first, then vocabularies, then formats.
    pub fn validate(&self, ctx: &ValidationContext) -> Result<()> {
        let version = ctx.version();
        for field in self.values.keys() {
            let spec = field.spec();
            spec.legal.check("attribute", spec.name, version)?;
        }
        for (field, value) in &self.values {
            let spec = field.spec();
            match (spec.kind, spec.vocabulary) {
                (FieldKind::Token, Some(key)) => ctx.validate_token(key, value)?,
                (FieldKind::Tokens, Some(key)) => ctx.validate_tokens(key, value)?,
                _ => {}
            }
        }
        for (field, value) in &self.values {
            let spec = field.spec();
            match spec.kind {
                FieldKind::Date => validate_date(value, spec.name)?,
                FieldKind::Boolean => {
                    parse_bool(value, spec.name)?;
                }
                _ => {}
            }
            if let Some(max) = spec.max_length
                && value.chars().count() > max
            {
                return Err(DdmsError::invalid(format!(
                    "The {} attribute must be shorter than {} characters.",
                    spec.name, max
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Space-delimited tokens of a list field.
    pub fn tokens(&self, field: F) -> Vec<&str> {
        self.get(field)
            .map(|v| v.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Boolean field value; unparseable values were rejected at construction.
    pub fn flag(&self, field: F) -> Option<bool> {
        self.get(field)
            .and_then(|v| parse_bool(v, field.name()).ok().flatten())
    }

    pub fn has(&self, local: &str) -> bool {
        self.values.keys().any(|f| f.name() == local)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        F::ALL.iter().map(|f| f.name())
    }

    pub fn add_to(&self, element: &mut XmlElement, version: SchemaVersion) {
        for (field, value) in &self.values {
            element.add_attribute(ISM_PREFIX, version.ism_namespace(), field.name(), value.clone());
        }
    }

    /// Pairs named `<prefix><field>`.
    pub fn output_pairs(&self, prefix: &str) -> Vec<OutputPair> {
        self.values
            .iter()
            .map(|(field, value)| OutputPair::new(format!("{}{}", prefix, field.name()), value))
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = (F, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

impl AttributeGroup<SecurityField> {
    /// Classification plus at least one owner/producer, for elements that must be marked.
    pub fn require_marking(&self) -> Result<()> {
        if self.get(SecurityField::Classification).is_none() {
            return Err(DdmsError::invalid("classification is required."));
        }
        if self.tokens(SecurityField::OwnerProducer).is_empty() {
            return Err(DdmsError::invalid("At least 1 ownerProducer must be set."));
        }
        Ok(())
    }

    /// Elements that only accept markings from `since` onward.
    pub fn check_legal_since(&self, since: SchemaVersion, version: SchemaVersion) -> Result<()> {
        if !self.is_empty() && version < since {
            return Err(DdmsError::invalid(format!(
                "Security attributes cannot be applied to this component until DDMS {} or later.",
                since
            )));
        }
        Ok(())
    }

    pub fn classification(&self) -> Option<&str> {
        self.get(SecurityField::Classification)
    }

    pub fn owner_producers(&self) -> Vec<&str> {
        self.tokens(SecurityField::OwnerProducer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroupBuilder<F: AttributeField> {
    values: BTreeMap<F, String>,
}

pub type SecurityAttributesBuilder = AttributeGroupBuilder<SecurityField>;
pub type NoticeAttributesBuilder = AttributeGroupBuilder<NoticeField>;

impl<F: AttributeField> Default for AttributeGroupBuilder<F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<F: AttributeField> AttributeGroupBuilder<F> {
    pub fn set(&mut self, field: F, value: impl Into<String>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: F) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// The group, possibly empty.
    pub fn build(&self, ctx: &ValidationContext) -> Result<AttributeGroup<F>> {
        AttributeGroup::new(self.values.clone(), ctx)
    }
}

impl<F: AttributeField> Builder for AttributeGroupBuilder<F> {
    type Output = AttributeGroup<F>;

    fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<AttributeGroup<F>>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.build(ctx).map(Some)
    }
}

impl<F: AttributeField> From<&AttributeGroup<F>> for AttributeGroupBuilder<F> {
    fn from(group: &AttributeGroup<F>) -> Self {
        Self {
            values: group.values.clone(),
        }
    }
}

/// Foreign-namespace attributes carried on the resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensibleAttributes {
    attributes: Vec<XmlAttribute>,
}

impl ExtensibleAttributes {
    /// Every namespaced attribute of `element` outside `reserved`.
    pub fn from_xml(element: &XmlElement, reserved: &[&str]) -> Result<Self> {
        let attributes = element
            .attributes()
            .iter()
            .filter(|a| !a.namespace.is_empty() && !reserved.contains(&a.namespace.as_str()))
            .cloned()
            .collect();
        Self::new(attributes)
    }

    pub fn new(attributes: Vec<XmlAttribute>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for attribute in &attributes {
            if attribute.local.is_empty() || attribute.namespace.is_empty() {
                return Err(DdmsError::invalid(
                    "Extensible attributes must have a namespace and a local name.",
                ));
            }
            if !seen.insert((attribute.namespace.as_str(), attribute.local.as_str())) {
                return Err(DdmsError::invalid(format!(
                    "The extensible attribute {} is defined more than once.",
                    attribute.qualified_name()
                )));
            }
        }
        Ok(Self { attributes })
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Whether any attribute is `{namespace}local`.
    pub fn contains(&self, namespace: &str, local: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.namespace == namespace && a.local == local)
    }

    pub fn add_to(&self, element: &mut XmlElement) {
        for attribute in &self.attributes {
            element.push_attribute(attribute.clone());
        }
    }

    pub fn output_pairs(&self, prefix: &str) -> Vec<OutputPair> {
        self.attributes
            .iter()
            .map(|a| {
                OutputPair::new(
                    format!("{}extensible.attribute.{}", prefix, a.qualified_name()),
                    &a.value,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;
    use SchemaVersion::*;

    fn security(version: SchemaVersion, values: &[(SecurityField, &str)]) -> Result<SecurityAttributes> {
        SecurityAttributes::new(
            values.iter().map(|(f, v)| (*f, v.to_string())),
            &ctx(version),
        )
    }

    #[test]
    fn test_valid_markings_in_every_version() {
        for version in SchemaVersion::ALL {
            let attrs = security(
                version,
                &[
                    (SecurityField::Classification, "U"),
                    (SecurityField::OwnerProducer, "USA AUS"),
                ],
            )
            .unwrap();
            attrs.require_marking().unwrap();
            assert_eq!(attrs.owner_producers(), vec!["USA", "AUS"]);
        }
    }

    #[test]
    fn test_version_gates() {
        let err = security(V3_0, &[(SecurityField::CompliesWith, "USGov")]).unwrap_err();
        assert_eq!(
            err.message(),
            "The compliesWith attribute cannot be used until DDMS 3.1 or later."
        );
        security(V3_1, &[(SecurityField::CompliesWith, "USGov")]).unwrap();

        let err = security(V3_1, &[(SecurityField::TypeOfExemptedSource, "X1")]).unwrap_err();
        assert_eq!(
            err.message(),
            "The typeOfExemptedSource attribute can only be used in DDMS 3.0 or earlier."
        );
        security(V2_0, &[(SecurityField::TypeOfExemptedSource, "X1")]).unwrap();

        assert!(security(V3_0, &[(SecurityField::DeclassManualReview, "true")]).is_err());
        security(V2_0, &[(SecurityField::DeclassManualReview, "true")]).unwrap();
        assert!(security(V2_0, &[(SecurityField::CompilationReason, "why")]).is_err());
        assert!(security(V3_1, &[(SecurityField::AtomicEnergyMarkings, "RD")]).is_err());
        security(V4_0_1, &[(SecurityField::AtomicEnergyMarkings, "RD CNWDI")]).unwrap();
    }

    #[test]
    fn test_gates_checked_before_vocabularies() {
        let err = security(
            V3_0,
            &[
                (SecurityField::Classification, "bogus"),
                (SecurityField::CompliesWith, "USGov"),
            ],
        )
        .unwrap_err();
        assert!(err.message().contains("compliesWith"));
    }

    #[test]
    fn test_vocabulary_literal_and_pattern() {
        security(V4_1, &[(SecurityField::SarIdentifier, "SAR-ABC SAR-XY")]).unwrap();
        let err = security(V4_1, &[(SecurityField::SarIdentifier, "SAR-ABCD")]).unwrap_err();
        assert!(err.message().contains("CVEnumISMSAR"));

        security(V4_1, &[(SecurityField::SciControls, "SI-G-ABCD HCS")]).unwrap();
        assert!(security(V4_1, &[(SecurityField::SciControls, "SI-G-AB")]).is_err());
        assert!(security(V4_1, &[(SecurityField::Classification, "Z")]).is_err());
    }

    #[test]
    fn test_date_and_boolean_formats() {
        security(V4_1, &[(SecurityField::DeclassDate, "2050-01-01")]).unwrap();
        let err = security(V4_1, &[(SecurityField::DeclassDate, "someday")]).unwrap_err();
        assert_eq!(
            err.message(),
            "The declassDate value (someday) is not in a valid date format."
        );
        assert!(security(V2_0, &[(SecurityField::DeclassManualReview, "maybe")]).is_err());
    }

    #[test]
    fn test_require_marking() {
        let attrs = security(V4_1, &[(SecurityField::OwnerProducer, "USA")]).unwrap();
        assert_eq!(
            attrs.require_marking().unwrap_err().message(),
            "classification is required."
        );
        let attrs = security(V4_1, &[(SecurityField::Classification, "U")]).unwrap();
        assert_eq!(
            attrs.require_marking().unwrap_err().message(),
            "At least 1 ownerProducer must be set."
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let attrs = security(V4_1, &[(SecurityField::Classification, "")]).unwrap();
        assert!(attrs.is_empty());
        assert!(SecurityAttributesBuilder::default().is_empty());
        assert!(SecurityAttributesBuilder::default()
            .with(SecurityField::ClassifiedBy, "  ")
            .is_empty());
    }

    #[test]
    fn test_from_xml_reads_version_namespace() {
        let ctx = ctx(V2_0);
        let element = XmlElement::new("ddms", V2_0.ddms_namespace(), "title")
            .with_attribute("ism", V2_0.ism_namespace(), "classification", "U")
            .with_attribute("ism", V3_0.ism_namespace(), "ownerProducer", "USA");
        let attrs = SecurityAttributes::from_xml(&element, &ctx).unwrap();
        assert_eq!(attrs.classification(), Some("U"));
        assert!(attrs.owner_producers().is_empty(), "wrong ISM namespace is ignored");
    }

    #[test]
    fn test_output_and_xml_follow_field_order() {
        let ctx = ctx(V4_1);
        let attrs = SecurityAttributes::new(
            [
                (SecurityField::OwnerProducer, "USA".to_string()),
                (SecurityField::Classification, "U".to_string()),
            ],
            &ctx,
        )
        .unwrap();
        let names: Vec<_> = attrs.output_pairs("title.").into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["title.classification", "title.ownerProducer"]);

        let mut element = XmlElement::new("ddms", V4_1.ddms_namespace(), "title");
        attrs.add_to(&mut element, V4_1);
        let reparsed = SecurityAttributes::from_xml(&element, &ctx).unwrap();
        assert_eq!(reparsed, attrs);
    }

    #[test]
    fn test_builder_commit() {
        let ctx = ctx(V4_1);
        assert_eq!(SecurityAttributesBuilder::default().commit(&ctx).unwrap(), None);
        let builder = SecurityAttributesBuilder::default()
            .with(SecurityField::Classification, "U")
            .with(SecurityField::OwnerProducer, "USA");
        let attrs = builder.commit(&ctx).unwrap().unwrap();
        assert_eq!(SecurityAttributesBuilder::from(&attrs), builder);
        assert!(SecurityAttributesBuilder::default()
            .with(SecurityField::Classification, "nope")
            .commit(&ctx)
            .is_err());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let ctx = ctx(V4_1);
        let blank = SecurityAttributesBuilder::default().with(SecurityField::Classification, "  ");
        assert!(blank.is_empty());
        assert_eq!(blank.commit(&ctx).unwrap(), None);

        let attrs = blank
            .with(SecurityField::OwnerProducer, "USA")
            .commit(&ctx)
            .unwrap()
            .unwrap();
        assert_eq!(attrs.get(SecurityField::Classification), None);
        assert_eq!(attrs.get(SecurityField::OwnerProducer), Some("USA"));
    }

    #[test]
    fn test_notice_attributes() {
        let notice = |version, values: &[(NoticeField, &str)]| {
            NoticeAttributes::new(values.iter().map(|(f, v)| (*f, v.to_string())), &ctx(version))
        };
        notice(
            V4_0_1,
            &[
                (NoticeField::NoticeType, "DoD-Dist-B"),
                (NoticeField::NoticeDate, "2011-09-15"),
            ],
        )
        .unwrap();
        assert!(notice(V3_1, &[(NoticeField::NoticeReason, "x")]).is_err());
        let err = notice(V4_0_1, &[(NoticeField::ExternalNotice, "true")]).unwrap_err();
        assert_eq!(
            err.message(),
            "The externalNotice attribute cannot be used until DDMS 4.1 or later."
        );
        let attrs = notice(V4_1, &[(NoticeField::ExternalNotice, "false")]).unwrap();
        assert_eq!(attrs.flag(NoticeField::ExternalNotice), Some(false));
        assert!(notice(V4_1, &[(NoticeField::NoticeReason, "x".repeat(2049).as_str())]).is_err());
    }

    #[test]
    fn test_extensible_attributes() {
        let element = XmlElement::new("ddms", V4_1.ddms_namespace(), "resource")
            .with_attribute("ism", V4_1.ism_namespace(), "classification", "U")
            .with_attribute("ext", "urn:example", "foo", "bar")
            .with_attribute("", "", "plain", "ignored");
        let attrs = ExtensibleAttributes::from_xml(&element, &[V4_1.ism_namespace()]).unwrap();
        assert_eq!(attrs.attributes().len(), 1);
        assert!(attrs.contains("urn:example", "foo"));

        let duplicate = ExtensibleAttributes::new(vec![
            XmlAttribute::new("a", "urn:example", "foo", "1"),
            XmlAttribute::new("b", "urn:example", "foo", "2"),
        ]);
        assert!(duplicate.is_err());
    }
}
