//! The resource aggregator.
//!
//! A [`Resource`] owns every top-level component of a DDMS record as one list of
//! [`ResourceComponent`]s kept in schema order. Construction classifies the list
//! into slots, applies the per-version cardinality table, checks the `order`
//! sequence shared by geospatial coverage and non-state actors, then checks the
//! resource-level ISM and NTK attributes. Raw construction additionally hands the
//! rendered record to the configured schema validator.

use std::collections::HashMap;

use tracing::debug;

use crate::attributes::{
    ExtensibleAttributes, NoticeAttributes, NoticeAttributesBuilder, SecurityAttributes,
    SecurityAttributesBuilder,
};
use crate::component::{
    Builder, Component, OccurrenceRule, OutputPair, VersionRange, all_empty, child_warnings,
    commit_all, ddms_element, expect_element, list_suffix, parse_bool, push_pair,
};
use crate::components::{
    Dates, DatesBuilder, ExtensibleElement, ExtensibleElementBuilder, Format, FormatBuilder,
    GeospatialCoverage, GeospatialCoverageBuilder, Identifier, IdentifierBuilder, Language,
    LanguageBuilder, NonStateActor, ProducerKind, ProducerRole, ProducerRoleBuilder,
    RelatedResource, RelatedResourceBuilder, Rights, RightsBuilder, Security, SecurityBuilder,
    Source, SourceBuilder, SubjectCoverage, SubjectCoverageBuilder, TemporalCoverage,
    TemporalCoverageBuilder, TextElement, TextElementBuilder, TextKind, Type, TypeBuilder,
    VirtualCoverage, VirtualCoverageBuilder,
};
use crate::context::ValidationContext;
use crate::datetime::validate_date;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::schematron::{SchematronFinding, SchematronRunner};
use crate::version::{ISM_PREFIX, NTK_PREFIX, SchemaVersion};
use crate::xml::{XmlAttribute, XmlElement};

const RESOURCE_ELEMENT: &str = "resourceElement";
const CREATE_DATE: &str = "createDate";
const DES_VERSION: &str = "DESVersion";
const ISM_DES_VERSION: &str = "ism:DESVersion";
const NTK_DES_VERSION: &str = "ntk:DESVersion";
/// Base of the resource's own output pairs, whatever the element is called.
const OUTPUT_NAME: &str = "resource";
const ORDER_MESSAGE: &str =
    "The ddms:order attributes throughout this resource must form a single, ordered list starting from 1.";

/// `Resource` up to DDMS 3.1, `resource` afterwards.
fn element_name(version: SchemaVersion) -> &'static str {
    if version.is_at_least(SchemaVersion::V4_0_1) {
        "resource"
    } else {
        "Resource"
    }
}

fn locator(version: SchemaVersion) -> String {
    format!("/ddms:{}", element_name(version))
}

/// Position of a component family within the resource, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Identifier,
    Title,
    Subtitle,
    Description,
    Language,
    Dates,
    Rights,
    Source,
    Type,
    Producer,
    Format,
    SubjectCoverage,
    VirtualCoverage,
    TemporalCoverage,
    GeospatialCoverage,
    RelatedResource,
    Security,
    Extensible,
}

/// `(slot, rule, first version the rule applies to)`. The newest applicable row wins.
const SLOT_RULES: &[(Slot, OccurrenceRule, SchemaVersion)] = &[
    (Slot::Identifier, OccurrenceRule::ONE_OR_MORE, SchemaVersion::V2_0),
    (Slot::Title, OccurrenceRule::ONE_OR_MORE, SchemaVersion::V2_0),
    (Slot::Subtitle, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::Description, OccurrenceRule::OPTIONAL, SchemaVersion::V2_0),
    (Slot::Language, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::Dates, OccurrenceRule::OPTIONAL, SchemaVersion::V2_0),
    (Slot::Rights, OccurrenceRule::OPTIONAL, SchemaVersion::V2_0),
    (Slot::Source, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::Type, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::Producer, OccurrenceRule::ONE_OR_MORE, SchemaVersion::V2_0),
    (Slot::Format, OccurrenceRule::OPTIONAL, SchemaVersion::V2_0),
    (Slot::SubjectCoverage, OccurrenceRule::EXACTLY_ONE, SchemaVersion::V2_0),
    (Slot::SubjectCoverage, OccurrenceRule::ONE_OR_MORE, SchemaVersion::V4_0_1),
    (Slot::VirtualCoverage, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::TemporalCoverage, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::GeospatialCoverage, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::RelatedResource, OccurrenceRule::ANY, SchemaVersion::V2_0),
    (Slot::Security, OccurrenceRule::EXACTLY_ONE, SchemaVersion::V2_0),
    (Slot::Extensible, OccurrenceRule::OPTIONAL, SchemaVersion::V2_0),
    (Slot::Extensible, OccurrenceRule::ANY, SchemaVersion::V3_0),
];

impl Slot {
    pub const ALL: [Slot; 18] = [
        Slot::Identifier,
        Slot::Title,
        Slot::Subtitle,
        Slot::Description,
        Slot::Language,
        Slot::Dates,
        Slot::Rights,
        Slot::Source,
        Slot::Type,
        Slot::Producer,
        Slot::Format,
        Slot::SubjectCoverage,
        Slot::VirtualCoverage,
        Slot::TemporalCoverage,
        Slot::GeospatialCoverage,
        Slot::RelatedResource,
        Slot::Security,
        Slot::Extensible,
    ];

    /// Name used in cardinality messages.
    pub fn label(self) -> &'static str {
        match self {
            Slot::Identifier => "ddms:identifier",
            Slot::Title => "ddms:title",
            Slot::Subtitle => "ddms:subtitle",
            Slot::Description => "ddms:description",
            Slot::Language => "ddms:language",
            Slot::Dates => "ddms:dates",
            Slot::Rights => "ddms:rights",
            Slot::Source => "ddms:source",
            Slot::Type => "ddms:type",
            Slot::Producer => {
                "producer role (creator, publisher, contributor or pointOfContact)"
            }
            Slot::Format => "ddms:format",
            Slot::SubjectCoverage => "ddms:subjectCoverage",
            Slot::VirtualCoverage => "ddms:virtualCoverage",
            Slot::TemporalCoverage => "ddms:temporalCoverage",
            Slot::GeospatialCoverage => "ddms:geospatialCoverage",
            Slot::RelatedResource => "ddms:relatedResource",
            Slot::Security => "ddms:security",
            Slot::Extensible => "extensible element",
        }
    }

    pub fn rule(self, version: SchemaVersion) -> OccurrenceRule {
        SLOT_RULES
            .iter()
            .filter(|(slot, _, from)| *slot == self && version >= *from)
            .next_back()
            .map(|(_, rule, _)| *rule)
            .unwrap_or(OccurrenceRule::ANY)
    }
}

/// One top-level child of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceComponent {
    Identifier(Identifier),
    Text(TextElement),
    Language(Language),
    Dates(Dates),
    Rights(Rights),
    Source(Source),
    Type(Type),
    Producer(ProducerRole),
    Format(Format),
    SubjectCoverage(SubjectCoverage),
    VirtualCoverage(VirtualCoverage),
    TemporalCoverage(TemporalCoverage),
    GeospatialCoverage(GeospatialCoverage),
    RelatedResource(RelatedResource),
    Security(Security),
    Extensible(ExtensibleElement),
}

macro_rules! resource_component_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for ResourceComponent {
                fn from(component: $ty) -> Self {
                    ResourceComponent::$variant(component)
                }
            }
        )*
    };
}

resource_component_from!(
    Identifier(Identifier),
    Text(TextElement),
    Language(Language),
    Dates(Dates),
    Rights(Rights),
    Source(Source),
    Type(Type),
    Producer(ProducerRole),
    Format(Format),
    SubjectCoverage(SubjectCoverage),
    VirtualCoverage(VirtualCoverage),
    TemporalCoverage(TemporalCoverage),
    GeospatialCoverage(GeospatialCoverage),
    RelatedResource(RelatedResource),
    Security(Security),
    Extensible(ExtensibleElement),
);

impl ResourceComponent {
    pub fn as_component(&self) -> &dyn Component {
        match self {
            ResourceComponent::Identifier(c) => c,
            ResourceComponent::Text(c) => c,
            ResourceComponent::Language(c) => c,
            ResourceComponent::Dates(c) => c,
            ResourceComponent::Rights(c) => c,
            ResourceComponent::Source(c) => c,
            ResourceComponent::Type(c) => c,
            ResourceComponent::Producer(c) => c,
            ResourceComponent::Format(c) => c,
            ResourceComponent::SubjectCoverage(c) => c,
            ResourceComponent::VirtualCoverage(c) => c,
            ResourceComponent::TemporalCoverage(c) => c,
            ResourceComponent::GeospatialCoverage(c) => c,
            ResourceComponent::RelatedResource(c) => c,
            ResourceComponent::Security(c) => c,
            ResourceComponent::Extensible(c) => c,
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            ResourceComponent::Identifier(_) => Slot::Identifier,
            ResourceComponent::Text(text) => match text.kind() {
                TextKind::Title => Slot::Title,
                TextKind::Subtitle => Slot::Subtitle,
                TextKind::Description => Slot::Description,
            },
            ResourceComponent::Language(_) => Slot::Language,
            ResourceComponent::Dates(_) => Slot::Dates,
            ResourceComponent::Rights(_) => Slot::Rights,
            ResourceComponent::Source(_) => Slot::Source,
            ResourceComponent::Type(_) => Slot::Type,
            ResourceComponent::Producer(_) => Slot::Producer,
            ResourceComponent::Format(_) => Slot::Format,
            ResourceComponent::SubjectCoverage(_) => Slot::SubjectCoverage,
            ResourceComponent::VirtualCoverage(_) => Slot::VirtualCoverage,
            ResourceComponent::TemporalCoverage(_) => Slot::TemporalCoverage,
            ResourceComponent::GeospatialCoverage(_) => Slot::GeospatialCoverage,
            ResourceComponent::RelatedResource(_) => Slot::RelatedResource,
            ResourceComponent::Security(_) => Slot::Security,
            ResourceComponent::Extensible(_) => Slot::Extensible,
        }
    }
}

fn parse_des_version(value: &str, name: &str) -> Result<Option<u32>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| DdmsError::invalid(format!("The {} attribute must be an integer.", name)))
}

/// Attributes carried on the resource element itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceAttributes {
    pub resource_element: Option<bool>,
    pub create_date: String,
    pub ism_des_version: Option<u32>,
    pub ntk_des_version: Option<u32>,
    pub security: SecurityAttributes,
    pub notice: NoticeAttributes,
    pub extensible: ExtensibleAttributes,
}

impl ResourceAttributes {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ism = ctx.ism_namespace();
        let ntk = ctx.namespaces().ntk;
        let mut reserved = vec![ctx.ddms_namespace(), ism];
        reserved.extend(ntk);
        let ntk_des_version = match ntk {
            Some(ntk) => parse_des_version(&element.attribute_value(ntk, DES_VERSION), NTK_DES_VERSION)?,
            None => None,
        };
        Ok(Self {
            resource_element: parse_bool(&element.attribute_value(ism, RESOURCE_ELEMENT), RESOURCE_ELEMENT)?,
            create_date: element.attribute_value(ism, CREATE_DATE),
            ism_des_version: parse_des_version(&element.attribute_value(ism, DES_VERSION), ISM_DES_VERSION)?,
            ntk_des_version,
            security: SecurityAttributes::from_xml(element, ctx)?,
            notice: NoticeAttributes::from_xml(element, ctx)?,
            extensible: ExtensibleAttributes::from_xml(element, &reserved)?,
        })
    }

    fn validate(&self, ctx: &ValidationContext) -> Result<()> {
        let version = ctx.version();
        let since_3_0 = VersionRange::since(SchemaVersion::V3_0);
        let gate = |present: bool, name: &str, range: VersionRange| -> Result<()> {
            if present {
                range.check("attribute", name, version)
            } else if range.contains(version) {
                Err(DdmsError::invalid(format!("The {} attribute is required.", name)))
            } else {
                Ok(())
            }
        };
        gate(self.resource_element.is_some(), RESOURCE_ELEMENT, since_3_0)?;
        gate(!self.create_date.is_empty(), CREATE_DATE, since_3_0)?;
        if !self.create_date.is_empty() {
            validate_date(&self.create_date, CREATE_DATE)?;
        }
        gate(self.ism_des_version.is_some(), ISM_DES_VERSION, since_3_0)?;
        gate(
            self.ntk_des_version.is_some(),
            NTK_DES_VERSION,
            VersionRange::since(SchemaVersion::V4_1),
        )?;

        self.security.validate(ctx)?;
        self.notice.validate(ctx)?;
        if since_3_0.contains(version) {
            self.security.require_marking()?;
        } else {
            self.security.check_legal_since(SchemaVersion::V3_0, version)?;
        }
        self.check_shadowing(ctx)
    }

    /// Extensible attributes may not reuse the name of a typed attribute.
    fn check_shadowing(&self, ctx: &ValidationContext) -> Result<()> {
        let ism = ctx.ism_namespace();
        let ntk = ctx.namespaces().ntk;
        for attribute in self.extensible.attributes() {
            let shadows = if attribute.namespace == ism {
                SecurityAttributes::names()
                    .chain(NoticeAttributes::names())
                    .chain([RESOURCE_ELEMENT, CREATE_DATE, DES_VERSION])
                    .any(|name| name == attribute.local)
            } else {
                ntk == Some(attribute.namespace.as_str()) && attribute.local == DES_VERSION
            };
            if shadows {
                return Err(DdmsError::invalid(format!(
                    "The extensible attribute {} has the same name as a typed attribute on the resource.",
                    attribute.qualified_name()
                )));
            }
        }
        Ok(())
    }

    fn add_to(&self, element: &mut XmlElement, version: SchemaVersion) {
        let ism = version.ism_namespace();
        if let Some(flag) = self.resource_element {
            element.add_attribute(ISM_PREFIX, ism, RESOURCE_ELEMENT, flag.to_string());
        }
        element.add_optional_attribute(ISM_PREFIX, ism, CREATE_DATE, &self.create_date);
        if let Some(des_version) = self.ism_des_version {
            element.add_attribute(ISM_PREFIX, ism, DES_VERSION, des_version.to_string());
        }
        if let (Some(des_version), Some(ntk)) = (self.ntk_des_version, version.namespaces().ntk) {
            element.add_attribute(NTK_PREFIX, ntk, DES_VERSION, des_version.to_string());
        }
        self.security.add_to(element, version);
        self.notice.add_to(element, version);
        self.extensible.add_to(element);
    }

    fn output_pairs(&self, prefix: &str) -> Vec<OutputPair> {
        let mut pairs = Vec::new();
        if let Some(flag) = self.resource_element {
            pairs.push(OutputPair::new(format!("{}{}", prefix, RESOURCE_ELEMENT), flag.to_string()));
        }
        push_pair(&mut pairs, format!("{}{}", prefix, CREATE_DATE), &self.create_date);
        if let Some(des_version) = self.ism_des_version {
            pairs.push(OutputPair::new(format!("{}ism.{}", prefix, DES_VERSION), des_version.to_string()));
        }
        if let Some(des_version) = self.ntk_des_version {
            pairs.push(OutputPair::new(format!("{}ntk.{}", prefix, DES_VERSION), des_version.to_string()));
        }
        pairs.extend(self.security.output_pairs(prefix));
        pairs.extend(self.notice.output_pairs(prefix));
        pairs.extend(self.extensible.output_pairs(prefix));
        pairs
    }
}

/// `ddms:resource`: a complete DDMS record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    version: SchemaVersion,
    components: Vec<ResourceComponent>,
    attributes: ResourceAttributes,
    warnings: Vec<ValidationMessage>,
}

impl Resource {
    /// Parse a resource. The schema validator is not consulted: a parsed record
    /// is assumed to have come from a validating reader.
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let version = ctx.version();
        let locator = locator(version);
        let locate = |e: DdmsError| e.locate(&locator);
        expect_element(element, ctx.ddms_namespace(), element_name(version)).map_err(locate)?;
        let mut components = Vec::new();
        for child in element.children() {
            read_child(child, ctx, &mut components).map_err(locate)?;
        }
        let attributes = ResourceAttributes::from_xml(element, ctx).map_err(locate)?;
        Self::build(components, attributes, ctx)
    }

    /// Build from already constructed components, in any order. When the context
    /// carries a schema validator, the rendered record must also pass it.
    pub fn new(
        components: Vec<ResourceComponent>,
        attributes: ResourceAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let resource = Self::build(components, attributes, ctx)?;
        if let Some(validator) = ctx.schema_validator() {
            let report = validator.validate(&resource.to_xml_string(), resource.version);
            if !report.valid {
                debug!(
                    version = %resource.version,
                    diagnostics = report.diagnostics.len(),
                    "schema validation rejected resource"
                );
                return Err(DdmsError::SchemaValidation {
                    diagnostics: report.diagnostics,
                });
            }
        }
        Ok(resource)
    }

    fn build(
        mut components: Vec<ResourceComponent>,
        attributes: ResourceAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let version = ctx.version();
        let locator = locator(version);
        let locate = |e: DdmsError| e.locate(&locator);

        components.sort_by_key(ResourceComponent::slot);
        for component in &components {
            let component = component.as_component();
            if component.version() != version {
                return Err(locate(DdmsError::invalid(format!(
                    "The {} element was built for DDMS {} but the resource is DDMS {}.",
                    component.qualified_name(),
                    component.version(),
                    version
                ))));
            }
        }
        for slot in Slot::ALL {
            let count = components.iter().filter(|c| c.slot() == slot).count();
            slot.rule(version)
                .check(slot.label(), count, version)
                .map_err(locate)?;
        }
        check_order(&components).map_err(locate)?;
        attributes.validate(ctx).map_err(locate)?;

        let mut resource = Self {
            version,
            components,
            attributes,
            warnings: Vec::new(),
        };
        resource.warnings = child_warnings(&locator, &resource.nested_components());
        debug!(
            version = %version,
            components = resource.components.len(),
            warnings = resource.warnings.len(),
            "built resource"
        );
        Ok(resource)
    }

    /// Every child, in schema order.
    pub fn components(&self) -> &[ResourceComponent] {
        &self.components
    }

    pub fn attributes(&self) -> &ResourceAttributes {
        &self.attributes
    }

    pub fn identifiers(&self) -> Vec<&Identifier> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::Identifier(identifier) => Some(identifier),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self, kind: TextKind) -> Vec<&TextElement> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::Text(text) if text.kind() == kind => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn producers(&self, kind: ProducerKind) -> Vec<&ProducerRole> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::Producer(role) if role.kind() == kind => Some(role),
                _ => None,
            })
            .collect()
    }

    pub fn subject_coverages(&self) -> Vec<&SubjectCoverage> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::SubjectCoverage(coverage) => Some(coverage),
                _ => None,
            })
            .collect()
    }

    pub fn geospatial_coverages(&self) -> Vec<&GeospatialCoverage> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::GeospatialCoverage(coverage) => Some(coverage),
                _ => None,
            })
            .collect()
    }

    pub fn related_resources(&self) -> Vec<&RelatedResource> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::RelatedResource(related) => Some(related),
                _ => None,
            })
            .collect()
    }

    pub fn extensible_elements(&self) -> Vec<&ExtensibleElement> {
        self.components
            .iter()
            .filter_map(|c| match c {
                ResourceComponent::Extensible(element) => Some(element),
                _ => None,
            })
            .collect()
    }

    pub fn security(&self) -> Option<&Security> {
        self.components.iter().find_map(|c| match c {
            ResourceComponent::Security(security) => Some(security),
            _ => None,
        })
    }

    /// Run Schematron rules over the rendered record. Findings are reported,
    /// never raised.
    pub fn schematron(&self, runner: &dyn SchematronRunner) -> Result<Vec<ValidationMessage>> {
        let findings = runner.run(&self.to_xml_string(), self.version)?;
        debug!(findings = findings.len(), "schematron finished");
        Ok(findings.iter().map(SchematronFinding::to_message).collect())
    }
}

fn read_child(
    child: &XmlElement,
    ctx: &ValidationContext,
    out: &mut Vec<ResourceComponent>,
) -> Result<()> {
    let version = ctx.version();
    if child.namespace() != ctx.ddms_namespace() {
        out.push(ExtensibleElement::from_xml(child, ctx)?.into());
        return Ok(());
    }
    let component: ResourceComponent = match child.local_name() {
        _ if TextKind::of(child, version).is_some() => TextElement::from_xml(child, ctx)?.into(),
        _ if ProducerKind::of(child, version).is_some() => ProducerRole::from_xml(child, ctx)?.into(),
        "identifier" => Identifier::from_xml(child, ctx)?.into(),
        "language" => Language::from_xml(child, ctx)?.into(),
        "dates" => Dates::from_xml(child, ctx)?.into(),
        "rights" => Rights::from_xml(child, ctx)?.into(),
        "source" => Source::from_xml(child, ctx)?.into(),
        "type" => Type::from_xml(child, ctx)?.into(),
        "format" => Format::from_xml(child, ctx)?.into(),
        "subjectCoverage" => SubjectCoverage::from_xml(child, ctx)?.into(),
        "virtualCoverage" => VirtualCoverage::from_xml(child, ctx)?.into(),
        "temporalCoverage" => TemporalCoverage::from_xml(child, ctx)?.into(),
        "geospatialCoverage" => GeospatialCoverage::from_xml(child, ctx)?.into(),
        "security" => Security::from_xml(child, ctx)?.into(),
        "relatedResource" | "relatedResources" => {
            let related = RelatedResource::from_xml_all(child, ctx)?;
            OccurrenceRule::ONE_OR_MORE
                .check("ddms:RelatedResource", related.len(), version)
                .map_err(|e| e.locate(&format!("/{}", child.qualified_name())))?;
            out.extend(related.into_iter().map(ResourceComponent::from));
            return Ok(());
        }
        other => {
            return Err(DdmsError::invalid(format!(
                "Unexpected element encountered: ddms:{}",
                other
            )));
        }
    };
    out.push(component);
    Ok(())
}

/// Orders on geospatial coverage and non-state actors must be exactly `1..=n`.
fn check_order(components: &[ResourceComponent]) -> Result<()> {
    let mut orders: Vec<u32> = Vec::new();
    for component in components {
        match component {
            ResourceComponent::GeospatialCoverage(coverage) => orders.extend(coverage.order()),
            ResourceComponent::SubjectCoverage(coverage) => orders.extend(
                coverage
                    .non_state_actors()
                    .iter()
                    .filter_map(NonStateActor::order),
            ),
            _ => {}
        }
    }
    orders.sort_unstable();
    if orders.iter().zip(1u32..).all(|(&order, expected)| order == expected) {
        Ok(())
    } else {
        Err(DdmsError::invalid(ORDER_MESSAGE))
    }
}

impl Component for Resource {
    fn name(&self) -> &str {
        element_name(self.version)
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.components.iter().map(ResourceComponent::as_component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    /// Resource attributes first, then every child. Repeated children of the
    /// same name are numbered from 1.
    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let mut pairs = self
            .attributes
            .output_pairs(&format!("{}{}{}.", prefix, OUTPUT_NAME, suffix));
        let children = self.nested_components();
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for child in &children {
            *totals.entry(child.name()).or_default() += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for child in &children {
            let index = seen.entry(child.name()).or_default();
            pairs.extend(child.output_pairs(prefix, &list_suffix(*index, totals[child.name()])));
            *index += 1;
        }
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, element_name(self.version));
        self.attributes.add_to(&mut element, self.version);
        for component in &self.components {
            element.append_child(component.as_component().to_xml());
        }
        element
    }
}

/// Stages a whole record. Titles, subtitles and descriptions share `texts` and
/// all producer roles share `producers`; each builder carries its own kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBuilder {
    pub identifiers: Vec<IdentifierBuilder>,
    pub texts: Vec<TextElementBuilder>,
    pub languages: Vec<LanguageBuilder>,
    pub dates: DatesBuilder,
    pub rights: RightsBuilder,
    pub sources: Vec<SourceBuilder>,
    pub types: Vec<TypeBuilder>,
    pub producers: Vec<ProducerRoleBuilder>,
    pub format: FormatBuilder,
    pub subject_coverages: Vec<SubjectCoverageBuilder>,
    pub virtual_coverages: Vec<VirtualCoverageBuilder>,
    pub temporal_coverages: Vec<TemporalCoverageBuilder>,
    pub geospatial_coverages: Vec<GeospatialCoverageBuilder>,
    pub related_resources: Vec<RelatedResourceBuilder>,
    pub security: SecurityBuilder,
    pub extensible_elements: Vec<ExtensibleElementBuilder>,
    pub resource_element: String,
    pub create_date: String,
    pub ism_des_version: String,
    pub ntk_des_version: String,
    pub security_attributes: SecurityAttributesBuilder,
    pub notice_attributes: NoticeAttributesBuilder,
    pub extensible_attributes: Vec<XmlAttribute>,
}

fn push_all<T: Into<ResourceComponent>>(out: &mut Vec<ResourceComponent>, items: impl IntoIterator<Item = T>) {
    out.extend(items.into_iter().map(Into::into));
}

impl ResourceBuilder {
    fn commit_components(&self, ctx: &ValidationContext) -> Result<Vec<ResourceComponent>> {
        let mut components = Vec::new();
        push_all(&mut components, commit_all(&self.identifiers, ctx)?);
        push_all(&mut components, commit_all(&self.texts, ctx)?);
        push_all(&mut components, commit_all(&self.languages, ctx)?);
        push_all(&mut components, self.dates.commit(ctx)?);
        push_all(&mut components, self.rights.commit(ctx)?);
        push_all(&mut components, commit_all(&self.sources, ctx)?);
        push_all(&mut components, commit_all(&self.types, ctx)?);
        push_all(&mut components, commit_all(&self.producers, ctx)?);
        push_all(&mut components, self.format.commit(ctx)?);
        push_all(&mut components, commit_all(&self.subject_coverages, ctx)?);
        push_all(&mut components, commit_all(&self.virtual_coverages, ctx)?);
        push_all(&mut components, commit_all(&self.temporal_coverages, ctx)?);
        push_all(&mut components, commit_all(&self.geospatial_coverages, ctx)?);
        push_all(&mut components, commit_all(&self.related_resources, ctx)?);
        push_all(&mut components, self.security.commit(ctx)?);
        push_all(&mut components, commit_all(&self.extensible_elements, ctx)?);
        Ok(components)
    }

    fn commit_attributes(&self, ctx: &ValidationContext) -> Result<ResourceAttributes> {
        Ok(ResourceAttributes {
            resource_element: parse_bool(&self.resource_element, RESOURCE_ELEMENT)?,
            create_date: self.create_date.trim().to_string(),
            ism_des_version: parse_des_version(&self.ism_des_version, ISM_DES_VERSION)?,
            ntk_des_version: parse_des_version(&self.ntk_des_version, NTK_DES_VERSION)?,
            security: self.security_attributes.build(ctx)?,
            notice: self.notice_attributes.build(ctx)?,
            extensible: ExtensibleAttributes::new(self.extensible_attributes.clone())?,
        })
    }
}

impl Builder for ResourceBuilder {
    type Output = Resource;

    fn is_empty(&self) -> bool {
        all_empty(&self.identifiers)
            && all_empty(&self.texts)
            && all_empty(&self.languages)
            && self.dates.is_empty()
            && self.rights.is_empty()
            && all_empty(&self.sources)
            && all_empty(&self.types)
            && all_empty(&self.producers)
            && self.format.is_empty()
            && all_empty(&self.subject_coverages)
            && all_empty(&self.virtual_coverages)
            && all_empty(&self.temporal_coverages)
            && all_empty(&self.geospatial_coverages)
            && all_empty(&self.related_resources)
            && self.security.is_empty()
            && all_empty(&self.extensible_elements)
            && self.resource_element.trim().is_empty()
            && self.create_date.trim().is_empty()
            && self.ism_des_version.trim().is_empty()
            && self.ntk_des_version.trim().is_empty()
            && self.security_attributes.is_empty()
            && self.notice_attributes.is_empty()
            && self.extensible_attributes.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Resource>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locator = locator(ctx.version());
        let components = self
            .commit_components(ctx)
            .map_err(|e| e.locate(&locator))?;
        let attributes = self
            .commit_attributes(ctx)
            .map_err(|e| e.locate(&locator))?;
        Resource::new(components, attributes, ctx).map(Some)
    }
}

impl From<&Resource> for ResourceBuilder {
    fn from(resource: &Resource) -> Self {
        let mut builder = Self::default();
        for component in &resource.components {
            match component {
                ResourceComponent::Identifier(c) => builder.identifiers.push(c.into()),
                ResourceComponent::Text(c) => builder.texts.push(c.into()),
                ResourceComponent::Language(c) => builder.languages.push(c.into()),
                ResourceComponent::Dates(c) => builder.dates = c.into(),
                ResourceComponent::Rights(c) => builder.rights = c.into(),
                ResourceComponent::Source(c) => builder.sources.push(c.into()),
                ResourceComponent::Type(c) => builder.types.push(c.into()),
                ResourceComponent::Producer(c) => builder.producers.push(c.into()),
                ResourceComponent::Format(c) => builder.format = c.into(),
                ResourceComponent::SubjectCoverage(c) => builder.subject_coverages.push(c.into()),
                ResourceComponent::VirtualCoverage(c) => builder.virtual_coverages.push(c.into()),
                ResourceComponent::TemporalCoverage(c) => builder.temporal_coverages.push(c.into()),
                ResourceComponent::GeospatialCoverage(c) => builder.geospatial_coverages.push(c.into()),
                ResourceComponent::RelatedResource(c) => builder.related_resources.push(c.into()),
                ResourceComponent::Security(c) => builder.security = c.into(),
                ResourceComponent::Extensible(c) => builder.extensible_elements.push(c.into()),
            }
        }
        let attributes = &resource.attributes;
        builder.resource_element = attributes
            .resource_element
            .map(|flag| flag.to_string())
            .unwrap_or_default();
        builder.create_date = attributes.create_date.clone();
        builder.ism_des_version = attributes
            .ism_des_version
            .map(|v| v.to_string())
            .unwrap_or_default();
        builder.ntk_des_version = attributes
            .ntk_des_version
            .map(|v| v.to_string())
            .unwrap_or_default();
        builder.security_attributes = SecurityAttributesBuilder::from(&attributes.security);
        builder.notice_attributes = NoticeAttributesBuilder::from(&attributes.notice);
        builder.extensible_attributes = attributes.extensible.attributes().to_vec();
        builder
    }
}
