//! `ddms:relatedResource` and its links.
//!
//! Up to DDMS 3.1 the element is a `ddms:relatedResources` wrapper carrying the
//! relationship, direction and markings, around any number of
//! `ddms:RelatedResource` children. Each child becomes its own logical
//! [`RelatedResource`] that inherits the wrapper's attributes, and renders
//! back as one wrapper holding one child.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OccurrenceRule, OutputPair, add_ddms_attribute, all_empty, commit_all,
    ddms_element, expect_element, list_pairs, push_pair, require_uri, require_value,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::{SchemaVersion, XLINK_PREFIX};
use crate::xml::XmlElement;

const NAME: &str = "relatedResource";
const LEGACY_WRAPPER: &str = "relatedResources";
const LEGACY_INNER: &str = "RelatedResource";
const LINK: &str = "link";
const LINK_LOCATOR: &str = "/ddms:link";
const LOCATOR_TYPE: &str = "locator";
const DIRECTIONS: [&str; 3] = ["inbound", "outbound", "bidirectional"];

fn is_legacy(version: SchemaVersion) -> bool {
    !version.is_at_least(SchemaVersion::V4_0_1)
}

/// An `xlink` locator pointing at the related resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    version: SchemaVersion,
    href: String,
    role: String,
    title: String,
    label: String,
}

impl Link {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        expect_element(element, ctx.ddms_namespace(), LINK).map_err(|e| e.locate(LINK_LOCATOR))?;
        let xlink = ctx.namespaces().xlink;
        let link_type = element.attribute_value(xlink, "type");
        if link_type != LOCATOR_TYPE {
            return Err(DdmsError::invalid(format!(
                "The type attribute must have a fixed value of \"{}\".",
                LOCATOR_TYPE
            ))
            .locate(LINK_LOCATOR));
        }
        Self::new(
            element.attribute_value(xlink, "href"),
            element.attribute_value(xlink, "role"),
            element.attribute_value(xlink, "title"),
            element.attribute_value(xlink, "label"),
            ctx,
        )
    }

    pub fn new(
        href: impl Into<String>,
        role: impl Into<String>,
        title: impl Into<String>,
        label: impl Into<String>,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let link = Self {
            version: ctx.version(),
            href: href.into(),
            role: role.into(),
            title: title.into(),
            label: label.into(),
        };
        require_uri(&link.href, "href attribute").map_err(|e| e.locate(LINK_LOCATOR))?;
        Ok(link)
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Component for Link {
    fn name(&self) -> &str {
        LINK
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, LINK, suffix);
        let mut pairs = vec![
            OutputPair::new(format!("{}.type", base), LOCATOR_TYPE),
            OutputPair::new(format!("{}.href", base), &self.href),
        ];
        push_pair(&mut pairs, format!("{}.role", base), &self.role);
        push_pair(&mut pairs, format!("{}.title", base), &self.title);
        push_pair(&mut pairs, format!("{}.label", base), &self.label);
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let xlink = self.version.namespaces().xlink;
        let mut element = ddms_element(self.version, LINK);
        element.add_attribute(XLINK_PREFIX, xlink, "type", LOCATOR_TYPE);
        element.add_attribute(XLINK_PREFIX, xlink, "href", &self.href);
        element.add_optional_attribute(XLINK_PREFIX, xlink, "role", &self.role);
        element.add_optional_attribute(XLINK_PREFIX, xlink, "title", &self.title);
        element.add_optional_attribute(XLINK_PREFIX, xlink, "label", &self.label);
        element
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedResource {
    version: SchemaVersion,
    relationship: String,
    direction: String,
    qualifier: String,
    value: String,
    links: Vec<Link>,
    security: SecurityAttributes,
}

impl RelatedResource {
    /// Parse one related resource. A legacy wrapper must hold exactly one
    /// `ddms:RelatedResource`; see [`from_xml_all`](Self::from_xml_all) for the
    /// general case.
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let mut all = Self::from_xml_all(element, ctx)?;
        OccurrenceRule::EXACTLY_ONE
            .check("ddms:RelatedResource", all.len(), ctx.version())
            .map_err(|e| e.locate(&format!("/ddms:{}", LEGACY_WRAPPER)))?;
        Ok(all.remove(0))
    }

    /// Parse every logical related resource held by `element`.
    pub fn from_xml_all(element: &XmlElement, ctx: &ValidationContext) -> Result<Vec<Self>> {
        let ns = ctx.ddms_namespace();
        if !is_legacy(ctx.version()) {
            expect_element(element, ns, NAME).map_err(|e| e.locate(&format!("/ddms:{}", NAME)))?;
            return Self::from_parts(element, element, ctx).map(|r| vec![r]);
        }
        let locator = format!("/ddms:{}", LEGACY_WRAPPER);
        expect_element(element, ns, LEGACY_WRAPPER).map_err(|e| e.locate(&locator))?;
        element
            .children_named(ns, LEGACY_INNER)
            .map(|inner| Self::from_parts(element, inner, ctx))
            .collect()
    }

    /// `outer` carries relationship, direction and markings; `inner` carries
    /// qualifier, value and links. They are the same element from DDMS 4.0.1.
    fn from_parts(outer: &XmlElement, inner: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let locator = if is_legacy(ctx.version()) {
            format!("/ddms:{}/ddms:{}", LEGACY_WRAPPER, LEGACY_INNER)
        } else {
            format!("/ddms:{}", NAME)
        };
        let links = inner
            .children_named(ns, LINK)
            .map(|e| Link::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&locator))?;
        let security = SecurityAttributes::from_xml(outer, ctx).map_err(|e| e.locate(&locator))?;
        Self::new(
            outer.attribute_value(ns, "relationship"),
            outer.attribute_value(ns, "direction"),
            inner.attribute_value(ns, "qualifier"),
            inner.attribute_value(ns, "value"),
            links,
            security,
            ctx,
        )
    }

    pub fn new(
        relationship: impl Into<String>,
        direction: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
        links: Vec<Link>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let resource = Self {
            version: ctx.version(),
            relationship: relationship.into(),
            direction: direction.into(),
            qualifier: qualifier.into(),
            value: value.into(),
            links,
            security,
        };
        let locator = resource.locator();
        resource.validate().map_err(|e| e.locate(&locator))?;
        Ok(resource)
    }

    fn validate(&self) -> Result<()> {
        require_uri(&self.relationship, "relationship attribute")?;
        if !self.direction.is_empty() && !DIRECTIONS.contains(&self.direction.as_str()) {
            return Err(DdmsError::invalid(format!(
                "The direction attribute must be one of {:?}.",
                DIRECTIONS
            )));
        }
        require_uri(&self.qualifier, "qualifier attribute")?;
        require_value(&self.value, "value attribute")?;
        if self.links.is_empty() {
            return Err(DdmsError::invalid("At least 1 link must exist."));
        }
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for RelatedResource {
    fn name(&self) -> &str {
        if is_legacy(self.version) { LEGACY_WRAPPER } else { NAME }
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.links.iter().map(|l| l as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.relationship", base), &self.relationship);
        push_pair(&mut pairs, format!("{}.direction", base), &self.direction);
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        push_pair(&mut pairs, format!("{}.value", base), &self.value);
        pairs.extend(list_pairs(&self.links, &format!("{}.", base)));
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let version = self.version;
        let legacy = is_legacy(version);
        let mut inner = ddms_element(version, if legacy { LEGACY_INNER } else { NAME });
        if !legacy {
            add_ddms_attribute(&mut inner, version, "relationship", &self.relationship);
            add_ddms_attribute(&mut inner, version, "direction", &self.direction);
        }
        add_ddms_attribute(&mut inner, version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut inner, version, "value", &self.value);
        for link in &self.links {
            inner.append_child(link.to_xml());
        }
        let mut element = if legacy {
            let mut wrapper = ddms_element(version, LEGACY_WRAPPER);
            add_ddms_attribute(&mut wrapper, version, "relationship", &self.relationship);
            add_ddms_attribute(&mut wrapper, version, "direction", &self.direction);
            wrapper.with_child(inner)
        } else {
            inner
        };
        self.security.add_to(&mut element, version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBuilder {
    pub href: String,
    pub role: String,
    pub title: String,
    pub label: String,
}

impl Builder for LinkBuilder {
    type Output = Link;

    fn is_empty(&self) -> bool {
        [&self.href, &self.role, &self.title, &self.label]
            .iter()
            .all(|v| v.trim().is_empty())
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Link>> {
        if self.is_empty() {
            return Ok(None);
        }
        Link::new(&self.href, &self.role, &self.title, &self.label, ctx).map(Some)
    }
}

impl From<&Link> for LinkBuilder {
    fn from(link: &Link) -> Self {
        Self {
            href: link.href.clone(),
            role: link.role.clone(),
            title: link.title.clone(),
            label: link.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedResourceBuilder {
    pub relationship: String,
    pub direction: String,
    pub qualifier: String,
    pub value: String,
    pub links: Vec<LinkBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for RelatedResourceBuilder {
    type Output = RelatedResource;

    fn is_empty(&self) -> bool {
        [&self.relationship, &self.direction, &self.qualifier, &self.value]
            .iter()
            .all(|v| v.trim().is_empty())
            && all_empty(&self.links)
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<RelatedResource>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locator = if is_legacy(ctx.version()) {
            format!("/ddms:{}/ddms:{}", LEGACY_WRAPPER, LEGACY_INNER)
        } else {
            format!("/ddms:{}", NAME)
        };
        let links = commit_all(&self.links, ctx).map_err(|e| e.locate(&locator))?;
        let security = self.security.build(ctx).map_err(|e| e.locate(&locator))?;
        RelatedResource::new(
            &self.relationship,
            &self.direction,
            &self.qualifier,
            &self.value,
            links,
            security,
            ctx,
        )
        .map(Some)
    }
}

impl From<&RelatedResource> for RelatedResourceBuilder {
    fn from(resource: &RelatedResource) -> Self {
        Self {
            relationship: resource.relationship.clone(),
            direction: resource.direction.clone(),
            qualifier: resource.qualifier.clone(),
            value: resource.value.clone(),
            links: resource.links.iter().map(LinkBuilder::from).collect(),
            security: SecurityAttributesBuilder::from(&resource.security),
        }
    }
}
