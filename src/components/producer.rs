//! Producer roles (`creator`, `publisher`, `contributor`, `pointOfContact`) and
//! the entity each one wraps.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OccurrenceRule, OutputPair, VersionRange, add_ddms_attribute,
    child_texts, child_warnings, ddms_element, ddms_text_element, push_pair,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerKind {
    Creator,
    Publisher,
    Contributor,
    PointOfContact,
}

impl ProducerKind {
    pub const ALL: [ProducerKind; 4] = [
        ProducerKind::Creator,
        ProducerKind::Publisher,
        ProducerKind::Contributor,
        ProducerKind::PointOfContact,
    ];

    pub fn local_name(&self) -> &'static str {
        match self {
            ProducerKind::Creator => "creator",
            ProducerKind::Publisher => "publisher",
            ProducerKind::Contributor => "contributor",
            ProducerKind::PointOfContact => "pointOfContact",
        }
    }

    pub fn of(element: &XmlElement, version: SchemaVersion) -> Option<ProducerKind> {
        Self::ALL
            .into_iter()
            .find(|k| element.is(version.ddms_namespace(), k.local_name()))
    }

    fn locator(&self) -> String {
        format!("/ddms:{}", self.local_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Organization,
    Service,
    Unknown,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Person,
        EntityKind::Organization,
        EntityKind::Service,
        EntityKind::Unknown,
    ];

    /// Capitalized up to DDMS 3.1, lower camel case afterwards.
    pub fn local_name(&self, version: SchemaVersion) -> &'static str {
        let modern = version.is_at_least(SchemaVersion::V4_0_1);
        match (self, modern) {
            (EntityKind::Person, false) => "Person",
            (EntityKind::Person, true) => "person",
            (EntityKind::Organization, false) => "Organization",
            (EntityKind::Organization, true) => "organization",
            (EntityKind::Service, false) => "Service",
            (EntityKind::Service, true) => "service",
            (EntityKind::Unknown, false) => "Unknown",
            (EntityKind::Unknown, true) => "unknown",
        }
    }

    fn legal(&self) -> VersionRange {
        match self {
            EntityKind::Unknown => VersionRange::since(SchemaVersion::V3_0),
            _ => VersionRange::ALL,
        }
    }

    pub fn of(element: &XmlElement, version: SchemaVersion) -> Option<EntityKind> {
        Self::ALL
            .into_iter()
            .find(|k| element.is(version.ddms_namespace(), k.local_name(version)))
    }
}

/// A person, organization, service or unknown entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    version: SchemaVersion,
    names: Vec<String>,
    surname: String,
    user_id: String,
    affiliations: Vec<String>,
    phones: Vec<String>,
    emails: Vec<String>,
    acronym: String,
}

impl Entity {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let version = ctx.version();
        let ns = ctx.ddms_namespace();
        let kind = EntityKind::of(element, version).ok_or_else(|| {
            DdmsError::invalid(format!(
                "Unexpected producer entity: {}",
                element.qualified_name()
            ))
        })?;
        let mut builder = EntityBuilder::new(kind);
        builder.names = child_texts(element, version, "name");
        builder.surname = element.child_text(ns, "surname");
        builder.user_id = element.child_text(ns, "userID");
        builder.affiliations = child_texts(element, version, "affiliation");
        builder.phones = child_texts(element, version, "phone");
        builder.emails = child_texts(element, version, "email");
        builder.acronym = element.attribute_value(ns, "acronym");
        builder.build(ctx)
    }

    fn locator(kind: EntityKind, version: SchemaVersion) -> String {
        format!("/ddms:{}", kind.local_name(version))
    }

    fn validate(&self) -> Result<()> {
        let version = self.version;
        self.kind
            .legal()
            .check("element", self.kind.local_name(version), version)?;
        if self.names.is_empty() {
            return Err(DdmsError::invalid("At least 1 name element must exist."));
        }
        if self.kind == EntityKind::Person {
            if self.surname.trim().is_empty() {
                return Err(DdmsError::invalid("surname is required."));
            }
            let affiliations = if version.is_at_least(SchemaVersion::V4_0_1) {
                OccurrenceRule::ANY
            } else {
                OccurrenceRule::OPTIONAL
            };
            affiliations.check("affiliation", self.affiliations.len(), version)?;
        } else if !self.surname.is_empty() || !self.user_id.is_empty() || !self.affiliations.is_empty() {
            return Err(DdmsError::invalid(
                "Only a person can have a surname, userID or affiliation.",
            ));
        }
        if !self.acronym.is_empty() {
            if self.kind != EntityKind::Organization {
                return Err(DdmsError::invalid("Only an organization can have an acronym."));
            }
            VersionRange::since(SchemaVersion::V4_0_1).check("attribute", "acronym", version)?;
        }
        Ok(())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn affiliations(&self) -> &[String] {
        &self.affiliations
    }

    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }
}

impl Component for Entity {
    fn name(&self) -> &str {
        self.kind.local_name(self.version)
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}entity{}", prefix, suffix);
        let mut pairs = vec![OutputPair::new(format!("{}.entityType", base), self.name())];
        for name in &self.names {
            push_pair(&mut pairs, format!("{}.name", base), name);
        }
        push_pair(&mut pairs, format!("{}.surname", base), &self.surname);
        push_pair(&mut pairs, format!("{}.userID", base), &self.user_id);
        for (label, values) in [
            ("affiliation", &self.affiliations),
            ("phone", &self.phones),
            ("email", &self.emails),
        ] {
            for value in values {
                push_pair(&mut pairs, format!("{}.{}", base, label), value);
            }
        }
        push_pair(&mut pairs, format!("{}.acronym", base), &self.acronym);
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let version = self.version;
        let mut element = ddms_element(version, self.name());
        add_ddms_attribute(&mut element, version, "acronym", &self.acronym);
        for name in &self.names {
            element.append_child(ddms_text_element(version, "name", name));
        }
        if !self.surname.is_empty() {
            element.append_child(ddms_text_element(version, "surname", &self.surname));
        }
        if !self.user_id.is_empty() {
            element.append_child(ddms_text_element(version, "userID", &self.user_id));
        }
        for (local, values) in [
            ("affiliation", &self.affiliations),
            ("phone", &self.phones),
            ("email", &self.emails),
        ] {
            for value in values {
                element.append_child(ddms_text_element(version, local, value));
            }
        }
        element
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBuilder {
    pub kind: EntityKind,
    pub names: Vec<String>,
    pub surname: String,
    pub user_id: String,
    pub affiliations: Vec<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub acronym: String,
}

impl EntityBuilder {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
            surname: String::new(),
            user_id: String::new(),
            affiliations: Vec::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            acronym: String::new(),
        }
    }

    /// Blank list entries are dropped; scalars are kept as entered.
    pub fn build(&self, ctx: &ValidationContext) -> Result<Entity> {
        let keep = |values: &[String]| -> Vec<String> {
            values.iter().filter(|v| !v.trim().is_empty()).cloned().collect()
        };
        let entity = Entity {
            kind: self.kind,
            version: ctx.version(),
            names: keep(&self.names),
            surname: self.surname.clone(),
            user_id: self.user_id.clone(),
            affiliations: keep(&self.affiliations),
            phones: keep(&self.phones),
            emails: keep(&self.emails),
            acronym: self.acronym.clone(),
        };
        entity
            .validate()
            .map_err(|e| e.locate(&Entity::locator(self.kind, ctx.version())))?;
        Ok(entity)
    }
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new(EntityKind::Person)
    }
}

impl Builder for EntityBuilder {
    type Output = Entity;

    fn is_empty(&self) -> bool {
        let blank = |values: &[String]| values.iter().all(|v| v.trim().is_empty());
        blank(&self.names)
            && self.surname.trim().is_empty()
            && self.user_id.trim().is_empty()
            && blank(&self.affiliations)
            && blank(&self.phones)
            && blank(&self.emails)
            && self.acronym.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Entity>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.build(ctx).map(Some)
    }
}

impl From<&Entity> for EntityBuilder {
    fn from(entity: &Entity) -> Self {
        Self {
            kind: entity.kind,
            names: entity.names.clone(),
            surname: entity.surname.clone(),
            user_id: entity.user_id.clone(),
            affiliations: entity.affiliations.clone(),
            phones: entity.phones.clone(),
            emails: entity.emails.clone(),
            acronym: entity.acronym.clone(),
        }
    }
}

/// A producer role wrapping exactly one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRole {
    kind: ProducerKind,
    version: SchemaVersion,
    entity: Entity,
    poc_type: String,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl ProducerRole {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let version = ctx.version();
        let kind = ProducerKind::of(element, version).ok_or_else(|| {
            DdmsError::invalid(format!("Unexpected producer role: {}", element.qualified_name()))
        })?;
        let located = |e: DdmsError| e.locate(&kind.locator());
        let entities: Vec<&XmlElement> = element
            .children()
            .filter(|c| EntityKind::of(c, version).is_some())
            .collect();
        if entities.len() != 1 {
            return Err(located(DdmsError::invalid(
                "A producer role must contain exactly 1 entity.",
            )));
        }
        let entity = Entity::from_xml(entities[0], ctx).map_err(located)?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(located)?;
        let poc_type = element.attribute_value(ctx.ddms_namespace(), "pocType");
        Self::new(kind, entity, poc_type, security, ctx)
    }

    pub fn new(
        kind: ProducerKind,
        entity: Entity,
        poc_type: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut role = Self {
            kind,
            version: ctx.version(),
            entity,
            poc_type: poc_type.into(),
            security,
            warnings: Vec::new(),
        };
        role.validate().map_err(|e| e.locate(&kind.locator()))?;
        role.warnings = child_warnings(&kind.locator(), &role.nested_components());
        Ok(role)
    }

    fn validate(&self) -> Result<()> {
        if self.entity.version != self.version {
            return Err(DdmsError::invalid(format!(
                "The entity was built for DDMS {} but the role is DDMS {}.",
                self.entity.version, self.version
            )));
        }
        if !self.poc_type.is_empty() {
            if self.kind != ProducerKind::PointOfContact {
                return Err(DdmsError::invalid("Only a pointOfContact can have a pocType."));
            }
            VersionRange::since(SchemaVersion::V4_0_1).check("attribute", "pocType", self.version)?;
        }
        Ok(())
    }

    pub fn kind(&self) -> ProducerKind {
        self.kind
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn poc_type(&self) -> &str {
        &self.poc_type
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for ProducerRole {
    fn name(&self) -> &str {
        self.kind.local_name()
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        vec![&self.entity]
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, self.kind.local_name(), suffix);
        let mut pairs = self.entity.output_pairs(&format!("{}.", base), "");
        push_pair(&mut pairs, format!("{}.pocType", base), &self.poc_type);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, self.kind.local_name());
        add_ddms_attribute(&mut element, self.version, "pocType", &self.poc_type);
        self.security.add_to(&mut element, self.version);
        element.with_child(self.entity.to_xml())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRoleBuilder {
    pub kind: ProducerKind,
    pub entity: EntityBuilder,
    pub poc_type: String,
    pub security: SecurityAttributesBuilder,
}

impl ProducerRoleBuilder {
    pub fn new(kind: ProducerKind, entity: EntityKind) -> Self {
        Self {
            kind,
            entity: EntityBuilder::new(entity),
            poc_type: String::new(),
            security: SecurityAttributesBuilder::default(),
        }
    }
}

impl Default for ProducerRoleBuilder {
    fn default() -> Self {
        Self::new(ProducerKind::Creator, EntityKind::Person)
    }
}

impl Builder for ProducerRoleBuilder {
    type Output = ProducerRole;

    fn is_empty(&self) -> bool {
        self.entity.is_empty() && self.poc_type.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<ProducerRole>> {
        if self.is_empty() {
            return Ok(None);
        }
        let located = |e: DdmsError| e.locate(&self.kind.locator());
        let entity = self.entity.build(ctx).map_err(located)?;
        let security = self.security.build(ctx).map_err(located)?;
        ProducerRole::new(self.kind, entity, &self.poc_type, security, ctx).map(Some)
    }
}

impl From<&ProducerRole> for ProducerRoleBuilder {
    fn from(role: &ProducerRole) -> Self {
        Self {
            kind: role.kind,
            entity: EntityBuilder::from(&role.entity),
            poc_type: role.poc_type.clone(),
            security: SecurityAttributesBuilder::from(&role.security),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, unclassified, xmlns};

    fn person(ctx: &ValidationContext) -> Entity {
        let mut builder = EntityBuilder::new(EntityKind::Person);
        builder.names = vec!["Brian".to_string()];
        builder.surname = "Uri".to_string();
        builder.user_id = "123".to_string();
        builder.affiliations = vec!["DISA".to_string()];
        builder.phones = vec!["703-882-1000".to_string()];
        builder.emails = vec!["ddms@fgm.com".to_string()];
        builder.build(ctx).unwrap()
    }

    #[test]
    fn test_entity_names_follow_version() {
        assert_eq!(EntityKind::Person.local_name(SchemaVersion::V3_1), "Person");
        assert_eq!(EntityKind::Person.local_name(SchemaVersion::V4_0_1), "person");
        assert_eq!(EntityKind::Unknown.local_name(SchemaVersion::V4_1), "unknown");
    }

    #[test]
    fn test_from_xml_creator_with_person() {
        for version in SchemaVersion::ALL {
            let person = EntityKind::Person.local_name(version);
            let xml = format!(
                r#"<ddms:creator {} ism:classification="U" ism:ownerProducer="USA"><ddms:{p}><ddms:name>Brian</ddms:name><ddms:surname>Uri</ddms:surname></ddms:{p}></ddms:creator>"#,
                xmlns(version),
                p = person
            );
            let role = ProducerRole::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx(version)).unwrap();
            assert_eq!(role.kind(), ProducerKind::Creator);
            assert_eq!(role.entity().kind(), EntityKind::Person);
            assert_eq!(role.entity().surname(), "Uri");
            assert_eq!(role.security().classification(), Some("U"));
        }
    }

    #[test]
    fn test_person_requires_surname() {
        let ctx = ctx(SchemaVersion::V4_1);
        let mut builder = EntityBuilder::new(EntityKind::Person);
        builder.names = vec!["Brian".to_string()];
        let err = builder.build(&ctx).unwrap_err();
        assert_eq!(err.message(), "surname is required.");
        assert_eq!(err.locator(), Some("/ddms:person"));

        let mut role = ProducerRoleBuilder::new(ProducerKind::Publisher, EntityKind::Person);
        role.entity = builder;
        let err = role.commit(&ctx).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:publisher/ddms:person"));
    }

    #[test]
    fn test_entity_rules() {
        let ctx30 = ctx(SchemaVersion::V3_0);
        let mut builder = EntityBuilder::new(EntityKind::Organization);
        assert_eq!(
            builder.build(&ctx30).unwrap_err().message(),
            "At least 1 name element must exist."
        );
        builder.names = vec!["DISA".to_string()];
        builder.acronym = "DISA".to_string();
        assert!(builder.build(&ctx30).is_err());
        builder.build(&ctx(SchemaVersion::V4_0_1)).unwrap();

        let mut unknown = EntityBuilder::new(EntityKind::Unknown);
        unknown.names = vec!["Who".to_string()];
        assert!(unknown.build(&ctx(SchemaVersion::V2_0)).is_err());
        unknown.build(&ctx30).unwrap();

        let mut service = EntityBuilder::new(EntityKind::Service);
        service.names = vec!["Service".to_string()];
        service.surname = "Nope".to_string();
        assert!(service.build(&ctx30).is_err());
    }

    #[test]
    fn test_affiliation_cardinality() {
        let mut builder = EntityBuilder::from(&person(&ctx(SchemaVersion::V4_1)));
        builder.affiliations.push("DoD".to_string());
        builder.build(&ctx(SchemaVersion::V4_1)).unwrap();
        let err = builder.build(&ctx(SchemaVersion::V3_1)).unwrap_err();
        assert_eq!(err.message(), "Only 1 affiliation can be used.");
    }

    #[test]
    fn test_poc_type_rules() {
        let ctx = ctx(SchemaVersion::V4_1);
        let entity = person(&ctx);
        let err = ProducerRole::new(ProducerKind::Creator, entity.clone(), "DoD-Dist-B", SecurityAttributes::default(), &ctx)
            .unwrap_err();
        assert_eq!(err.message(), "Only a pointOfContact can have a pocType.");
        ProducerRole::new(ProducerKind::PointOfContact, entity, "DoD-Dist-B", SecurityAttributes::default(), &ctx)
            .unwrap();
    }

    #[test]
    fn test_output_pairs() {
        let ctx = ctx(SchemaVersion::V4_1);
        let role = ProducerRole::new(ProducerKind::Creator, person(&ctx), "", unclassified(&ctx), &ctx).unwrap();
        let pairs = role.output_pairs("", "");
        assert_eq!(pairs[0], OutputPair::new("creator.entity.entityType", "person"));
        assert_eq!(pairs[1], OutputPair::new("creator.entity.name", "Brian"));
        assert!(pairs.contains(&OutputPair::new("creator.classification", "U")));
    }

    #[test]
    fn test_round_trips() {
        for version in SchemaVersion::ALL {
            let ctx = ctx(version);
            let role = ProducerRole::new(ProducerKind::PointOfContact, person(&ctx), "", unclassified(&ctx), &ctx)
                .unwrap();
            let reparsed =
                ProducerRole::from_xml(&XmlElement::parse(&role.to_xml_string()).unwrap(), &ctx).unwrap();
            assert_eq!(reparsed, role);
            assert_eq!(ProducerRoleBuilder::from(&role).commit(&ctx).unwrap(), Some(role));
        }
    }
}
