use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, VersionRange, add_ddms_attribute, ddms_element, expect_element,
    push_pair,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::{SchemaVersion, VIRT_PREFIX};
use crate::vocabulary::NETWORK;
use crate::xml::XmlElement;

const NAME: &str = "virtualCoverage";
const LOCATOR: &str = "/ddms:virtualCoverage";

/// `ddms:virtualCoverage`: a network address where the resource lives.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCoverage {
    version: SchemaVersion,
    address: String,
    protocol: String,
    access: String,
    network: String,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

fn virt_namespace(version: SchemaVersion) -> &'static str {
    version.namespaces().virt.unwrap_or_default()
}

impl VirtualCoverage {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(LOCATOR))?;
        let virt = virt_namespace(ctx.version());
        let (access, network) = if virt.is_empty() {
            (String::new(), String::new())
        } else {
            (element.attribute_value(virt, "access"), element.attribute_value(virt, "network"))
        };
        Self::new(
            element.attribute_value(ns, "address"),
            element.attribute_value(ns, "protocol"),
            access,
            network,
            security,
            ctx,
        )
    }

    pub fn new(
        address: impl Into<String>,
        protocol: impl Into<String>,
        access: impl Into<String>,
        network: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut coverage = Self {
            version: ctx.version(),
            address: address.into(),
            protocol: protocol.into(),
            access: access.into(),
            network: network.into(),
            security,
            warnings: Vec::new(),
        };
        coverage.validate(ctx).map_err(|e| e.locate(LOCATOR))?;
        if coverage.address.is_empty() && coverage.protocol.is_empty() {
            coverage.warnings.push(ValidationMessage::warning(
                "A completely empty ddms:virtualCoverage element was found.",
                LOCATOR,
            ));
        }
        Ok(coverage)
    }

    fn validate(&self, ctx: &ValidationContext) -> Result<()> {
        if !self.address.is_empty() && self.protocol.trim().is_empty() {
            return Err(DdmsError::invalid(
                "If an address is provided, the protocol is required and must not be empty.",
            ));
        }
        let virt_attributes = VersionRange::since(SchemaVersion::V4_1);
        if !self.access.is_empty() {
            virt_attributes.check("attribute", "virt:access", self.version)?;
        }
        if !self.network.is_empty() {
            virt_attributes.check("attribute", "virt:network", self.version)?;
            ctx.validate_token(NETWORK, &self.network)?;
        }
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn access(&self) -> &str {
        &self.access
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for VirtualCoverage {
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
        push_pair(&mut pairs, format!("{}.address", base), &self.address);
        push_pair(&mut pairs, format!("{}.protocol", base), &self.protocol);
        push_pair(&mut pairs, format!("{}.access", base), &self.access);
        push_pair(&mut pairs, format!("{}.network", base), &self.network);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        add_ddms_attribute(&mut element, self.version, "address", &self.address);
        add_ddms_attribute(&mut element, self.version, "protocol", &self.protocol);
        let virt = virt_namespace(self.version);
        element.add_optional_attribute(VIRT_PREFIX, virt, "access", &self.access);
        element.add_optional_attribute(VIRT_PREFIX, virt, "network", &self.network);
        self.security.add_to(&mut element, self.version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualCoverageBuilder {
    pub address: String,
    pub protocol: String,
    pub access: String,
    pub network: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for VirtualCoverageBuilder {
    type Output = VirtualCoverage;

    fn is_empty(&self) -> bool {
        [&self.address, &self.protocol, &self.access, &self.network]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<VirtualCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate(LOCATOR))?;
        VirtualCoverage::new(
            &self.address,
            &self.protocol,
            &self.access,
            &self.network,
            security,
            ctx,
        )
        .map(Some)
    }
}

impl From<&VirtualCoverage> for VirtualCoverageBuilder {
    fn from(coverage: &VirtualCoverage) -> Self {
        Self {
            address: coverage.address.clone(),
            protocol: coverage.protocol.clone(),
            access: coverage.access.clone(),
            network: coverage.network.clone(),
            security: SecurityAttributesBuilder::from(&coverage.security),
        }
    }
}
