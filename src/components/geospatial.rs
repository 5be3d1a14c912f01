//! `ddms:geospatialCoverage` and the two ways of describing a place.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, VersionRange, add_ddms_attribute, child_texts, child_warnings,
    ddms_element, ddms_text_element, expect_element, list_suffix, push_pair, require_value,
};
use crate::components::subject::parse_order;
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "geospatialCoverage";
const LOCATOR: &str = "/ddms:geospatialCoverage";
/// Wrapper between `ddms:geospatialCoverage` and its content up to DDMS 3.1.
const GEOSPATIAL_EXTENT: &str = "GeospatialExtent";
const PRECEDENCE_VALUES: [&str; 2] = ["Primary", "Secondary"];

fn has_extent_wrapper(version: SchemaVersion) -> bool {
    !version.is_at_least(SchemaVersion::V4_0_1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode {
    version: SchemaVersion,
    qualifier: String,
    value: String,
}

impl CountryCode {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, "countryCode").map_err(|e| e.locate("/ddms:countryCode"))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "value"),
            ctx,
        )
    }

    pub fn new(qualifier: impl Into<String>, value: impl Into<String>, ctx: &ValidationContext) -> Result<Self> {
        let code = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            value: value.into(),
        };
        require_value(&code.qualifier, "qualifier attribute")
            .and_then(|_| require_value(&code.value, "value attribute"))
            .map_err(|e| e.locate("/ddms:countryCode"))?;
        Ok(code)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for CountryCode {
    fn name(&self) -> &str {
        "countryCode"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}countryCode{}", prefix, suffix);
        vec![
            OutputPair::new(format!("{}.qualifier", base), &self.qualifier),
            OutputPair::new(format!("{}.value", base), &self.value),
        ]
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "countryCode");
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut element, self.version, "value", &self.value);
        element
    }
}

/// Named places: geographic names, regions and an optional country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographicIdentifier {
    version: SchemaVersion,
    names: Vec<String>,
    regions: Vec<String>,
    country_code: Option<CountryCode>,
}

impl GeographicIdentifier {
    const LOCATOR: &str = "/ddms:geographicIdentifier";

    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let version = ctx.version();
        expect_element(element, ns, "geographicIdentifier").map_err(|e| e.locate(Self::LOCATOR))?;
        let country_code = element
            .first_child(ns, "countryCode")
            .map(|e| CountryCode::from_xml(e, ctx))
            .transpose()
            .map_err(|e| e.locate(Self::LOCATOR))?;
        Self::new(
            child_texts(element, version, "name"),
            child_texts(element, version, "region"),
            country_code,
            ctx,
        )
    }

    pub fn new(
        names: Vec<String>,
        regions: Vec<String>,
        country_code: Option<CountryCode>,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let identifier = Self {
            version: ctx.version(),
            names,
            regions,
            country_code,
        };
        if identifier.names.is_empty() && identifier.regions.is_empty() && identifier.country_code.is_none() {
            return Err(
                DdmsError::invalid("At least 1 name, region, or country code must exist.").locate(Self::LOCATOR),
            );
        }
        Ok(identifier)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn country_code(&self) -> Option<&CountryCode> {
        self.country_code.as_ref()
    }
}

impl Component for GeographicIdentifier {
    fn name(&self) -> &str {
        "geographicIdentifier"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.country_code.iter().map(|c| c as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}geographicIdentifier{}", prefix, suffix);
        let mut pairs = Vec::new();
        for (i, name) in self.names.iter().enumerate() {
            push_pair(&mut pairs, format!("{}.name{}", base, list_suffix(i, self.names.len())), name);
        }
        for (i, region) in self.regions.iter().enumerate() {
            push_pair(&mut pairs, format!("{}.region{}", base, list_suffix(i, self.regions.len())), region);
        }
        if let Some(code) = &self.country_code {
            pairs.extend(code.output_pairs(&format!("{}.", base), ""));
        }
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "geographicIdentifier");
        for name in &self.names {
            element.append_child(ddms_text_element(self.version, "name", name));
        }
        for region in &self.regions {
            element.append_child(ddms_text_element(self.version, "region", region));
        }
        if let Some(code) = &self.country_code {
            element.append_child(code.to_xml());
        }
        element
    }
}

/// Edges of a bounding box, in element order.
const EDGES: [(&str, &str, f64); 4] = [
    ("WestBL", "westBL", 180.0),
    ("EastBL", "eastBL", 180.0),
    ("SouthBL", "southBL", 90.0),
    ("NorthBL", "northBL", 90.0),
];

fn edge_name(index: usize, version: SchemaVersion) -> &'static str {
    let (legacy, current, _) = EDGES[index];
    if version.is_at_least(SchemaVersion::V4_0_1) { current } else { legacy }
}

fn parse_degrees(value: &str, name: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DdmsError::invalid(format!("The {} value must be a decimal number.", name)))
}

/// Decimal-degree bounds of an area.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    version: SchemaVersion,
    /// west, east, south, north
    bounds: [f64; 4],
    /// Lexical form of each bound, rendered as given.
    texts: [String; 4],
}

impl BoundingBox {
    const LOCATOR: &str = "/ddms:boundingBox";

    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let version = ctx.version();
        expect_element(element, ns, "boundingBox").map_err(|e| e.locate(Self::LOCATOR))?;
        let texts = [0, 1, 2, 3].map(|i| element.child_text(ns, edge_name(i, version)));
        for (i, text) in texts.iter().enumerate() {
            require_value(text, edge_name(i, version)).map_err(|e| e.locate(Self::LOCATOR))?;
        }
        Self::from_texts(texts, ctx)
    }

    pub fn new(west: f64, east: f64, south: f64, north: f64, ctx: &ValidationContext) -> Result<Self> {
        let bounds = [west, east, south, north];
        Self::build(bounds, bounds.map(|v| v.to_string()), ctx)
    }

    /// Parse each bound from its lexical form, keeping that form for rendering.
    pub fn from_texts(texts: [String; 4], ctx: &ValidationContext) -> Result<Self> {
        let version = ctx.version();
        let texts = texts.map(|t| t.trim().to_string());
        let mut bounds = [0.0; 4];
        for (i, text) in texts.iter().enumerate() {
            bounds[i] = parse_degrees(text, edge_name(i, version)).map_err(|e| e.locate(Self::LOCATOR))?;
        }
        Self::build(bounds, texts, ctx)
    }

    fn build(bounds: [f64; 4], texts: [String; 4], ctx: &ValidationContext) -> Result<Self> {
        let bounding_box = Self {
            version: ctx.version(),
            bounds,
            texts,
        };
        for (i, value) in bounding_box.bounds.iter().enumerate() {
            let (_, _, limit) = EDGES[i];
            if !(-limit..=limit).contains(value) {
                let kind = if limit > 90.0 { "longitude" } else { "latitude" };
                return Err(DdmsError::invalid(format!(
                    "A bounding box {} must be between -{} and {} degrees.",
                    kind, limit, limit
                ))
                .locate(Self::LOCATOR));
            }
        }
        Ok(bounding_box)
    }

    pub fn west(&self) -> f64 {
        self.bounds[0]
    }

    pub fn east(&self) -> f64 {
        self.bounds[1]
    }

    pub fn south(&self) -> f64 {
        self.bounds[2]
    }

    pub fn north(&self) -> f64 {
        self.bounds[3]
    }
}

impl Component for BoundingBox {
    fn name(&self) -> &str {
        "boundingBox"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}boundingBox{}", prefix, suffix);
        self.texts
            .iter()
            .enumerate()
            .map(|(i, value)| OutputPair::new(format!("{}.{}", base, edge_name(i, self.version)), value.as_str()))
            .collect()
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "boundingBox");
        for (i, value) in self.texts.iter().enumerate() {
            element.append_child(ddms_text_element(self.version, edge_name(i, self.version), value));
        }
        element
    }
}

/// `ddms:geospatialCoverage`: exactly one of a geographic identifier or a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct GeospatialCoverage {
    version: SchemaVersion,
    geographic_identifier: Option<GeographicIdentifier>,
    bounding_box: Option<BoundingBox>,
    precedence: String,
    order: Option<u32>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl GeospatialCoverage {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let locate = |e: DdmsError| e.locate(LOCATOR);
        expect_element(element, ns, NAME).map_err(locate)?;
        let content = if has_extent_wrapper(ctx.version()) {
            element
                .first_child(ns, GEOSPATIAL_EXTENT)
                .ok_or_else(|| locate(DdmsError::invalid("A ddms:GeospatialExtent element is required.")))?
        } else {
            element
        };
        let geographic_identifier = content
            .first_child(ns, "geographicIdentifier")
            .map(|e| GeographicIdentifier::from_xml(e, ctx))
            .transpose()
            .map_err(locate)?;
        let bounding_box = content
            .first_child(ns, "boundingBox")
            .map(|e| BoundingBox::from_xml(e, ctx))
            .transpose()
            .map_err(locate)?;
        let order = parse_order(&element.attribute_value(ns, "order")).map_err(locate)?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(locate)?;
        Self::new(
            geographic_identifier,
            bounding_box,
            element.attribute_value(ns, "precedence"),
            order,
            security,
            ctx,
        )
    }

    pub fn new(
        geographic_identifier: Option<GeographicIdentifier>,
        bounding_box: Option<BoundingBox>,
        precedence: impl Into<String>,
        order: Option<u32>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut coverage = Self {
            version: ctx.version(),
            geographic_identifier,
            bounding_box,
            precedence: precedence.into(),
            order,
            security,
            warnings: Vec::new(),
        };
        coverage.validate().map_err(|e| e.locate(LOCATOR))?;
        coverage.warnings = child_warnings(LOCATOR, &coverage.nested_components());
        Ok(coverage)
    }

    fn validate(&self) -> Result<()> {
        if self.geographic_identifier.is_some() == self.bounding_box.is_some() {
            return Err(DdmsError::invalid(
                "Exactly 1 of geographicIdentifier or boundingBox must be used.",
            ));
        }
        if !self.precedence.is_empty() {
            VersionRange::since(SchemaVersion::V4_0_1).check("attribute", "ddms:precedence", self.version)?;
            if self.geographic_identifier.as_ref().and_then(|g| g.country_code()).is_none() {
                return Err(DdmsError::invalid(
                    "The ddms:precedence attribute must only be applied to a geospatialCoverage containing a country code.",
                ));
            }
            if !PRECEDENCE_VALUES.contains(&self.precedence.as_str()) {
                return Err(DdmsError::invalid(format!(
                    "The ddms:precedence attribute must be one of {:?}.",
                    PRECEDENCE_VALUES
                )));
            }
        }
        if let Some(order) = self.order {
            VersionRange::since(SchemaVersion::V4_1).check("attribute", "ddms:order", self.version)?;
            if order == 0 {
                return Err(DdmsError::invalid("The order attribute must be a positive integer, not 0."));
            }
        }
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    pub fn geographic_identifier(&self) -> Option<&GeographicIdentifier> {
        self.geographic_identifier.as_ref()
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn precedence(&self) -> &str {
        &self.precedence
    }

    pub fn order(&self) -> Option<u32> {
        self.order
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for GeospatialCoverage {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        let mut nested: Vec<&dyn Component> = Vec::new();
        if let Some(identifier) = &self.geographic_identifier {
            nested.push(identifier);
        }
        if let Some(bounding_box) = &self.bounding_box {
            nested.push(bounding_box);
        }
        nested
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let child_prefix = format!("{}.", base);
        let mut pairs: Vec<OutputPair> = self
            .nested_components()
            .iter()
            .flat_map(|c| c.output_pairs(&child_prefix, ""))
            .collect();
        push_pair(&mut pairs, format!("{}.precedence", base), &self.precedence);
        if let Some(order) = self.order {
            pairs.push(OutputPair::new(format!("{}.order", base), order.to_string()));
        }
        pairs.extend(self.security.output_pairs(&child_prefix));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let version = self.version;
        let wrapped = has_extent_wrapper(version);
        let mut content = ddms_element(version, if wrapped { GEOSPATIAL_EXTENT } else { NAME });
        for child in self.nested_components() {
            content.append_child(child.to_xml());
        }
        let mut element = if wrapped {
            ddms_element(version, NAME).with_child(content)
        } else {
            content
        };
        add_ddms_attribute(&mut element, version, "precedence", &self.precedence);
        if let Some(order) = self.order {
            add_ddms_attribute(&mut element, version, "order", &order.to_string());
        }
        self.security.add_to(&mut element, version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCodeBuilder {
    pub qualifier: String,
    pub value: String,
}

impl Builder for CountryCodeBuilder {
    type Output = CountryCode;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<CountryCode>> {
        if self.is_empty() {
            return Ok(None);
        }
        CountryCode::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

impl From<&CountryCode> for CountryCodeBuilder {
    fn from(code: &CountryCode) -> Self {
        Self {
            qualifier: code.qualifier.clone(),
            value: code.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeographicIdentifierBuilder {
    pub names: Vec<String>,
    pub regions: Vec<String>,
    pub country_code: CountryCodeBuilder,
}

fn non_blank(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.trim().is_empty()).cloned().collect()
}

impl Builder for GeographicIdentifierBuilder {
    type Output = GeographicIdentifier;

    fn is_empty(&self) -> bool {
        self.names.iter().all(|v| v.trim().is_empty())
            && self.regions.iter().all(|v| v.trim().is_empty())
            && self.country_code.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<GeographicIdentifier>> {
        if self.is_empty() {
            return Ok(None);
        }
        let country_code = self
            .country_code
            .commit(ctx)
            .map_err(|e| e.locate(GeographicIdentifier::LOCATOR))?;
        GeographicIdentifier::new(non_blank(&self.names), non_blank(&self.regions), country_code, ctx).map(Some)
    }
}

impl From<&GeographicIdentifier> for GeographicIdentifierBuilder {
    fn from(identifier: &GeographicIdentifier) -> Self {
        Self {
            names: identifier.names.clone(),
            regions: identifier.regions.clone(),
            country_code: identifier
                .country_code
                .as_ref()
                .map(CountryCodeBuilder::from)
                .unwrap_or_default(),
        }
    }
}

/// Edges are kept as text so that a bad number surfaces at commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundingBoxBuilder {
    pub west: String,
    pub east: String,
    pub south: String,
    pub north: String,
}

impl Builder for BoundingBoxBuilder {
    type Output = BoundingBox;

    fn is_empty(&self) -> bool {
        [&self.west, &self.east, &self.south, &self.north]
            .iter()
            .all(|v| v.trim().is_empty())
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<BoundingBox>> {
        if self.is_empty() {
            return Ok(None);
        }
        BoundingBox::from_texts(
            [self.west.clone(), self.east.clone(), self.south.clone(), self.north.clone()],
            ctx,
        )
        .map(Some)
    }
}

impl From<&BoundingBox> for BoundingBoxBuilder {
    fn from(bounding_box: &BoundingBox) -> Self {
        let [west, east, south, north] = bounding_box.texts.clone();
        Self {
            west,
            east,
            south,
            north,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeospatialCoverageBuilder {
    pub geographic_identifier: GeographicIdentifierBuilder,
    pub bounding_box: BoundingBoxBuilder,
    pub precedence: String,
    pub order: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for GeospatialCoverageBuilder {
    type Output = GeospatialCoverage;

    fn is_empty(&self) -> bool {
        self.geographic_identifier.is_empty()
            && self.bounding_box.is_empty()
            && self.precedence.trim().is_empty()
            && self.order.trim().is_empty()
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<GeospatialCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locate = |e: DdmsError| e.locate(LOCATOR);
        GeospatialCoverage::new(
            self.geographic_identifier.commit(ctx).map_err(locate)?,
            self.bounding_box.commit(ctx).map_err(locate)?,
            &self.precedence,
            parse_order(&self.order).map_err(locate)?,
            self.security.build(ctx).map_err(locate)?,
            ctx,
        )
        .map(Some)
    }
}

impl From<&GeospatialCoverage> for GeospatialCoverageBuilder {
    fn from(coverage: &GeospatialCoverage) -> Self {
        Self {
            geographic_identifier: coverage
                .geographic_identifier
                .as_ref()
                .map(GeographicIdentifierBuilder::from)
                .unwrap_or_default(),
            bounding_box: coverage
                .bounding_box
                .as_ref()
                .map(BoundingBoxBuilder::from)
                .unwrap_or_default(),
            precedence: coverage.precedence.clone(),
            order: coverage.order.map(|o| o.to_string()).unwrap_or_default(),
            security: SecurityAttributesBuilder::from(&coverage.security),
        }
    }
}
