//! `ddms:subjectCoverage` and the four kinds of subject it can hold.

use std::collections::HashSet;

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, VersionRange, add_ddms_attribute, all_empty, child_warnings,
    commit_all, ddms_element, expect_element, list_pairs, push_pair, require_value,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "subjectCoverage";
const LOCATOR: &str = "/ddms:subjectCoverage";
/// Wrapper between `ddms:subjectCoverage` and its content up to DDMS 3.1.
const SUBJECT: &str = "Subject";

fn has_subject_wrapper(version: SchemaVersion) -> bool {
    !version.is_at_least(SchemaVersion::V4_0_1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    version: SchemaVersion,
    value: String,
    security: SecurityAttributes,
}

impl Keyword {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, "keyword").map_err(|e| e.locate("/ddms:keyword"))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate("/ddms:keyword"))?;
        Self::new(element.attribute_value(ns, "value"), security, ctx)
    }

    pub fn new(value: impl Into<String>, security: SecurityAttributes, ctx: &ValidationContext) -> Result<Self> {
        let keyword = Self {
            version: ctx.version(),
            value: value.into(),
            security,
        };
        require_value(&keyword.value, "value attribute")
            .and_then(|_| keyword.security.check_legal_since(SchemaVersion::V4_0_1, keyword.version))
            .map_err(|e| e.locate("/ddms:keyword"))?;
        Ok(keyword)
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Keyword {
    fn name(&self) -> &str {
        "keyword"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}keyword{}", prefix, suffix);
        let mut pairs = vec![OutputPair::new(base.clone(), &self.value)];
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "keyword");
        add_ddms_attribute(&mut element, self.version, "value", &self.value);
        self.security.add_to(&mut element, self.version);
        element
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    version: SchemaVersion,
    qualifier: String,
    code: String,
    label: String,
    security: SecurityAttributes,
}

impl Category {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, "category").map_err(|e| e.locate("/ddms:category"))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate("/ddms:category"))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "code"),
            element.attribute_value(ns, "label"),
            security,
            ctx,
        )
    }

    pub fn new(
        qualifier: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let category = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            code: code.into(),
            label: label.into(),
            security,
        };
        require_value(&category.label, "label attribute")
            .and_then(|_| category.security.check_legal_since(SchemaVersion::V4_0_1, category.version))
            .map_err(|e| e.locate("/ddms:category"))?;
        Ok(category)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Component for Category {
    fn name(&self) -> &str {
        "category"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}category{}", prefix, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        push_pair(&mut pairs, format!("{}.code", base), &self.code);
        push_pair(&mut pairs, format!("{}.label", base), &self.label);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "category");
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut element, self.version, "code", &self.code);
        add_ddms_attribute(&mut element, self.version, "label", &self.label);
        self.security.add_to(&mut element, self.version);
        element
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionMetric {
    version: SchemaVersion,
    subject: String,
    coverage: String,
    security: SecurityAttributes,
}

impl ProductionMetric {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let security =
            SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate("/ddms:productionMetric"))?;
        Self::new(
            element.attribute_value(ns, "subject"),
            element.attribute_value(ns, "coverage"),
            security,
            ctx,
        )
    }

    pub fn new(
        subject: impl Into<String>,
        coverage: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let metric = Self {
            version: ctx.version(),
            subject: subject.into(),
            coverage: coverage.into(),
            security,
        };
        VersionRange::since(SchemaVersion::V4_0_1)
            .check("element", "ddms:productionMetric", metric.version)
            .and_then(|_| require_value(&metric.subject, "subject attribute"))
            .and_then(|_| require_value(&metric.coverage, "coverage attribute"))
            .map_err(|e| e.locate("/ddms:productionMetric"))?;
        Ok(metric)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn coverage(&self) -> &str {
        &self.coverage
    }
}

impl Component for ProductionMetric {
    fn name(&self) -> &str {
        "productionMetric"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}productionMetric{}", prefix, suffix);
        let mut pairs = vec![
            OutputPair::new(format!("{}.subject", base), &self.subject),
            OutputPair::new(format!("{}.coverage", base), &self.coverage),
        ];
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "productionMetric");
        add_ddms_attribute(&mut element, self.version, "subject", &self.subject);
        add_ddms_attribute(&mut element, self.version, "coverage", &self.coverage);
        self.security.add_to(&mut element, self.version);
        element
    }
}

/// Parse a `ddms:order` value: a positive integer.
pub(crate) fn parse_order(value: &str) -> Result<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.trim().parse::<u32>() {
        Ok(order) if order > 0 => Ok(Some(order)),
        _ => Err(DdmsError::invalid(format!(
            "The order attribute must be a positive integer, not {}.",
            value
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NonStateActor {
    version: SchemaVersion,
    value: String,
    order: Option<u32>,
    qualifier: String,
    security: SecurityAttributes,
}

impl NonStateActor {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let locate = |e: DdmsError| e.locate("/ddms:nonStateActor");
        let order = parse_order(&element.attribute_value(ns, "order")).map_err(locate)?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(locate)?;
        Self::new(element.text(), order, element.attribute_value(ns, "qualifier"), security, ctx)
    }

    pub fn new(
        value: impl Into<String>,
        order: Option<u32>,
        qualifier: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let actor = Self {
            version: ctx.version(),
            value: value.into(),
            order,
            qualifier: qualifier.into(),
            security,
        };
        VersionRange::since(SchemaVersion::V4_1)
            .check("element", "ddms:nonStateActor", actor.version)
            .and_then(|_| match actor.order {
                Some(0) => Err(DdmsError::invalid("The order attribute must be a positive integer, not 0.")),
                _ => Ok(()),
            })
            .map_err(|e| e.locate("/ddms:nonStateActor"))?;
        Ok(actor)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn order(&self) -> Option<u32> {
        self.order
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl Component for NonStateActor {
    fn name(&self) -> &str {
        "nonStateActor"
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}nonStateActor{}", prefix, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.value", base), &self.value);
        if let Some(order) = self.order {
            pairs.push(OutputPair::new(format!("{}.order", base), order.to_string()));
        }
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, "nonStateActor");
        if let Some(order) = self.order {
            add_ddms_attribute(&mut element, self.version, "order", &order.to_string());
        }
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        self.security.add_to(&mut element, self.version);
        element.with_text(self.value.clone())
    }
}

/// What the resource is about.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCoverage {
    version: SchemaVersion,
    keywords: Vec<Keyword>,
    categories: Vec<Category>,
    production_metrics: Vec<ProductionMetric>,
    non_state_actors: Vec<NonStateActor>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl SubjectCoverage {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let locate = |e: DdmsError| e.locate(LOCATOR);
        expect_element(element, ns, NAME).map_err(locate)?;
        let content = if has_subject_wrapper(ctx.version()) {
            element
                .first_child(ns, SUBJECT)
                .ok_or_else(|| locate(DdmsError::invalid("A ddms:Subject element is required.")))?
        } else {
            element
        };
        let keywords = content
            .children_named(ns, "keyword")
            .map(|e| Keyword::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(locate)?;
        let categories = content
            .children_named(ns, "category")
            .map(|e| Category::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(locate)?;
        let production_metrics = content
            .children_named(ns, "productionMetric")
            .map(|e| ProductionMetric::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(locate)?;
        let non_state_actors = content
            .children_named(ns, "nonStateActor")
            .map(|e| NonStateActor::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(locate)?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(locate)?;
        Self::new(keywords, categories, production_metrics, non_state_actors, security, ctx)
    }

    pub fn new(
        keywords: Vec<Keyword>,
        categories: Vec<Category>,
        production_metrics: Vec<ProductionMetric>,
        non_state_actors: Vec<NonStateActor>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut coverage = Self {
            version: ctx.version(),
            keywords,
            categories,
            production_metrics,
            non_state_actors,
            security,
            warnings: Vec::new(),
        };
        coverage.validate().map_err(|e| e.locate(LOCATOR))?;
        coverage.warnings = coverage.validate_warnings();
        Ok(coverage)
    }

    fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() && self.categories.is_empty() {
            return Err(DdmsError::invalid("At least 1 keyword or category must exist."));
        }
        if !self.production_metrics.is_empty() {
            VersionRange::since(SchemaVersion::V4_0_1).check("element", "ddms:productionMetric", self.version)?;
        }
        if !self.non_state_actors.is_empty() {
            VersionRange::since(SchemaVersion::V4_1).check("element", "ddms:nonStateActor", self.version)?;
        }
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    fn validate_warnings(&self) -> Vec<ValidationMessage> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        if !self.keywords.iter().all(|k| seen.insert(k.value())) {
            warnings.push(ValidationMessage::warning(
                "1 or more keywords have the same value.",
                LOCATOR,
            ));
        }
        let mut seen = HashSet::new();
        if !self
            .categories
            .iter()
            .all(|c| seen.insert((c.qualifier(), c.code(), c.label())))
        {
            warnings.push(ValidationMessage::warning(
                "1 or more categories have the same value.",
                LOCATOR,
            ));
        }
        warnings.extend(child_warnings(LOCATOR, &self.nested_components()));
        warnings
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn production_metrics(&self) -> &[ProductionMetric] {
        &self.production_metrics
    }

    pub fn non_state_actors(&self) -> &[NonStateActor] {
        &self.non_state_actors
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for SubjectCoverage {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        let mut nested: Vec<&dyn Component> = Vec::new();
        nested.extend(self.keywords.iter().map(|c| c as &dyn Component));
        nested.extend(self.categories.iter().map(|c| c as &dyn Component));
        nested.extend(self.production_metrics.iter().map(|c| c as &dyn Component));
        nested.extend(self.non_state_actors.iter().map(|c| c as &dyn Component));
        nested
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let child_prefix = format!("{}.", base);
        let mut pairs = list_pairs(&self.keywords, &child_prefix);
        pairs.extend(list_pairs(&self.categories, &child_prefix));
        pairs.extend(list_pairs(&self.production_metrics, &child_prefix));
        pairs.extend(list_pairs(&self.non_state_actors, &child_prefix));
        pairs.extend(self.security.output_pairs(&child_prefix));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let version = self.version;
        let wrapped = has_subject_wrapper(version);
        let mut content = ddms_element(version, if wrapped { SUBJECT } else { NAME });
        for child in self.nested_components() {
            content.append_child(child.to_xml());
        }
        let mut element = if wrapped {
            ddms_element(version, NAME).with_child(content)
        } else {
            content
        };
        self.security.add_to(&mut element, version);
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordBuilder {
    pub value: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for KeywordBuilder {
    type Output = Keyword;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Keyword>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate("/ddms:keyword"))?;
        Keyword::new(&self.value, security, ctx).map(Some)
    }
}

impl From<&Keyword> for KeywordBuilder {
    fn from(keyword: &Keyword) -> Self {
        Self {
            value: keyword.value.clone(),
            security: SecurityAttributesBuilder::from(&keyword.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuilder {
    pub qualifier: String,
    pub code: String,
    pub label: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for CategoryBuilder {
    type Output = Category;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty()
            && self.code.trim().is_empty()
            && self.label.trim().is_empty()
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Category>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate("/ddms:category"))?;
        Category::new(&self.qualifier, &self.code, &self.label, security, ctx).map(Some)
    }
}

impl From<&Category> for CategoryBuilder {
    fn from(category: &Category) -> Self {
        Self {
            qualifier: category.qualifier.clone(),
            code: category.code.clone(),
            label: category.label.clone(),
            security: SecurityAttributesBuilder::from(&category.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionMetricBuilder {
    pub subject: String,
    pub coverage: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for ProductionMetricBuilder {
    type Output = ProductionMetric;

    fn is_empty(&self) -> bool {
        self.subject.trim().is_empty() && self.coverage.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<ProductionMetric>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self
            .security
            .build(ctx)
            .map_err(|e| e.locate("/ddms:productionMetric"))?;
        ProductionMetric::new(&self.subject, &self.coverage, security, ctx).map(Some)
    }
}

impl From<&ProductionMetric> for ProductionMetricBuilder {
    fn from(metric: &ProductionMetric) -> Self {
        Self {
            subject: metric.subject.clone(),
            coverage: metric.coverage.clone(),
            security: SecurityAttributesBuilder::from(&metric.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonStateActorBuilder {
    pub value: String,
    /// Kept as text so that a bad number surfaces at commit.
    pub order: String,
    pub qualifier: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NonStateActorBuilder {
    type Output = NonStateActor;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
            && self.order.trim().is_empty()
            && self.qualifier.trim().is_empty()
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<NonStateActor>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locate = |e: DdmsError| e.locate("/ddms:nonStateActor");
        let order = parse_order(&self.order).map_err(locate)?;
        let security = self.security.build(ctx).map_err(locate)?;
        NonStateActor::new(&self.value, order, &self.qualifier, security, ctx).map(Some)
    }
}

impl From<&NonStateActor> for NonStateActorBuilder {
    fn from(actor: &NonStateActor) -> Self {
        Self {
            value: actor.value.clone(),
            order: actor.order.map(|o| o.to_string()).unwrap_or_default(),
            qualifier: actor.qualifier.clone(),
            security: SecurityAttributesBuilder::from(&actor.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectCoverageBuilder {
    pub keywords: Vec<KeywordBuilder>,
    pub categories: Vec<CategoryBuilder>,
    pub production_metrics: Vec<ProductionMetricBuilder>,
    pub non_state_actors: Vec<NonStateActorBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for SubjectCoverageBuilder {
    type Output = SubjectCoverage;

    fn is_empty(&self) -> bool {
        all_empty(&self.keywords)
            && all_empty(&self.categories)
            && all_empty(&self.production_metrics)
            && all_empty(&self.non_state_actors)
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<SubjectCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locate = |e: DdmsError| e.locate(LOCATOR);
        SubjectCoverage::new(
            commit_all(&self.keywords, ctx).map_err(locate)?,
            commit_all(&self.categories, ctx).map_err(locate)?,
            commit_all(&self.production_metrics, ctx).map_err(locate)?,
            commit_all(&self.non_state_actors, ctx).map_err(locate)?,
            self.security.build(ctx).map_err(locate)?,
            ctx,
        )
        .map(Some)
    }
}

impl From<&SubjectCoverage> for SubjectCoverageBuilder {
    fn from(coverage: &SubjectCoverage) -> Self {
        Self {
            keywords: coverage.keywords.iter().map(KeywordBuilder::from).collect(),
            categories: coverage.categories.iter().map(CategoryBuilder::from).collect(),
            production_metrics: coverage
                .production_metrics
                .iter()
                .map(ProductionMetricBuilder::from)
                .collect(),
            non_state_actors: coverage
                .non_state_actors
                .iter()
                .map(NonStateActorBuilder::from)
                .collect(),
            security: SecurityAttributesBuilder::from(&coverage.security),
        }
    }
}
