use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::component::{
    Builder, Component, OutputPair, ddms_element, ddms_text_element, expect_element, push_pair,
    require_value,
};
use crate::context::ValidationContext;
use crate::datetime::validate_extended_date;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "temporalCoverage";
const LOCATOR: &str = "/ddms:temporalCoverage";
/// Wrapper between `ddms:temporalCoverage` and its content up to DDMS 3.1.
const TIME_PERIOD: &str = "TimePeriod";

fn has_time_period(version: SchemaVersion) -> bool {
    !version.is_at_least(SchemaVersion::V4_0_1)
}

/// `ddms:temporalCoverage`: the period of time the resource covers.
///
/// `start` and `end` hold either a DDMS date or one of the extended values
/// `Not Applicable` and `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalCoverage {
    version: SchemaVersion,
    time_period_name: String,
    start: String,
    end: String,
    security: SecurityAttributes,
}

impl TemporalCoverage {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        let content = if has_time_period(ctx.version()) {
            element.first_child(ns, TIME_PERIOD).ok_or_else(|| {
                DdmsError::invalid("A ddms:TimePeriod element is required.").locate(LOCATOR)
            })?
        } else {
            element
        };
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(LOCATOR))?;
        Self::new(
            content.child_text(ns, "name"),
            content.child_text(ns, "start").trim(),
            content.child_text(ns, "end").trim(),
            security,
            ctx,
        )
    }

    pub fn new(
        time_period_name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let coverage = Self {
            version: ctx.version(),
            time_period_name: time_period_name.into(),
            start: start.into(),
            end: end.into(),
            security,
        };
        coverage.validate().map_err(|e| e.locate(LOCATOR))?;
        Ok(coverage)
    }

    fn validate(&self) -> Result<()> {
        require_value(&self.start, "start")?;
        validate_extended_date(&self.start, "start")?;
        require_value(&self.end, "end")?;
        validate_extended_date(&self.end, "end")?;
        self.security.check_legal_since(SchemaVersion::V3_0, self.version)
    }

    pub fn time_period_name(&self) -> &str {
        &self.time_period_name
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for TemporalCoverage {
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
        push_pair(&mut pairs, format!("{}.name", base), &self.time_period_name);
        push_pair(&mut pairs, format!("{}.start", base), &self.start);
        push_pair(&mut pairs, format!("{}.end", base), &self.end);
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let version = self.version;
        let wrapped = has_time_period(version);
        let mut content = ddms_element(version, if wrapped { TIME_PERIOD } else { NAME });
        if !self.time_period_name.is_empty() {
            content.append_child(ddms_text_element(version, "name", &self.time_period_name));
        }
        content.append_child(ddms_text_element(version, "start", &self.start));
        content.append_child(ddms_text_element(version, "end", &self.end));
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
pub struct TemporalCoverageBuilder {
    pub time_period_name: String,
    pub start: String,
    pub end: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for TemporalCoverageBuilder {
    type Output = TemporalCoverage;

    fn is_empty(&self) -> bool {
        self.time_period_name.trim().is_empty()
            && self.start.trim().is_empty()
            && self.end.trim().is_empty()
            && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<TemporalCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.build(ctx).map_err(|e| e.locate(LOCATOR))?;
        TemporalCoverage::new(&self.time_period_name, &self.start, &self.end, security, ctx).map(Some)
    }
}

impl From<&TemporalCoverage> for TemporalCoverageBuilder {
    fn from(coverage: &TemporalCoverage) -> Self {
        Self {
            time_period_name: coverage.time_period_name.clone(),
            start: coverage.start.clone(),
            end: coverage.end.clone(),
            security: SecurityAttributesBuilder::from(&coverage.security),
        }
    }
}
