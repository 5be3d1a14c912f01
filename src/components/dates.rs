use crate::component::{
    Builder, Component, OutputPair, VersionRange, add_ddms_attribute, ddms_element, expect_element,
    push_pair,
};
use crate::context::ValidationContext;
use crate::datetime::validate_date;
use crate::error::{Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "dates";
const LOCATOR: &str = "/ddms:dates";

const FIELDS: [(&str, VersionRange); 6] = [
    ("created", VersionRange::ALL),
    ("posted", VersionRange::ALL),
    ("validTil", VersionRange::ALL),
    ("infoCutOff", VersionRange::ALL),
    ("approvedOn", VersionRange::since(SchemaVersion::V3_1)),
    ("receivedOn", VersionRange::since(SchemaVersion::V4_0_1)),
];

/// `ddms:dates`: every value is an optional DDMS date, kept as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Dates {
    version: SchemaVersion,
    values: [String; 6],
    warnings: Vec<ValidationMessage>,
}

impl Dates {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        Self::new(FIELDS.map(|(name, _)| element.attribute_value(ns, name)), ctx)
    }

    /// Values in `created, posted, validTil, infoCutOff, approvedOn, receivedOn` order.
    pub fn new(values: [String; 6], ctx: &ValidationContext) -> Result<Self> {
        let mut dates = Self {
            version: ctx.version(),
            values,
            warnings: Vec::new(),
        };
        dates.validate().map_err(|e| e.locate(LOCATOR))?;
        if dates.values.iter().all(String::is_empty) {
            dates.warnings.push(ValidationMessage::warning(
                "A completely empty ddms:dates element was found.",
                LOCATOR,
            ));
        }
        Ok(dates)
    }

    fn validate(&self) -> Result<()> {
        for ((name, legal), value) in FIELDS.iter().zip(&self.values) {
            if !value.is_empty() {
                legal.check("attribute", name, self.version)?;
            }
        }
        for ((name, _), value) in FIELDS.iter().zip(&self.values) {
            if !value.is_empty() {
                validate_date(value, name)?;
            }
        }
        Ok(())
    }

    /// Value of the named date attribute, or "".
    pub fn get(&self, name: &str) -> &str {
        FIELDS
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| self.values[i].as_str())
            .unwrap_or_default()
    }

    pub fn created(&self) -> &str {
        &self.values[0]
    }
}

impl Component for Dates {
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
        for ((name, _), value) in FIELDS.iter().zip(&self.values) {
            push_pair(&mut pairs, format!("{}.{}", base, name), value);
        }
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        for ((name, _), value) in FIELDS.iter().zip(&self.values) {
            add_ddms_attribute(&mut element, self.version, name, value);
        }
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatesBuilder {
    pub created: String,
    pub posted: String,
    pub valid_til: String,
    pub info_cut_off: String,
    pub approved_on: String,
    pub received_on: String,
}

impl Builder for DatesBuilder {
    type Output = Dates;

    fn is_empty(&self) -> bool {
        [
            &self.created,
            &self.posted,
            &self.valid_til,
            &self.info_cut_off,
            &self.approved_on,
            &self.received_on,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Dates>> {
        if self.is_empty() {
            return Ok(None);
        }
        Dates::new(
            [
                self.created.clone(),
                self.posted.clone(),
                self.valid_til.clone(),
                self.info_cut_off.clone(),
                self.approved_on.clone(),
                self.received_on.clone(),
            ],
            ctx,
        )
        .map(Some)
    }
}

impl From<&Dates> for DatesBuilder {
    fn from(dates: &Dates) -> Self {
        let [created, posted, valid_til, info_cut_off, approved_on, received_on] = dates.values.clone();
        Self {
            created,
            posted,
            valid_til,
            info_cut_off,
            approved_on,
            received_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    fn values(created: &str, approved_on: &str, received_on: &str) -> [String; 6] {
        [
            created.to_string(),
            "2003-02".to_string(),
            String::new(),
            String::new(),
            approved_on.to_string(),
            received_on.to_string(),
        ]
    }

    #[test]
    fn test_version_gated_dates() {
        let err = Dates::new(values("2003", "2003", ""), &ctx(SchemaVersion::V3_0)).unwrap_err();
        assert_eq!(
            err.message(),
            "The approvedOn attribute cannot be used until DDMS 3.1 or later."
        );
        assert_eq!(err.locator(), Some(LOCATOR));
        Dates::new(values("2003", "2003", ""), &ctx(SchemaVersion::V3_1)).unwrap();
        assert!(Dates::new(values("2003", "", "2011"), &ctx(SchemaVersion::V3_1)).is_err());
        Dates::new(values("2003", "", "2011"), &ctx(SchemaVersion::V4_0_1)).unwrap();
    }

    #[test]
    fn test_bad_date_format() {
        let err = Dates::new(values("tomorrow", "", ""), &ctx(SchemaVersion::V4_1)).unwrap_err();
        assert_eq!(
            err.message(),
            "The created value (tomorrow) is not in a valid date format."
        );
    }

    #[test]
    fn test_empty_dates_warn() {
        let dates = Dates::new(Default::default(), &ctx(SchemaVersion::V4_1)).unwrap();
        assert_eq!(
            dates.warnings()[0].text,
            "A completely empty ddms:dates element was found."
        );
    }

    #[test]
    fn test_xml_and_output() {
        let ctx = ctx(SchemaVersion::V4_1);
        let dates = Dates::new(values("2003-02-15", "", ""), &ctx).unwrap();
        assert_eq!(dates.created(), "2003-02-15");
        assert_eq!(dates.get("posted"), "2003-02");
        let names: Vec<_> = dates.output_pairs("", "").into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["dates.created", "dates.posted"]);
        let reparsed = Dates::from_xml(&XmlElement::parse(&dates.to_xml_string()).unwrap(), &ctx).unwrap();
        assert_eq!(reparsed, dates);
    }

    #[test]
    fn test_builder_round_trip() {
        let ctx = ctx(SchemaVersion::V4_1);
        let dates = Dates::new(values("2003", "2004", "2011-01-01"), &ctx).unwrap();
        assert_eq!(DatesBuilder::from(&dates).commit(&ctx).unwrap(), Some(dates));
        assert_eq!(DatesBuilder::default().commit(&ctx).unwrap(), None);
    }
}
