//! Schematron results.
//!
//! Running a Schematron ruleset is left to a [`SchematronRunner`] supplied by the
//! caller (typically an XSLT toolchain producing SVRL). This module only parses
//! SVRL output and turns its findings into [`ValidationMessage`]s. Findings never
//! invalidate a component; they are informational.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

pub const SVRL_NAMESPACE: &str = "http://purl.oclc.org/dsdl/svrl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    FailedAssert,
    SuccessfulReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematronFinding {
    pub kind: FindingKind,
    pub text: String,
    pub location: String,
}

impl SchematronFinding {
    /// Failed asserts are errors, successful reports are warnings.
    pub fn to_message(&self) -> ValidationMessage {
        match self.kind {
            FindingKind::FailedAssert => ValidationMessage::error(&self.text, &self.location),
            FindingKind::SuccessfulReport => ValidationMessage::warning(&self.text, &self.location),
        }
    }
}

/// Runs a Schematron ruleset against a rendered record.
#[cfg_attr(test, mockall::automock)]
pub trait SchematronRunner: Send + Sync {
    fn run(&self, xml: &str, version: SchemaVersion) -> Result<Vec<SchematronFinding>>;
}

/// Collect every `svrl:failed-assert` and `svrl:successful-report` in document order.
pub fn parse_svrl(svrl: &str) -> Result<Vec<SchematronFinding>> {
    let root = XmlElement::parse(svrl)?;
    let mut findings = Vec::new();
    collect_findings(&root, &mut findings);
    Ok(findings)
}

fn collect_findings(element: &XmlElement, out: &mut Vec<SchematronFinding>) {
    let kind = if element.is(SVRL_NAMESPACE, "failed-assert") {
        Some(FindingKind::FailedAssert)
    } else if element.is(SVRL_NAMESPACE, "successful-report") {
        Some(FindingKind::SuccessfulReport)
    } else {
        None
    };
    match kind {
        Some(kind) => out.push(SchematronFinding {
            kind,
            text: element.child_text(SVRL_NAMESPACE, "text").trim().to_string(),
            location: element.attribute_value("", "location"),
        }),
        None => {
            for child in element.children() {
                collect_findings(child, out);
            }
        }
    }
}
