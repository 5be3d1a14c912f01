//! Schema validation seam.
//!
//! Full XSD validation is an external collaborator. The engine only needs a
//! pass/fail answer plus diagnostics for a serialized document, which
//! [`SchemaValidator`] captures. [`WellFormedValidator`] is the built-in
//! implementation: it re-parses the document and checks that the root element
//! lives in the expected DDMS namespace.

use serde::{Deserialize, Serialize};

use crate::version::SchemaVersion;

/// Outcome of validating one serialized document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub diagnostics: Vec<String>,
}

impl SchemaReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn invalid(diagnostics: Vec<String>) -> Self {
        Self {
            valid: false,
            diagnostics,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, xml: &str, version: SchemaVersion) -> SchemaReport;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WellFormedValidator;

impl SchemaValidator for WellFormedValidator {
    fn validate(&self, xml: &str, version: SchemaVersion) -> SchemaReport {
        let document = match roxmltree::Document::parse(xml) {
            Ok(document) => document,
            Err(e) => return SchemaReport::invalid(vec![e.to_string()]),
        };
        let root = document.root_element();
        let namespace = root.tag_name().namespace().unwrap_or_default();
        if namespace != version.ddms_namespace() {
            return SchemaReport::invalid(vec![format!(
                "Root element is in namespace '{}', expected '{}' for DDMS {}",
                namespace,
                version.ddms_namespace(),
                version
            )]);
        }
        SchemaReport::valid()
    }
}
