//! # ddms-validate Library
//!
//! Version-aware parsing, building and validation of DDMS metadata records
//! (DDMS 2.0, 3.0, 3.1, 4.0.1 and 4.1).
//!
//! Records are read into immutable component trees ([`Resource`] at the top)
//! that are only ever constructed in a valid state. Each component has a mutable
//! builder counterpart for staging edits, and renders back to XML or to ordered
//! name/value pairs. A batch [`ValidationEngine`] validates whole directories of
//! records in parallel.

pub mod attributes;
pub mod cli;
pub mod component;
pub mod components;
pub mod config;
pub mod context;
pub mod datetime;
pub mod error;
pub mod error_reporter;
pub mod file_discovery;
pub mod output;
pub mod reader;
pub mod resource;
pub mod schema;
pub mod schematron;
pub mod validator;
pub mod version;
pub mod vocabulary;
pub mod xml;

#[cfg(test)]
mod test_support;

pub use attributes::{
    ExtensibleAttributes, NoticeAttributes, NoticeAttributesBuilder, SecurityAttributes,
    SecurityAttributesBuilder,
};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use component::{Builder, Component, OutputPair, RenderFormat};
pub use config::{Config, ConfigError, ConfigManager};
pub use context::ValidationContext;
pub use error::{DdmsError, Result, Severity, ValidationMessage};
pub use error_reporter::ErrorReporter;
pub use file_discovery::FileDiscovery;
pub use output::Output;
pub use reader::DdmsReader;
pub use resource::{Resource, ResourceBuilder, ResourceComponent};
pub use schema::{SchemaReport, SchemaValidator, WellFormedValidator};
pub use schematron::{SchematronFinding, SchematronRunner, parse_svrl};
pub use validator::{
    FileValidationResult, ValidationConfig, ValidationEngine, ValidationResults, ValidationStatus,
};
pub use version::SchemaVersion;
pub use vocabulary::{ControlledVocabularies, VocabularyLoader};
pub use xml::XmlElement;
