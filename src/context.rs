use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::SchemaValidator;
use crate::version::{Namespaces, SchemaVersion};
use crate::vocabulary::ControlledVocabularies;

/// Everything a constructor or validator needs besides its own fields.
///
/// The schema version travels explicitly with every call, so records of different
/// versions can be built and validated side by side (including from several
/// threads, since the vocabulary engine is shared behind an `Arc`).
#[derive(Clone)]
pub struct ValidationContext {
    version: SchemaVersion,
    vocabularies: Arc<ControlledVocabularies>,
    schema_validator: Option<Arc<dyn SchemaValidator>>,
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("version", &self.version)
            .field("vocabularies", &self.vocabularies)
            .field("schema_validator", &self.schema_validator.is_some())
            .finish()
    }
}

impl ValidationContext {
    pub fn new(version: SchemaVersion, vocabularies: Arc<ControlledVocabularies>) -> Self {
        Self {
            version,
            vocabularies,
            schema_validator: None,
        }
    }

    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    /// Same vocabularies and schema validator, different version.
    pub fn at_version(&self, version: SchemaVersion) -> Self {
        Self {
            version,
            vocabularies: Arc::clone(&self.vocabularies),
            schema_validator: self.schema_validator.clone(),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn namespaces(&self) -> &'static Namespaces {
        self.version.namespaces()
    }

    pub fn ddms_namespace(&self) -> &'static str {
        self.version.ddms_namespace()
    }

    pub fn ism_namespace(&self) -> &'static str {
        self.version.ism_namespace()
    }

    pub fn is_at_least(&self, version: SchemaVersion) -> bool {
        self.version.is_at_least(version)
    }

    pub fn vocabularies(&self) -> &ControlledVocabularies {
        &self.vocabularies
    }

    pub fn schema_validator(&self) -> Option<&Arc<dyn SchemaValidator>> {
        self.schema_validator.as_ref()
    }

    pub fn validate_token(&self, key: &str, value: &str) -> Result<()> {
        self.vocabularies.validate(self.version, key, value)
    }

    pub fn validate_tokens(&self, key: &str, value: &str) -> Result<()> {
        self.vocabularies.validate_list(self.version, key, value)
    }
}
