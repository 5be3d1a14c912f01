//! Reading DDMS records from files and strings.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::context::ValidationContext;
use crate::error::{DdmsError, Result};
use crate::resource::Resource;
use crate::schema::SchemaValidator;
use crate::version::SchemaVersion;
use crate::vocabulary::ControlledVocabularies;
use crate::xml::XmlElement;

/// Parses records and works out which DDMS version each one uses.
///
/// When a schema validator is configured it sees the raw text before the record
/// is parsed into components.
#[derive(Clone)]
pub struct DdmsReader {
    vocabularies: Arc<ControlledVocabularies>,
    schema_validator: Option<Arc<dyn SchemaValidator>>,
}

impl std::fmt::Debug for DdmsReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdmsReader")
            .field("vocabularies", &self.vocabularies)
            .field("schema_validator", &self.schema_validator.is_some())
            .finish()
    }
}

impl DdmsReader {
    pub fn new(vocabularies: Arc<ControlledVocabularies>) -> Self {
        Self {
            vocabularies,
            schema_validator: None,
        }
    }

    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    /// Version of a record, from its root namespace.
    ///
    /// DDMS 4.0.1 and 4.1 share a namespace; only 4.1 records carry
    /// `ntk:DESVersion`.
    pub fn detect_version(root: &XmlElement) -> Result<SchemaVersion> {
        let candidates = SchemaVersion::versions_for_namespace(root.namespace());
        let Some(&oldest) = candidates.first() else {
            return Err(DdmsError::UnsupportedVersion(format!(
                "no DDMS version uses the namespace '{}'",
                root.namespace()
            )));
        };
        let carries_ntk = |version: &&SchemaVersion| {
            version.is_at_least(SchemaVersion::V4_1)
                && version
                    .namespaces()
                    .ntk
                    .is_some_and(|ntk| root.attribute(ntk, "DESVersion").is_some())
        };
        let newest = candidates.iter().rev().find(carries_ntk).copied();
        Ok(newest.unwrap_or(oldest))
    }

    /// Context for building components at `version` with this reader's collaborators.
    pub fn context(&self, version: SchemaVersion) -> ValidationContext {
        let ctx = ValidationContext::new(version, Arc::clone(&self.vocabularies));
        match &self.schema_validator {
            Some(validator) => ctx.with_schema_validator(Arc::clone(validator)),
            None => ctx,
        }
    }

    pub fn read_str(&self, xml: &str) -> Result<Resource> {
        let root = XmlElement::parse(xml)?;
        let version = Self::detect_version(&root)?;
        debug!(version = %version, "detected DDMS version");
        self.read_parsed(&root, version, xml)
    }

    /// Build a record from an already parsed tree. `xml` is the text `root` came
    /// from and is what the schema validator sees.
    pub fn read_parsed(&self, root: &XmlElement, version: SchemaVersion, xml: &str) -> Result<Resource> {
        if let Some(validator) = &self.schema_validator {
            let report = validator.validate(xml, version);
            if !report.valid {
                return Err(DdmsError::SchemaValidation {
                    diagnostics: report.diagnostics,
                });
            }
        }
        Resource::from_xml(root, &self.context(version))
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Resource> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|e| DdmsError::io(path, e))?;
        debug!(path = %path.display(), bytes = xml.len(), "reading record");
        self.read_str(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::schema::{MockSchemaValidator, SchemaReport};
    use crate::test_support::{data_dir, minimal_xml};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn reader() -> DdmsReader {
        DdmsReader::new(Arc::new(ControlledVocabularies::from_directory(data_dir())))
    }

    #[test]
    fn test_detects_every_version() {
        for version in SchemaVersion::ALL {
            let root = XmlElement::parse(&minimal_xml(version)).unwrap();
            assert_eq!(DdmsReader::detect_version(&root).unwrap(), version);
        }
    }

    #[test]
    fn test_unknown_namespace() {
        let root = XmlElement::parse(r#"<resource xmlns="urn:example:not-ddms"/>"#).unwrap();
        let err = DdmsReader::detect_version(&root).unwrap_err();
        assert!(matches!(err, DdmsError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_read_str() {
        let resource = reader().read_str(&minimal_xml(SchemaVersion::V3_1)).unwrap();
        assert_eq!(resource.version(), SchemaVersion::V3_1);
        assert_eq!(resource.identifiers().len(), 1);
    }

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(minimal_xml(SchemaVersion::V4_1).as_bytes()).unwrap();
        let resource = reader().read_file(file.path()).unwrap();
        assert_eq!(resource.version(), SchemaVersion::V4_1);
    }

    #[test]
    fn test_missing_file() {
        let err = reader().read_file("/nonexistent/record.xml").unwrap_err();
        assert!(matches!(err, DdmsError::Io { .. }));
    }

    #[test]
    fn test_malformed_xml() {
        let err = reader().read_str("<ddms:resource").unwrap_err();
        assert!(matches!(err, DdmsError::XmlParse(_)));
    }

    #[test]
    fn test_schema_validator_sees_raw_text() {
        let xml = minimal_xml(SchemaVersion::V4_0_1);
        let expected = xml.clone();
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .withf(move |text, version| text == expected && *version == SchemaVersion::V4_0_1)
            .times(1)
            .returning(|_, _| SchemaReport::invalid(vec!["bad content".to_string()]));
        let err = reader()
            .with_schema_validator(Arc::new(validator))
            .read_str(&xml)
            .unwrap_err();
        assert_eq!(
            err,
            DdmsError::SchemaValidation {
                diagnostics: vec!["bad content".to_string()]
            }
        );
    }
}
