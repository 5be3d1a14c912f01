//! Batch validation engine
//!
//! Discovers candidate records, validates each one with a [`DdmsReader`] on a
//! dedicated `rayon` pool and aggregates the outcomes. Every record is detected
//! and validated at its own DDMS version, so a single batch may mix versions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::component::Component;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::file_discovery::FileDiscovery;
use crate::reader::DdmsReader;
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

/// Validation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Number of validation threads
    pub threads: usize,
    /// Stop validating new records once one fails
    pub fail_fast: bool,
    /// Records at any other version are invalid
    pub expected_version: Option<SchemaVersion>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            fail_fast: false,
            expected_version: None,
        }
    }
}

/// Status of a single file validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationStatus {
    /// The record built successfully
    Valid,
    /// The record is malformed or breaks a DDMS rule
    Invalid { error_count: usize },
    /// The record could not be checked (I/O, vocabulary files)
    Error { message: String },
    /// The file is not a DDMS record, or fail-fast stopped the batch
    Skipped { reason: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationStatus::Error { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ValidationStatus::Skipped { .. })
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub status: ValidationStatus,
    /// Detected DDMS version, when the root element was recognised
    pub version: Option<SchemaVersion>,
    pub warnings: Vec<ValidationMessage>,
    pub errors: Vec<ValidationMessage>,
    pub duration: Duration,
}

impl FileValidationResult {
    pub fn valid(
        path: PathBuf,
        version: SchemaVersion,
        warnings: Vec<ValidationMessage>,
        duration: Duration,
    ) -> Self {
        Self {
            path,
            status: ValidationStatus::Valid,
            version: Some(version),
            warnings,
            errors: Vec::new(),
            duration,
        }
    }

    pub fn invalid(
        path: PathBuf,
        version: Option<SchemaVersion>,
        errors: Vec<ValidationMessage>,
        duration: Duration,
    ) -> Self {
        Self {
            path,
            status: ValidationStatus::Invalid {
                error_count: errors.len(),
            },
            version,
            warnings: Vec::new(),
            errors,
            duration,
        }
    }

    pub fn error(path: PathBuf, error: &DdmsError, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Error {
                message: error.to_string(),
            },
            version: None,
            warnings: Vec::new(),
            errors: vec![ValidationMessage::from(error)],
            duration,
        }
    }

    pub fn skipped(path: PathBuf, reason: impl Into<String>, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Skipped {
                reason: reason.into(),
            },
            version: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            duration,
        }
    }

    /// Classify a failed read.
    fn from_error(
        path: PathBuf,
        version: Option<SchemaVersion>,
        error: DdmsError,
        duration: Duration,
    ) -> Self {
        match error {
            DdmsError::InvalidDdms { .. } | DdmsError::XmlParse(_) => {
                Self::invalid(path, version, vec![ValidationMessage::from(&error)], duration)
            }
            DdmsError::SchemaValidation { diagnostics } => {
                let errors = diagnostics
                    .into_iter()
                    .map(|d| ValidationMessage::error(d, ""))
                    .collect();
                Self::invalid(path, version, errors, duration)
            }
            DdmsError::UnsupportedVersion(reason) => Self::skipped(path, reason, duration),
            DdmsError::Vocabulary { .. } | DdmsError::Io { .. } => {
                let mut result = Self::error(path, &error, duration);
                result.version = version;
                result
            }
        }
    }
}

/// Aggregated results of validating multiple files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    pub skipped_files: usize,
    /// Number of warnings across all valid records
    pub warning_count: usize,
    /// Wall-clock time of the whole batch
    pub total_duration: Duration,
    pub average_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
    /// Distinct DDMS versions seen, oldest first
    pub versions_seen: Vec<SchemaVersion>,
}

impl ValidationResults {
    /// Aggregate individual file results into summary
    pub fn aggregate(file_results: Vec<FileValidationResult>, total_duration: Duration) -> Self {
        let total_files = file_results.len();
        let mut valid_files = 0;
        let mut invalid_files = 0;
        let mut error_files = 0;
        let mut skipped_files = 0;
        let mut file_time = Duration::ZERO;
        let mut versions_seen = Vec::new();

        for result in &file_results {
            match result.status {
                ValidationStatus::Valid => valid_files += 1,
                ValidationStatus::Invalid { .. } => invalid_files += 1,
                ValidationStatus::Error { .. } => error_files += 1,
                ValidationStatus::Skipped { .. } => skipped_files += 1,
            }
            file_time += result.duration;
            if let Some(version) = result.version
                && !versions_seen.contains(&version)
            {
                versions_seen.push(version);
            }
        }
        versions_seen.sort();

        let average_duration = if total_files > 0 {
            file_time / total_files as u32
        } else {
            Duration::ZERO
        };

        Self {
            total_files,
            valid_files,
            invalid_files,
            error_files,
            skipped_files,
            warning_count: file_results.iter().map(|r| r.warnings.len()).sum(),
            total_duration,
            average_duration,
            file_results,
            versions_seen,
        }
    }

    /// Check if all files validated successfully
    pub fn all_valid(&self) -> bool {
        self.valid_files == self.total_files && self.total_files > 0
    }

    /// Check if any files had validation errors
    pub fn has_errors(&self) -> bool {
        self.error_files > 0 || self.invalid_files > 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.valid_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Validates batches of DDMS records in parallel.
#[derive(Debug)]
pub struct ValidationEngine {
    reader: DdmsReader,
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(reader: DdmsReader, config: ValidationConfig) -> Self {
        Self { reader, config }
    }

    pub fn reader(&self) -> &DdmsReader {
        &self.reader
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate every record found at `path` (directory or file).
    pub fn validate_path(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
    ) -> Result<ValidationResults> {
        let start = Instant::now();
        let files = file_discovery.discover_files(path)?;
        info!(
            root = %path.display(),
            files = files.len(),
            threads = self.config.threads,
            "starting validation"
        );

        let file_results = self.validate_files(files);
        let results = ValidationResults::aggregate(file_results, start.elapsed());
        info!(
            valid = results.valid_files,
            invalid = results.invalid_files,
            errors = results.error_files,
            skipped = results.skipped_files,
            elapsed_ms = results.total_duration.as_millis() as u64,
            "validation finished"
        );
        Ok(results)
    }

    /// Validate `files` in parallel. Results keep the input order.
    pub fn validate_files(&self, files: Vec<PathBuf>) -> Vec<FileValidationResult> {
        if files.is_empty() {
            return Vec::new();
        }

        let stop = AtomicBool::new(false);
        let run = || {
            files
                .par_iter()
                .map(|path| {
                    if stop.load(Ordering::Relaxed) {
                        return FileValidationResult::skipped(
                            path.clone(),
                            "fail-fast: an earlier record failed",
                            Duration::ZERO,
                        );
                    }
                    let result = self.validate_single_file(path);
                    if self.config.fail_fast
                        && (result.status.is_invalid() || result.status.is_error())
                    {
                        stop.store(true, Ordering::Relaxed);
                    }
                    result
                })
                .collect::<Vec<_>>()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "could not build validation pool, using the global pool");
                run()
            }
        }
    }

    /// Validate one file. Never fails; problems become the result's status.
    pub fn validate_single_file(&self, path: &Path) -> FileValidationResult {
        let start = Instant::now();
        let path_buf = path.to_path_buf();

        let xml = match std::fs::read_to_string(path) {
            Ok(xml) => xml,
            Err(e) => {
                let error = DdmsError::io(path, e);
                warn!(path = %path.display(), error = %error, "could not read record");
                return FileValidationResult::error(path_buf, &error, start.elapsed());
            }
        };

        let outcome = XmlElement::parse(&xml).and_then(|root| {
            let version = DdmsReader::detect_version(&root)?;
            Ok((root, version))
        });
        let (root, version) = match outcome {
            Ok(parsed) => parsed,
            Err(e) => return self.failed(path_buf, None, e, start),
        };

        if let Some(expected) = self.config.expected_version
            && expected != version
        {
            let error = DdmsError::invalid(format!(
                "Expected DDMS {expected} but the record is DDMS {version}."
            ));
            return self.failed(path_buf, Some(version), error, start);
        }

        match self.reader.read_parsed(&root, version, &xml) {
            Ok(resource) => {
                debug!(path = %path.display(), version = %version, "record is valid");
                FileValidationResult::valid(
                    path_buf,
                    version,
                    resource.warnings().to_vec(),
                    start.elapsed(),
                )
            }
            Err(e) => self.failed(path_buf, Some(version), e, start),
        }
    }

    fn failed(
        &self,
        path: PathBuf,
        version: Option<SchemaVersion>,
        error: DdmsError,
        start: Instant,
    ) -> FileValidationResult {
        let result = FileValidationResult::from_error(path, version, error, start.elapsed());
        match &result.status {
            ValidationStatus::Skipped { reason } => {
                debug!(path = %result.path.display(), reason = %reason, "skipping file")
            }
            _ => warn!(
                path = %result.path.display(),
                error = %result.errors.first().map(ToString::to_string).unwrap_or_default(),
                "record failed validation"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MockSchemaValidator, SchemaReport};
    use crate::test_support::{data_dir, minimal_xml};
    use crate::vocabulary::ControlledVocabularies;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn engine(config: ValidationConfig) -> ValidationEngine {
        let reader = DdmsReader::new(Arc::new(ControlledVocabularies::from_directory(data_dir())));
        ValidationEngine::new(reader, config)
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validation_status_predicates() {
        assert!(ValidationStatus::Valid.is_valid());
        assert!(ValidationStatus::Invalid { error_count: 1 }.is_invalid());
        assert!(
            ValidationStatus::Error {
                message: "x".to_string()
            }
            .is_error()
        );
        assert!(
            ValidationStatus::Skipped {
                reason: "x".to_string()
            }
            .is_skipped()
        );
    }

    #[test]
    fn test_valid_record() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ok.xml", &minimal_xml(SchemaVersion::V3_0));

        let result = engine(ValidationConfig::default()).validate_single_file(&path);
        assert!(result.status.is_valid(), "{:?}", result);
        assert_eq!(result.version, Some(SchemaVersion::V3_0));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_invalid_record_is_located() {
        let dir = TempDir::new().unwrap();
        let xml = minimal_xml(SchemaVersion::V4_1).replace("urn:buri:ddmsence:testIdentifier", "");
        let path = write(&dir, "bad.xml", &xml);

        let result = engine(ValidationConfig::default()).validate_single_file(&path);
        assert_eq!(result.status, ValidationStatus::Invalid { error_count: 1 });
        assert_eq!(result.version, Some(SchemaVersion::V4_1));
        assert!(result.errors[0].locator.starts_with("/ddms:resource"));
    }

    #[test]
    fn test_malformed_xml_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.xml", "<ddms:resource");

        let result = engine(ValidationConfig::default()).validate_single_file(&path);
        assert!(result.status.is_invalid());
        assert_eq!(result.version, None);
    }

    #[test]
    fn test_foreign_document_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pom.xml", r#"<project xmlns="http://maven.apache.org/POM/4.0.0"/>"#);

        let result = engine(ValidationConfig::default()).validate_single_file(&path);
        assert!(result.status.is_skipped());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = engine(ValidationConfig::default())
            .validate_single_file(Path::new("/nonexistent/record.xml"));
        assert!(result.status.is_error());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_expected_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "old.xml", &minimal_xml(SchemaVersion::V2_0));
        let config = ValidationConfig {
            expected_version: Some(SchemaVersion::V4_1),
            ..ValidationConfig::default()
        };

        let result = engine(config).validate_single_file(&path);
        assert!(result.status.is_invalid());
        assert_eq!(
            result.errors[0].text,
            "Expected DDMS 4.1 but the record is DDMS 2.0."
        );
    }

    #[test]
    fn test_schema_diagnostics_become_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "schema.xml", &minimal_xml(SchemaVersion::V3_1));

        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .returning(|_, _| SchemaReport::invalid(vec!["one".to_string(), "two".to_string()]));
        let reader = DdmsReader::new(Arc::new(ControlledVocabularies::from_directory(data_dir())))
            .with_schema_validator(Arc::new(validator));
        let engine = ValidationEngine::new(reader, ValidationConfig::default());

        let result = engine.validate_single_file(&path);
        assert_eq!(result.status, ValidationStatus::Invalid { error_count: 2 });
    }

    #[test]
    fn test_mixed_versions_in_parallel() {
        let dir = TempDir::new().unwrap();
        for version in SchemaVersion::ALL {
            write(&dir, &format!("record-{version}.xml"), &minimal_xml(version));
        }
        write(&dir, "notes.txt", "not a record");

        let config = ValidationConfig {
            threads: 4,
            ..ValidationConfig::default()
        };
        let results = engine(config)
            .validate_path(dir.path(), &FileDiscovery::new())
            .unwrap();

        assert_eq!(results.total_files, SchemaVersion::ALL.len());
        assert!(results.all_valid());
        assert_eq!(results.versions_seen, SchemaVersion::ALL.to_vec());
        assert_eq!(results.success_rate(), 100.0);
    }

    #[test]
    fn test_results_keep_input_order() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..8)
            .map(|i| write(&dir, &format!("r{i}.xml"), &minimal_xml(SchemaVersion::V4_0_1)))
            .collect();

        let results = engine(ValidationConfig::default()).validate_files(files.clone());
        let paths: Vec<PathBuf> = results.into_iter().map(|r| r.path).collect();
        assert_eq!(paths, files);
    }

    #[test]
    fn test_fail_fast_skips_remaining_records() {
        let dir = TempDir::new().unwrap();
        let mut files = vec![write(&dir, "a-bad.xml", "<broken")];
        for i in 0..5 {
            files.push(write(&dir, &format!("b{i}.xml"), &minimal_xml(SchemaVersion::V4_1)));
        }
        let config = ValidationConfig {
            threads: 1,
            fail_fast: true,
            ..ValidationConfig::default()
        };

        let results = engine(config).validate_files(files);
        assert!(results[0].status.is_invalid());
        assert!(results[1..].iter().all(|r| r.status.is_skipped()));
    }

    #[test]
    fn test_validation_results_aggregation() {
        let version = SchemaVersion::V3_1;
        let results = ValidationResults::aggregate(
            vec![
                FileValidationResult::valid(
                    PathBuf::from("a.xml"),
                    version,
                    vec![ValidationMessage::warning("w", "/ddms:Resource")],
                    Duration::from_millis(10),
                ),
                FileValidationResult::invalid(
                    PathBuf::from("b.xml"),
                    Some(version),
                    vec![ValidationMessage::error("e", "")],
                    Duration::from_millis(20),
                ),
                FileValidationResult::skipped(PathBuf::from("c.xml"), "not DDMS", Duration::ZERO),
            ],
            Duration::from_millis(25),
        );

        assert_eq!(results.total_files, 3);
        assert_eq!(results.valid_files, 1);
        assert_eq!(results.invalid_files, 1);
        assert_eq!(results.skipped_files, 1);
        assert_eq!(results.warning_count, 1);
        assert_eq!(results.average_duration, Duration::from_millis(10));
        assert_eq!(results.versions_seen, vec![version]);
        assert!(results.has_errors());
        assert!(!results.all_valid());
    }

    #[test]
    fn test_validation_results_empty() {
        let results = ValidationResults::aggregate(Vec::new(), Duration::ZERO);
        assert_eq!(results.total_files, 0);
        assert!(!results.all_valid());
        assert!(!results.has_errors());
        assert_eq!(results.success_rate(), 0.0);
    }

    #[test]
    fn test_validation_config_default() {
        let config = ValidationConfig::default();
        assert!(config.threads >= 1);
        assert!(!config.fail_fast);
        assert!(config.expected_version.is_none());
    }
}
