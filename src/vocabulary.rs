//! Controlled Vocabulary Enumerations (CVEs).
//!
//! ISM attribute values are checked against externally supplied vocabulary files.
//! Each file holds a list of terms; a term is either a literal token or, when
//! flagged with `regularExpression="true"`, a pattern that must match the whole
//! candidate.
//!
//! Vocabularies are loaded lazily through a [`VocabularyLoader`] and cached per
//! `(location, key)` in a `moka` cache, which guarantees that concurrent first
//! requests for the same key load the file only once.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use moka::sync::Cache;
use regex::Regex;
use tracing::debug;

use crate::error::{DdmsError, Result};
use crate::version::SchemaVersion;

pub const CLASSIFICATION_ALL: &str = "CVEnumISMClassificationAll";
pub const OWNER_PRODUCER: &str = "CVEnumISMOwnerProducer";
pub const SCI_CONTROLS: &str = "CVEnumISMSCIControls";
pub const SAR_IDENTIFIER: &str = "CVEnumISMSAR";
pub const DISSEMINATION_CONTROLS: &str = "CVEnumISMDissem";
pub const FGI_SOURCE_OPEN: &str = "CVEnumISMFGIOpen";
pub const FGI_SOURCE_PROTECTED: &str = "CVEnumISMFGIProtected";
pub const RELEASABLE_TO: &str = "CVEnumISMRelTo";
pub const NON_IC_MARKINGS: &str = "CVEnumISMNonIC";
pub const DECLASS_EXCEPTION: &str = "CVEnumISMDeclassException";
pub const SOURCE_MARKED: &str = "CVEnumISMSourceMarked";
pub const ATOMIC_ENERGY_MARKINGS: &str = "CVEnumISMAtomicEnergyMarkings";
pub const DISPLAY_ONLY_TO: &str = "CVEnumISMDisplayOnlyTo";
pub const NON_US_CONTROLS: &str = "CVEnumISMNonUSControls";
pub const COMPLIES_WITH: &str = "CVEnumISMCompliesWith";
pub const NOTICE: &str = "CVEnumISMNotice";

/// Key of the fixed, version-independent network vocabulary.
pub const NETWORK: &str = "network";

const NETWORK_TOKENS: [&str; 8] = [
    "NIPRNet",
    "SIPRNet",
    "JWICS",
    "ADSN",
    "StoneGhost",
    "LOCAL-NETWORK",
    "NSANet",
    "other",
];

const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// A loaded vocabulary: literal tokens plus whole-string patterns.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    key: String,
    literals: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl Vocabulary {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            literals: BTreeSet::new(),
            patterns: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn add_literal(&mut self, token: impl Into<String>) {
        self.literals.insert(token.into());
    }

    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored).map_err(|e| DdmsError::Vocabulary {
            key: self.key.clone(),
            details: format!("Invalid pattern '{}': {}", pattern, e),
        })?;
        self.patterns.push(regex);
        Ok(())
    }

    /// Parse the `Enumeration/Term/Value` grammar. Element namespaces are ignored.
    pub fn from_document(key: &str, text: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(text).map_err(|e| DdmsError::Vocabulary {
            key: key.to_string(),
            details: format!("Malformed vocabulary file: {}", e),
        })?;

        let mut vocabulary = Vocabulary::new(key);
        let terms = document
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Enumeration")
            .flat_map(|enumeration| enumeration.children())
            .filter(|n| n.is_element() && n.tag_name().name() == "Term");

        for term in terms {
            for value in term
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "Value")
            {
                let token = value.text().unwrap_or_default().trim();
                if token.is_empty() {
                    continue;
                }
                if value.attribute("regularExpression") == Some("true") {
                    vocabulary.add_pattern(token)?;
                } else {
                    vocabulary.add_literal(token);
                }
            }
        }
        Ok(vocabulary)
    }

    /// Exact literal match, or a full match of any pattern.
    pub fn contains(&self, candidate: &str) -> bool {
        self.literals.contains(candidate) || self.patterns.iter().any(|p| p.is_match(candidate))
    }

    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.literals.iter().map(String::as_str)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Source of vocabulary documents.
pub trait VocabularyLoader: Send + Sync {
    /// Load vocabulary `key` from `location`.
    fn load(&self, location: &str, key: &str) -> Result<Vocabulary>;
}

/// Reads `<location>/<key>.xml` from disk.
#[derive(Debug, Clone, Default)]
pub struct FileVocabularyLoader;

impl FileVocabularyLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn file_path(location: &str, key: &str) -> PathBuf {
        Path::new(location).join(format!("{}.xml", key))
    }
}

impl VocabularyLoader for FileVocabularyLoader {
    fn load(&self, location: &str, key: &str) -> Result<Vocabulary> {
        let path = Self::file_path(location, key);
        let text = std::fs::read_to_string(&path).map_err(|e| DdmsError::Vocabulary {
            key: key.to_string(),
            details: format!("Cannot read {}: {}", path.display(), e),
        })?;
        Vocabulary::from_document(key, &text)
    }
}

/// Serves vocabulary documents held in memory, keyed by `(location, key)`.
#[derive(Debug, Clone, Default)]
pub struct StaticVocabularyLoader {
    documents: HashMap<(String, String), String>,
}

impl StaticVocabularyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: &str, key: &str, document: impl Into<String>) {
        self.documents
            .insert((location.to_string(), key.to_string()), document.into());
    }

    pub fn with_document(mut self, location: &str, key: &str, document: impl Into<String>) -> Self {
        self.insert(location, key, document);
        self
    }
}

impl VocabularyLoader for StaticVocabularyLoader {
    fn load(&self, location: &str, key: &str) -> Result<Vocabulary> {
        let document = self
            .documents
            .get(&(location.to_string(), key.to_string()))
            .ok_or_else(|| DdmsError::Vocabulary {
                key: key.to_string(),
                details: format!("No vocabulary registered at {}", location),
            })?;
        Vocabulary::from_document(key, document)
    }
}

/// The vocabulary validation engine.
///
/// Thread-safe: the configured root sits behind a lock and the cache is a
/// concurrent `moka` cache. Keys include the resolved location, so switching
/// between schema versions never observes another version's vocabulary.
pub struct ControlledVocabularies {
    root: RwLock<String>,
    loader: Arc<dyn VocabularyLoader>,
    cache: Cache<(String, String), Arc<Vocabulary>>,
}

impl std::fmt::Debug for ControlledVocabularies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlledVocabularies")
            .field("root", &self.root())
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl ControlledVocabularies {
    pub fn new(root: impl Into<String>, loader: Arc<dyn VocabularyLoader>) -> Self {
        Self {
            root: RwLock::new(root.into()),
            loader,
            cache: Cache::builder().max_capacity(DEFAULT_CACHE_CAPACITY).build(),
        }
    }

    /// Engine reading vocabulary files below `root` on disk.
    pub fn from_directory(root: impl AsRef<Path>) -> Self {
        Self::new(
            root.as_ref().to_string_lossy().into_owned(),
            Arc::new(FileVocabularyLoader::new()),
        )
    }

    pub fn root(&self) -> String {
        self.root
            .read()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Change the configured root. Cached vocabularies are evicted when the value
    /// actually changes and rebuilt lazily on next use.
    pub fn set_root(&self, root: impl Into<String>) {
        let root = root.into();
        let mut guard = self
            .root
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *guard != root {
            let old = guard.clone();
            debug!(old = %old, new = %root, "vocabulary root changed, evicting cache");
            *guard = root;
            self.cache.invalidate_all();
        }
    }

    /// The location string for `version`'s vocabulary files.
    pub fn location_for(&self, version: SchemaVersion) -> String {
        let root = self.root();
        let root = root.trim_end_matches('/');
        if root.is_empty() {
            version.vocabulary_location().to_string()
        } else {
            format!("{}/{}", root, version.vocabulary_location())
        }
    }

    /// Fetch (loading on first use) vocabulary `key` for `version`.
    pub fn vocabulary(&self, version: SchemaVersion, key: &str) -> Result<Arc<Vocabulary>> {
        let location = self.location_for(version);
        let cache_key = (location.clone(), key.to_string());
        self.cache
            .try_get_with(cache_key, || {
                debug!(%location, key, "loading controlled vocabulary");
                self.loader.load(&location, key).map(Arc::new)
            })
            .map_err(|e| (*e).clone())
    }

    /// Validate one token against vocabulary `key`.
    pub fn validate(&self, version: SchemaVersion, key: &str, candidate: &str) -> Result<()> {
        let valid = if key == NETWORK {
            NETWORK_TOKENS.contains(&candidate)
        } else {
            self.vocabulary(version, key)?.contains(candidate)
        };
        if valid {
            Ok(())
        } else {
            Err(DdmsError::invalid(format!(
                "{} is not a valid enumeration token for this attribute, as specified in {}.",
                candidate, key
            )))
        }
    }

    /// Validate every whitespace-delimited token of `value`.
    pub fn validate_list(&self, version: SchemaVersion, key: &str, value: &str) -> Result<()> {
        for token in value.split_whitespace() {
            self.validate(version, key, token)?;
        }
        Ok(())
    }

    pub fn cached_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAR_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cve:CVE xmlns:cve="urn:us:gov:ic:cve">
  <cve:Enumeration>
    <cve:Term><cve:Value>SAR-BRAVO</cve:Value></cve:Term>
    <cve:Term><cve:Value regularExpression="true">SAR-[A-Z]{2,3}</cve:Value></cve:Term>
  </cve:Enumeration>
</cve:CVE>"#;

    struct CountingLoader {
        inner: StaticVocabularyLoader,
        loads: AtomicUsize,
    }

    impl VocabularyLoader for CountingLoader {
        fn load(&self, location: &str, key: &str) -> Result<Vocabulary> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(location, key)
        }
    }

    fn counting(root: &str) -> (Arc<CountingLoader>, ControlledVocabularies) {
        let location = format!("{}/{}", root, SchemaVersion::V4_1.vocabulary_location());
        let loader = Arc::new(CountingLoader {
            inner: StaticVocabularyLoader::new().with_document(&location, SAR_IDENTIFIER, SAR_DOCUMENT),
            loads: AtomicUsize::new(0),
        });
        let engine = ControlledVocabularies::new(root, loader.clone());
        (loader, engine)
    }

    #[test]
    fn test_parse_literals_and_patterns() {
        let vocabulary = Vocabulary::from_document(SAR_IDENTIFIER, SAR_DOCUMENT).unwrap();
        assert_eq!(vocabulary.literals().collect::<Vec<_>>(), vec!["SAR-BRAVO"]);
        assert_eq!(vocabulary.pattern_count(), 1);
        assert!(vocabulary.contains("SAR-BRAVO"));
        assert!(vocabulary.contains("SAR-AB"));
        assert!(!vocabulary.contains("SAR-ABCD"), "patterns must match the whole string");
        assert!(!vocabulary.contains("xSAR-AB"));
    }

    #[test]
    fn test_bad_pattern_is_a_vocabulary_error() {
        let doc = r#"<CVE><Enumeration><Term><Value regularExpression="true">([</Value></Term></Enumeration></CVE>"#;
        let err = Vocabulary::from_document("Broken", doc).unwrap_err();
        assert!(matches!(err, DdmsError::Vocabulary { key, .. } if key == "Broken"));
    }

    #[test]
    fn test_validate_names_key_and_candidate() {
        let (_, engine) = counting("/cve");
        engine.validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-XY").unwrap();
        let err = engine
            .validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "nope")
            .unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(
            err.message(),
            "nope is not a valid enumeration token for this attribute, as specified in CVEnumISMSAR."
        );
    }

    #[test]
    fn test_validate_list_checks_every_token() {
        let (_, engine) = counting("/cve");
        engine
            .validate_list(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB  SAR-BRAVO")
            .unwrap();
        assert!(engine
            .validate_list(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB bad")
            .is_err());
    }

    #[test]
    fn test_vocabulary_loaded_once_and_evicted_on_root_change() {
        let (loader, engine) = counting("/cve");
        for _ in 0..3 {
            engine.validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB").unwrap();
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

        engine.set_root("/cve");
        engine.validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB").unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1, "same root keeps the cache");

        engine.set_root("/elsewhere");
        let err = engine
            .validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB")
            .unwrap_err();
        assert!(matches!(err, DdmsError::Vocabulary { .. }));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);

        engine.set_root("/cve");
        engine.validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-AB").unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 3, "eviction forces a reload");
    }

    #[test]
    fn test_failed_loads_are_not_cached() {
        let (loader, engine) = counting("/cve");
        assert!(engine.validate(SchemaVersion::V3_0, SAR_IDENTIFIER, "SAR-AB").is_err());
        assert!(engine.validate(SchemaVersion::V3_0, SAR_IDENTIFIER, "SAR-AB").is_err());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_network_vocabulary_is_fixed() {
        let engine = ControlledVocabularies::new("", Arc::new(StaticVocabularyLoader::new()));
        for version in SchemaVersion::ALL {
            engine.validate(version, NETWORK, "SIPRNet").unwrap();
        }
        assert!(engine.validate(SchemaVersion::V4_1, NETWORK, "Internet").is_err());
    }

    #[test]
    fn test_location_for_joins_root() {
        let engine = ControlledVocabularies::new("/data/", Arc::new(StaticVocabularyLoader::new()));
        assert_eq!(
            engine.location_for(SchemaVersion::V3_1),
            "/data/schemas/3.1/ISM/CVE"
        );
        engine.set_root("");
        assert_eq!(engine.location_for(SchemaVersion::V2_0), "schemas/2.0/ISM/CVE");
    }

    #[test]
    fn test_file_loader_reads_from_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let location = temp_dir.path().join(SchemaVersion::V4_1.vocabulary_location());
        std::fs::create_dir_all(&location).unwrap();
        std::fs::write(location.join("CVEnumISMSAR.xml"), SAR_DOCUMENT).unwrap();

        let engine = ControlledVocabularies::from_directory(temp_dir.path());
        engine.validate(SchemaVersion::V4_1, SAR_IDENTIFIER, "SAR-QQ").unwrap();
        let err = engine
            .validate(SchemaVersion::V4_1, DISSEMINATION_CONTROLS, "FOUO")
            .unwrap_err();
        assert!(err.to_string().contains("CVEnumISMDissem"));
    }
}
