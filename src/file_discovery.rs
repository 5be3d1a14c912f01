use crate::config::{ConfigError, FileConfig};
use crate::error::{DdmsError, Result};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds candidate records below a directory.
///
/// Include patterns whitelist files; exclude patterns are applied on top. Both
/// are gitignore-style globs relative to the directory being walked.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// File extensions to include (e.g., ["xml"])
    extensions: Vec<String>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Discovery settings from the `[files]` configuration section.
    pub fn from_config(files: &FileConfig) -> std::result::Result<Self, ConfigError> {
        Self::new()
            .with_extensions(files.extensions.clone())
            .with_include_patterns(files.include_patterns.clone())?
            .with_exclude_patterns(files.exclude_patterns.clone())
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_include_patterns(
        mut self,
        patterns: Vec<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.include_patterns = patterns;
        self.overrides(Path::new("."))?;
        Ok(self)
    }

    pub fn with_exclude_patterns(
        mut self,
        patterns: Vec<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.exclude_patterns = patterns;
        self.overrides(Path::new("."))?;
        Ok(self)
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn overrides(&self, root: &Path) -> std::result::Result<Override, ConfigError> {
        let mut builder = OverrideBuilder::new(root);
        let excludes = self.exclude_patterns.iter().map(|p| format!("!{p}"));
        for pattern in self.include_patterns.iter().cloned().chain(excludes) {
            builder.add(&pattern).map_err(|e| {
                ConfigError::Validation(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        }
        builder
            .build()
            .map_err(|e| ConfigError::Validation(format!("Failed to build glob set: {}", e)))
    }

    /// Files to validate under `path`, sorted.
    ///
    /// A path naming a single file is returned as-is when its extension matches;
    /// patterns only filter directory walks.
    pub fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(path).map_err(|e| DdmsError::io(path, e))?;
        if metadata.is_file() {
            return Ok(if self.should_process(path) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let overrides = self
            .overrides(path)
            .map_err(|e| DdmsError::io(path, std::io::Error::other(e.to_string())))?;
        let walker = WalkBuilder::new(path)
            .standard_filters(false)
            .follow_links(self.follow_symlinks)
            .max_depth(self.max_depth.map(|depth| depth + 1))
            .overrides(overrides)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|t| t.is_file());
                    if is_file && self.should_process(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }
        files.sort();
        debug!(root = %path.display(), found = files.len(), "file discovery finished");
        Ok(files)
    }

    /// Extension check only.
    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("subdir1")).unwrap();
        fs::create_dir_all(root.join("subdir2/nested")).unwrap();

        fs::write(root.join("file1.xml"), "<record/>").unwrap();
        fs::write(root.join("file2.XML"), "<record/>").unwrap();
        fs::write(root.join("file3.txt"), "text file").unwrap();
        fs::write(root.join("subdir1/nested.xml"), "<record/>").unwrap();
        fs::write(root.join("subdir2/nested/deep.xml"), "<record/>").unwrap();
        fs::write(root.join("subdir2/nested/other.ddms"), "<record/>").unwrap();

        temp_dir
    }

    fn names(files: &[PathBuf]) -> HashSet<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_discover_xml_files() {
        let temp_dir = create_test_directory();
        let files = FileDiscovery::new().discover_files(temp_dir.path()).unwrap();

        assert_eq!(files.len(), 4);
        let file_names = names(&files);
        assert!(file_names.contains("file1.xml"));
        assert!(file_names.contains("file2.XML"));
        assert!(file_names.contains("nested.xml"));
        assert!(file_names.contains("deep.xml"));
    }

    #[test]
    fn test_results_are_sorted() {
        let temp_dir = create_test_directory();
        let files = FileDiscovery::new().discover_files(temp_dir.path()).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_discover_multiple_extensions() {
        let temp_dir = create_test_directory();
        let discovery =
            FileDiscovery::new().with_extensions(vec!["xml".to_string(), "ddms".to_string()]);

        let files = discovery.discover_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_max_depth_limit() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new().with_max_depth(Some(1));

        let files = discovery.discover_files(temp_dir.path()).unwrap();

        // Root: file1.xml, file2.XML. Depth 1: subdir1/nested.xml.
        let file_names = names(&files);
        assert_eq!(files.len(), 3);
        assert!(file_names.contains("nested.xml"));
        assert!(!file_names.contains("deep.xml"));
    }

    #[test]
    fn test_include_patterns() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new()
            .with_include_patterns(vec!["**/nested*".to_string()])
            .unwrap();

        let files = discovery.discover_files(temp_dir.path()).unwrap();
        assert_eq!(names(&files), HashSet::from(["nested.xml".to_string()]));
    }

    #[test]
    fn test_exclude_patterns() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new()
            .with_exclude_patterns(vec!["subdir2/**".to_string()])
            .unwrap();

        let files = discovery.discover_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(!names(&files).contains("deep.xml"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileDiscovery::new().with_include_patterns(vec!["records/[".to_string()]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_single_file() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new();

        let file = temp_dir.path().join("file1.xml");
        assert_eq!(discovery.discover_files(&file).unwrap(), vec![file]);

        let text = temp_dir.path().join("file3.txt");
        assert!(discovery.discover_files(&text).unwrap().is_empty());
    }

    #[test]
    fn test_should_process() {
        let discovery = FileDiscovery::new();

        assert!(discovery.should_process(Path::new("record.xml")));
        assert!(discovery.should_process(Path::new("RECORD.XML")));
        assert!(!discovery.should_process(Path::new("record.txt")));
        assert!(!discovery.should_process(Path::new("record")));
    }

    #[test]
    fn test_from_config() {
        let files = FileConfig {
            extensions: vec!["DDMS".to_string()],
            include_patterns: vec![],
            exclude_patterns: vec![],
        };
        let discovery = FileDiscovery::from_config(&files).unwrap();
        assert!(discovery.should_process(Path::new("a.ddms")));
        assert!(!discovery.should_process(Path::new("a.xml")));
    }

    #[test]
    fn test_nonexistent_directory() {
        let result = FileDiscovery::new().discover_files(Path::new("/nonexistent/path"));
        assert!(matches!(result, Err(DdmsError::Io { .. })));
    }
}
