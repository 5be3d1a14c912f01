use crate::cli::VerbosityLevel;
use crate::config::ConfigError;
use crate::error::DdmsError;

/// Reports fatal errors on stderr with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    pub fn with_timestamps(mut self, show_timestamps: bool) -> Self {
        self.show_timestamps = show_timestamps;
        self
    }

    pub fn report_error(&self, error: &DdmsError) {
        eprintln!("{}", self.format_error(error));
    }

    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    pub fn format_error(&self, error: &DdmsError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("ERROR: {}", error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => {
                format!("{}\nDebug Info: {:?}", self.format_error_verbose(error), error)
            }
        }
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => format!(
                "Configuration Error: {}\n{}",
                error,
                config_help(error)
            ),
            VerbosityLevel::Debug => format!(
                "Configuration Error: {}\nDebug: {:?}\n{}",
                error,
                error,
                config_help(error)
            ),
        }
    }

    fn format_error_normal(&self, error: &DdmsError) -> String {
        let timestamp = if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        };
        format!("{}{}", timestamp, error)
    }

    fn format_error_verbose(&self, error: &DdmsError) -> String {
        let mut output = self.format_error_normal(error);
        let suggestion = match error {
            DdmsError::Vocabulary { .. } => {
                Some("Check that --vocabularies points at the controlled vocabulary files")
            }
            DdmsError::UnsupportedVersion(_) => {
                Some("Supported DDMS versions are 2.0, 3.0, 3.1, 4.0.1 and 4.1")
            }
            DdmsError::Io { .. } => Some("Check that the path exists and is readable"),
            DdmsError::XmlParse(_) => Some("Check the XML syntax of the record"),
            DdmsError::InvalidDdms { .. } | DdmsError::SchemaValidation { .. } => None,
        };
        if let Some(suggestion) = suggestion {
            output.push_str("\nSuggestion: ");
            output.push_str(suggestion);
        }
        output
    }
}

fn config_help(error: &ConfigError) -> &'static str {
    match error {
        ConfigError::Io(_) => "Check that the configuration file exists and is readable",
        ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
            "Check the configuration file syntax (TOML/JSON format expected)"
        }
        ConfigError::UnsupportedFormat(_) => "Use a .toml or .json configuration file",
        ConfigError::Environment(_) => "Fix or unset the DDMS_VALIDATE_* environment variable",
        ConfigError::Validation(_) => {
            "Resolve conflicting values between file, environment, and CLI"
        }
    }
}
