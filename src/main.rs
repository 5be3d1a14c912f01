use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ddms_validate::{
    Cli, Component, Config, ConfigManager, ControlledVocabularies, DdmsReader, ErrorReporter,
    FileDiscovery, Output, OutputFormat, ValidationConfig, ValidationEngine, VerbosityLevel,
};

fn init_logging(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbosity());

    let reporter = ErrorReporter::new(cli.verbosity());
    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return ExitCode::FAILURE;
    }

    let config = match ConfigManager::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            reporter.report_config_error(&e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Validate everything under the CLI path. `Ok(true)` when no record failed.
fn run(cli: &Cli, config: &Config) -> Result<bool> {
    let vocabularies = Arc::new(ControlledVocabularies::from_directory(
        &config.vocabulary.root,
    ));
    let reader = DdmsReader::new(vocabularies);
    let engine = ValidationEngine::new(
        reader.clone(),
        ValidationConfig {
            threads: ConfigManager::get_thread_count(config),
            fail_fast: config.validation.fail_fast,
            expected_version: config.validation.version,
        },
    );
    let discovery = FileDiscovery::from_config(&config.files)?;
    debug!(root = %config.vocabulary.root.display(), "vocabulary root");

    let results = engine
        .validate_path(&cli.path, &discovery)
        .with_context(|| format!("validating {}", cli.path.display()))?;

    let verbosity = VerbosityLevel::from_flags(config.output.verbose, config.output.quiet);
    let output = Output::new(OutputFormat::from(config.output.format), verbosity);
    print!("{}", output.render(&results));

    if let Some(format) = config.output.render
        && cli.path.is_file()
    {
        if !results.all_valid() {
            bail!("{} is not a valid record, nothing to render", cli.path.display());
        }
        let resource = reader
            .read_file(&cli.path)
            .with_context(|| format!("rendering {}", cli.path.display()))?;
        println!();
        print!("{}", resource.render(format));
    }

    Ok(!results.has_errors())
}
