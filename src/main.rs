#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subpair::app_config::{self, Config, ExportFormat, TranslationProvider};
use subpair::app_controller::Controller;
use subpair::providers::mock::MockProvider;
use subpair::translation::TranslationService;

/// CLI wrapper for the backend choice
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTranslationProvider {
    Deepl,
    Ollama,
    /// Offline backend that tags each line with the target code
    Mock,
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    Html,
    Anki,
    Json,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(format: CliExportFormat) -> Self {
        match format {
            CliExportFormat::Html => ExportFormat::Html,
            CliExportFormat::Anki => ExportFormat::Anki,
            CliExportFormat::Json => ExportFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate subtitle files (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for subpair
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name (Ollama)
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ru', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output format, repeatable
    #[arg(long = "format", value_enum)]
    formats: Vec<CliExportFormat>,

    /// Directory for outputs (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translate every cue on its own instead of merging sentences
    #[arg(long)]
    no_merge: bool,

    /// Print blocks and batches without translating
    #[arg(long)]
    plan_only: bool,
}

/// subpair - bilingual subtitle tables and flashcards
///
/// Merges SRT cues into sentences, translates them in bounded batches and
/// writes original/translation pairs as HTML, an Anki deck or JSON.
#[derive(Parser, Debug)]
#[command(name = "subpair")]
#[command(version)]
#[command(about = "Bilingual subtitle tables and flashcards")]
#[command(long_about = "subpair turns SRT subtitles into original/translation pairs.

EXAMPLES:
    subpair movie.srt                         # Translate using conf.json
    subpair -t de movie.srt                   # Translate to German
    subpair --format html --format anki a.srt # HTML table and Anki deck
    subpair -p ollama -m llama3 movie.srt     # Use a local Ollama model
    subpair --plan-only movie.srt             # Show blocks and batches only
    subpair /subs/                            # Process a whole directory
    subpair completions bash > subpair.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. A default file is
    created when missing. The DeepL key may be given in the config or in
    the SUBPAIR_API_KEY or DEEPL_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name (Ollama)
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ru', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output format, repeatable
    #[arg(long = "format", value_enum)]
    formats: Vec<CliExportFormat>,

    /// Directory for outputs (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translate every cue on its own instead of merging sentences
    #[arg(long)]
    no_merge: bool,

    /// Print blocks and batches without translating
    #[arg(long)]
    plan_only: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subpair", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Top-level args behave like the translate subcommand
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            let args = TranslateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                config_path: cli.config_path,
                log_level: cli.log_level,
                formats: cli.formats,
                output_dir: cli.output_dir,
                no_merge: cli.no_merge,
                plan_only: cli.plan_only,
            };
            run_translate(args).await
        }
    }
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = options.provider {
        match provider {
            CliTranslationProvider::Deepl => config.translation.provider = TranslationProvider::DeepL,
            CliTranslationProvider::Ollama => config.translation.provider = TranslationProvider::Ollama,
            CliTranslationProvider::Mock => {}
        }
    }
    if let Some(model) = &options.model {
        config.translation.set_model(model.clone());
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
    if !options.formats.is_empty() {
        config.export.formats = options.formats.iter().map(|f| (*f).into()).collect();
    }
    if options.no_merge {
        config.segmentation.merge_cues = false;
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(level) = options.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    let use_mock = matches!(options.provider, Some(CliTranslationProvider::Mock));
    if use_mock || options.plan_only {
        // The backend is not contacted, so a missing API key is fine here
        let mut check = config.clone();
        check.translation.provider = TranslationProvider::Ollama;
        check.validate().context("Configuration validation failed")?;
    } else {
        config.validate().context("Configuration validation failed")?;
    }

    if options.plan_only {
        let controller = Controller::planner(config);
        let files = if options.input_path.is_dir() {
            subpair::file_utils::FileManager::find_files(&options.input_path, "srt")?
        } else {
            vec![options.input_path.clone()]
        };
        for file in files {
            let plan = controller.plan(&file)?;
            print!("{}", plan.describe());
        }
        return Ok(());
    }

    let controller = if use_mock {
        warn!("Using the mock backend: outputs will not contain real translations");
        let service = TranslationService::from_mock(MockProvider::working(), &config);
        Controller::with_service(config, service)
    } else {
        Controller::with_config(config)?
    };

    if options.input_path.is_file() {
        let output_dir = options.output_dir.clone().unwrap_or_else(|| {
            options
                .input_path
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf()
        });
        controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        let summary = controller
            .run_folder(options.input_path.clone(), options.output_dir.clone(), options.force_overwrite)
            .await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed, see the issues log", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}
