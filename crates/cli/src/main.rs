// ctrsum CLI - per-company CTR summaries from monthly keyword spreadsheets

mod companies;
mod exit_codes;
mod process;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use exit_codes::{EXIT_AI_DISABLED, EXIT_AI_MISSING_KEY, EXIT_CONFIG_STORE, EXIT_ERROR, EXIT_OUTPUT_WRITE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "ctrsum")]
#[command(about = "Summarize search volume, traffic and CTR per company across keyword spreadsheets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log progress (info level). RUST_LOG overrides
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process spreadsheet files into a CTR summary workbook
    #[command(after_help = "\
Examples:
  ctrsum process ./reports
  ctrsum process jan.xlsx feb.xlsx --output q1.xlsx
  ctrsum process ./reports --heuristic --no-learn --json")]
    Process(ProcessArgs),

    /// Manage the company dictionary (company_config.json)
    #[command(subcommand)]
    Companies(CompanyCommands),

    /// AI classifier configuration
    #[command(subcommand)]
    Ai(AiCommands),
}

#[derive(Args)]
pub(crate) struct ProcessArgs {
    /// Spreadsheet files or directories (first sheet of each file is read)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Summary workbook path [default: CTR_Summary.xlsx]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Company config path [default: company_config.json]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fall back to the most frequent capitalized keyword
    #[arg(long)]
    pub heuristic: bool,

    /// Ask the AI classifier first
    #[arg(long)]
    pub ai: bool,

    /// API key for the AI classifier [default: keychain, then CTRSUM_OPENAI_KEY]
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model for the AI classifier
    #[arg(long)]
    pub model: Option<String>,

    /// Do not save newly detected companies
    #[arg(long)]
    pub no_learn: bool,

    /// Use the company config read-only for this run
    #[arg(long)]
    pub no_persist: bool,

    /// Print the batch report as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit 4 if any input file was skipped
    #[arg(long)]
    pub strict: bool,

    /// Do not print summary tables
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// List companies and their indicator phrases
    List {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a company, or replace its phrases
    Add {
        name: String,

        /// Indicator phrases (matched case-insensitively as substrings)
        #[arg(required = true)]
        phrases: Vec<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove a company
    Remove {
        name: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Check AI configuration and key presence
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[cfg(feature = "ai")]
const AI_FEATURE: &str = "enabled";

#[cfg(not(feature = "ai"))]
const AI_FEATURE: &str = "disabled";

fn long_version() -> &'static str {
    if cfg!(feature = "ai") {
        concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")", "\nai:      enabled")
    } else {
        concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")", "\nai:      disabled")
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Process(args) => process::cmd_process(args),
        Commands::Companies(cmd) => match cmd {
            CompanyCommands::List { config, json } => companies::cmd_list(config, json),
            CompanyCommands::Add { name, phrases, config } => companies::cmd_add(config, name, phrases),
            CompanyCommands::Remove { name, config } => companies::cmd_remove(config, name),
        },
        Commands::Ai(AiCommands::Doctor { json }) => cmd_ai_doctor(json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT_WRITE, message: msg.into(), hint: None }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG_STORE, message: msg.into(), hint: None }
    }

    pub fn ai_disabled(msg: impl Into<String>) -> Self {
        Self { code: EXIT_AI_DISABLED, message: msg.into(), hint: None }
    }

    pub fn ai_missing_key(msg: impl Into<String>) -> Self {
        Self { code: EXIT_AI_MISSING_KEY, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// ai doctor
// ============================================================================

fn cmd_ai_doctor(json: bool) -> Result<(), CliError> {
    use ctrsum_config::ai::{AIConfigStatus, AIDiagnostics, ResolvedAIConfig};
    use ctrsum_config::settings::Settings;

    let settings = Settings::load();
    let config = ResolvedAIConfig::from_settings(&settings.ai);
    let diag = AIDiagnostics::from_resolved(&config);

    if json {
        let mut value = serde_json::to_value(&diag).map_err(|e| CliError::general(e.to_string()))?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("schema_version".to_string(), serde_json::json!(1));
            obj.insert("ai_feature".to_string(), serde_json::json!(AI_FEATURE));
            obj.insert("settings_path".to_string(), serde_json::json!(Settings::config_path().display().to_string()));
        }
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", diag);
        println!("Settings:          {}", Settings::config_path().display());
        if !cfg!(feature = "ai") {
            println!();
            println!("This build has no AI support (rebuild with --features ai).");
        }
    }

    match config.status {
        AIConfigStatus::Ready if cfg!(feature = "ai") => Ok(()),
        AIConfigStatus::Ready => Err(CliError::ai_disabled("AI support not compiled in")),
        AIConfigStatus::Disabled => Err(CliError::ai_disabled("AI is disabled")
            .with_hint(format!("set ai.provider to \"openai\" in {}", Settings::config_path().display()))),
        AIConfigStatus::MissingKey => Err(CliError::ai_missing_key("AI misconfigured: missing API key")
            .with_hint(format!("set {} or store the key in the system keychain", ctrsum_config::ai::env_var_name("openai")))),
    }
}
