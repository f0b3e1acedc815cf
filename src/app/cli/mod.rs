//! CLI Adapter.

mod chat;
mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::app::JudgeMode;
use crate::domain::AppError;

const LOG_ENV: &str = "SOCRA_LOG";

#[derive(Parser)]
#[command(name = "socra")]
#[command(version)]
#[command(
    about = "Socratic economics tutor for STEM students",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./socra.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Concept bank JSON file (defaults to the built-in bank)
    #[arg(short, long, global = true)]
    bank: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive tutoring session
    #[clap(visible_alias = "c")]
    Chat {
        /// Your primary discipline, e.g. "mechanical engineering"
        #[arg(short, long)]
        discipline: Option<String>,
        /// Opening message; prompted for when omitted
        #[arg(short, long)]
        message: Option<String>,
        /// Print composed prompts instead of calling the completion service
        #[arg(long)]
        dry_run: bool,
        /// How replies are judged before advancing
        #[arg(long, value_enum, default_value_t = JudgeMode::KeyTerms)]
        judge: JudgeMode,
    },
    /// List the concepts in the bank
    #[clap(visible_alias = "ls")]
    Concepts,
    /// Show which concept a statement matches
    #[clap(visible_alias = "m")]
    Match {
        /// Student statement to classify
        text: String,
    },
    /// Print the four-section explanation for a concept
    #[clap(visible_alias = "e")]
    Explain {
        /// Concept name as listed by `socra concepts`
        concept: String,
        /// Discipline used to phrase the explanation
        #[arg(short, long, default_value = "")]
        discipline: String,
        /// Student statement the explanation responds to
        #[arg(short, long, default_value = "")]
        text: String,
    },
    /// Validate the configuration and concept bank
    Check,
}

/// Entry point for the CLI.
pub fn run() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<(), AppError> = load_context(&cli).and_then(|ctx| match cli.command {
        Commands::Chat { discipline, message, dry_run, judge } => {
            chat::run_chat(&ctx, discipline, message, dry_run, judge)
        }
        Commands::Concepts => inspect::run_concepts(&ctx),
        Commands::Match { text } => inspect::run_match(&ctx, &text),
        Commands::Explain { concept, discipline, text } => {
            inspect::run_explain(&ctx, &concept, &discipline, &text)
        }
        Commands::Check => inspect::run_check(&ctx),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_context(cli: &Cli) -> Result<AppContext, AppError> {
    let dir = std::env::current_dir()?;
    AppContext::load(cli.config.as_deref(), cli.bank.as_deref(), &dir)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
