//! CLI parse: clap types for kcl-compose. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kcl-compose - generate, parse and validate KCL component frames
#[derive(Parser, Debug)]
#[command(name = "kcl-compose")]
#[command(about = "Generate, parse and validate KCL component frames")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a raw model response (one or more frames)
    Validate {
        /// File holding the response
        file: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Also run the density heuristic
        #[arg(long)]
        density: bool,
    },
    /// Parse a raw model response and print its frames as JSON
    Parse {
        /// File holding the response
        file: PathBuf,
    },
    /// Detect the outline phase of a conversation
    Phase {
        /// The user's latest message
        prompt: String,
        /// JSON file with prior turns: [{"role": "user"|"assistant", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Generate frames with the configured provider
    Generate {
        /// Instruction for the model
        prompt: String,
        /// Provider name from [providers]
        #[arg(long)]
        provider: Option<String>,
        /// Model override
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Deck title
        #[arg(long)]
        title: Option<String>,
        /// Composition mode
        #[arg(long)]
        mode: Option<String>,
        /// Surface identifier
        #[arg(long, default_value = "cli")]
        surface: String,
        /// JSON file with prior conversation turns
        #[arg(long)]
        history: Option<PathBuf>,
        /// Accept a plain-text reply (question or outline) instead of frames
        #[arg(long)]
        allow_clarification: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Stable command name for logs.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Validate { .. } => "validate",
        Commands::Parse { .. } => "parse",
        Commands::Phase { .. } => "phase",
        Commands::Generate { .. } => "generate",
        Commands::Config => "config",
    }
}
