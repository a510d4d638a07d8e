//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};
pub use clap_complete::Shell;

pub mod assess;
pub mod context;
pub mod init;
pub mod skills;
pub mod status;

pub use context::CommandContext;

/// Output format for commands that print data
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON envelope for scripting
    Json,
}

/// LearnOp CLI - companion for the LearnSphere learning platform
#[derive(Parser, Debug)]
#[command(name = "learnop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "LEARNOP_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "LEARNOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "LEARNOP_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the response cache, fetch fresh data from the platform
    #[arg(long, global = true, env = "LEARNOP_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize LearnOp configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Run an adaptive skill assessment
    #[command(after_help = "\
The assessment asks 10 questions, one at a time. Question difficulty adapts
to your answers; at the end your per-skill-area scores are saved to your
LearnSphere profile.")]
    Assess,

    /// View your skill levels
    #[command(subcommand)]
    Skills(SkillsCommands),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Skill level subcommands
#[derive(Subcommand, Debug)]
pub enum SkillsCommands {
    /// List your current skill levels
    List,
}
