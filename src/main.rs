//! LearnOp CLI - companion for the LearnSphere learning platform

use clap::{CommandFactory, Parser};

mod assessment;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod generation;
mod output;

use cli::{Cli, Commands, SkillsCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref()).await,
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Version => {
            println!("learnop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Assess => cli::assess::run(cli.format, cli.config.as_deref(), cli.no_cache).await,
        Commands::Skills(skills_cmd) => match skills_cmd {
            SkillsCommands::List => {
                cli::skills::list(cli.format, cli.config.as_deref(), cli.no_cache).await
            }
        },
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "learnop",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
