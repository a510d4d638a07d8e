//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Run the status command
pub fn run(config_path: Option<&str>) -> Result<()> {
    let path = Config::resolve_path(config_path)?;
    println!("Config file: {}", path.display());

    let config = match Config::load_at(config_path) {
        Ok(config) => config,
        Err(err) => {
            println!("Status: {}", "not configured".yellow());
            println!("  {}", err);
            return Ok(());
        }
    };

    let key_status = if config.api_key.is_some() {
        "configured".green()
    } else {
        "missing".red()
    };
    println!("API key: {}", key_status);

    match &config.user_id {
        Some(user_id) => println!("User: {}", user_id),
        None => println!("User: {}", "unknown (run `learnop init`)".yellow()),
    }

    let token_status = if config.is_token_expired() {
        "expired (will refresh on next command)".yellow()
    } else {
        "valid".green()
    };
    println!("Session token: {}", token_status);

    if let Some(host) = &config.api_host {
        println!("API host: {}", host);
    }

    println!("Generation model: {}", config.generation.model);

    Ok(())
}
