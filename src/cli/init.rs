//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::client::{PlatformApi, PlatformClient};
use crate::config::{Config, GenerationConfig, SessionToken};
use crate::error::Result;

/// Run the init command
///
/// Interactive setup targets the default production API. Custom hosts can
/// be configured in the config file or via `LEARNOP_API_HOST` afterwards.
pub async fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to LearnOp!".bold().green());
    println!("Let's set up your LearnSphere configuration.\n");

    // Prompt for API key
    let api_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your LearnSphere API key")
        .interact()?;

    // Sign in to verify the key and learn who we are
    println!("\n{}", "Signing in...".cyan());
    let platform = PlatformClient::new(Some(api_key.clone()), true)?;
    let token = platform.authenticate(&api_key).await?;

    println!("{}", "✓ Signed in successfully!".green());
    println!("  User: {}", token.user_id.bold());

    // Generation backend settings
    println!();
    let model: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Question generation model")
        .default("gpt-4".to_string())
        .interact_text()?;

    let generation_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Generation API key (leave empty to use the platform's)")
        .allow_empty_password(true)
        .interact()?;

    let config = Config {
        api_key: Some(api_key),
        user_id: Some(token.user_id.clone()),
        api_host: None,
        token: Some(SessionToken {
            token: token.token,
            expires_at: token.expires_at,
        }),
        generation: GenerationConfig {
            host: None,
            model,
            api_key: (!generation_key.is_empty()).then_some(generation_key),
        },
    };
    config.save_at(config_path)?;

    let saved_path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        saved_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "learnop status".cyan());
    println!("  {} - Run a skill assessment", "learnop assess".cyan());
    println!("  {} - View your skill levels", "learnop skills list".cyan());

    Ok(())
}
