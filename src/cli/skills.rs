//! Skill level commands

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::client::PlatformApi;
use crate::client::models::UserSkill;
use crate::error::Result;
use crate::output::{json, table};

/// Display format for skill levels in table view
#[derive(Tabled, Serialize)]
struct SkillDisplay {
    #[tabled(rename = "SKILL")]
    skill: String,

    #[tabled(rename = "LEVEL")]
    level: String,

    #[tabled(rename = "UPDATED")]
    updated: String,
}

impl From<UserSkill> for SkillDisplay {
    fn from(skill: UserSkill) -> Self {
        Self {
            skill: skill.skill_name,
            level: format!("{:.1}", skill.skill_level),
            updated: skill
                .updated_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Run the skills list command
pub async fn list(
    format: OutputFormat,
    config_path: Option<&str>,
    no_cache: bool,
) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, no_cache).await?;
    let user_id = ctx.require_user_id()?;

    let skills = ctx.platform.user_skills(user_id).await?;
    let display: Vec<SkillDisplay> = skills.into_iter().map(Into::into).collect();

    match ctx.format {
        OutputFormat::Table => println!("{}", table::format_table(&display)),
        OutputFormat::Json => println!("{}", json::format_json(&display)?),
    }

    Ok(())
}
