//! Interactive assessment command

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use dialoguer::{Select, theme::ColorfulTheme};
use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;

use crate::assessment::scoring::SkillResult;
use crate::assessment::{AssessmentEngine, PresentedQuestion, SubmitOutcome};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::generation::ChatGenerator;
use crate::output::{json, table};

/// Display format for final results in table view
#[derive(Tabled, Serialize)]
struct ResultDisplay {
    #[tabled(rename = "SKILL AREA")]
    skill_area: String,

    #[tabled(rename = "SCORE")]
    score: String,
}

/// Run the assess command: drive a full ten-question session interactively.
pub async fn run(format: OutputFormat, config_path: Option<&str>, no_cache: bool) -> Result<()> {
    let ctx = CommandContext::new(format, config_path, no_cache).await?;
    let user_id = ctx.require_user_id()?.to_string();

    let generator = ChatGenerator::new(&ctx.config.generation)?
        .with_api_key(
            ctx.config
                .generation
                .api_key
                .as_deref()
                .or(ctx.config.api_key.as_deref()),
        )
        .await;
    let engine = AssessmentEngine::new(ctx.platform.clone(), Arc::new(generator));

    let progress = spinner("Generating your first question...");
    let mut question = engine.start(&user_id).await?;
    progress.finish_and_clear();

    let assessment_id = question.id.clone();
    let mut number = 1usize;

    loop {
        let answer = prompt_answer(&question, number)?;

        let progress = spinner("Checking your answer...");
        let outcome = engine.submit_answer(&assessment_id, &user_id, &answer).await?;
        progress.finish_and_clear();

        match outcome {
            SubmitOutcome::Continue { next_question, .. } => {
                question = next_question;
                number += 1;
            }
            SubmitOutcome::Complete { results, .. } => {
                render_results(&results, ctx.format)?;
                break;
            }
        }
    }

    Ok(())
}

fn prompt_answer(question: &PresentedQuestion, number: usize) -> Result<String> {
    println!(
        "\n{}  {}",
        format!("Question {}/{}", number, question.total_questions)
            .bold()
            .cyan(),
        format!("[{} · difficulty {}]", question.skill_area, question.difficulty).dimmed(),
    );
    println!("{}\n", question.question);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Your answer")
        .items(&question.options)
        .default(0)
        .interact()?;

    Ok(question.options[selection].clone())
}

fn render_results(results: &BTreeMap<String, SkillResult>, format: OutputFormat) -> Result<()> {
    println!("\n{}", "Assessment complete!".bold().green());

    match format {
        OutputFormat::Table => {
            let display: Vec<ResultDisplay> = results
                .iter()
                .map(|(area, result)| ResultDisplay {
                    skill_area: area.clone(),
                    score: format!("{:.1}", result.score),
                })
                .collect();
            println!("{}", table::format_table(&display));
            println!("Your skill levels have been updated.");
        }
        OutputFormat::Json => println!("{}", json::format_json(results)?),
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner().with_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(80));
    progress
}
