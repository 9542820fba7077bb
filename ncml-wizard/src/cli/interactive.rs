//! Interactive project creation (`ncml new`)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use ncml_common::events::WizardStep;
use ncml_common::{OptimizationMetric, ProjectType, TaskType};
use ncml_wizard::models::FileSource;
use ncml_wizard::services::StatusPoller;
use ncml_wizard::Wizard;

use super::render;
use super::AppContext;

/// Choice offered at the bottom of each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Continue,
    /// Ask again on the same step
    Stay,
    Back,
    Quit,
}

pub async fn run_new_wizard(ctx: &AppContext) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut wizard = Wizard::start(&ctx.session)?.with_events(ctx.events.clone());

    println!();
    println!("{}", style("  Create New ML Project").cyan().bold());
    println!(
        "  {}",
        style(format!("Signed in as {}", wizard.owner().label())).dim()
    );
    if ctx.backends.demo {
        println!("{}", render::notice("Demo mode: nothing will be sent to the training service"));
    }

    loop {
        let step = wizard.step();
        if matches!(step, WizardStep::Details | WizardStep::Upload | WizardStep::Configure) {
            print_step_header(step);
        }

        match step {
            WizardStep::Details => {
                if details_step(&theme, &mut wizard)? == Nav::Quit {
                    return Ok(());
                }
                advance(&mut wizard);
            }
            WizardStep::Upload => match upload_step(&theme, &mut wizard).await? {
                Nav::Continue => advance(&mut wizard),
                Nav::Stay => {}
                Nav::Back => {
                    wizard.back()?;
                }
                Nav::Quit => return Ok(()),
            },
            WizardStep::Configure => match configure_step(&theme, &mut wizard)? {
                Nav::Continue => {
                    if let Err(e) = wizard.selection().validate() {
                        println!("{}", render::error(&e.to_string()));
                        continue;
                    }
                    println!();
                    println!("{}", render::review(&wizard));
                    println!();
                    let confirmed = Confirm::with_theme(&theme)
                        .with_prompt("  Create project and start training?")
                        .default(true)
                        .interact()?;
                    if confirmed {
                        submit(ctx, &mut wizard).await;
                    }
                }
                Nav::Stay => {}
                Nav::Back => {
                    wizard.back()?;
                }
                Nav::Quit => return Ok(()),
            },
            WizardStep::Failed => {
                let message = wizard.state().failure().unwrap_or_default().to_string();
                println!("{}", render::error(&message));
                let choice = Select::with_theme(&theme)
                    .with_prompt("  What next?")
                    .items(&["Retry", "Edit configuration", "Quit"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => submit(ctx, &mut wizard).await,
                    1 => wizard.acknowledge_failure()?,
                    _ => return Ok(()),
                }
            }
            WizardStep::Success => {
                println!("{}", render::success(wizard.training_id()));
                if let Some(training_id) = wizard.training_id() {
                    let follow = Confirm::with_theme(&theme)
                        .with_prompt("  Wait for training to finish?")
                        .default(false)
                        .interact()?;
                    if follow {
                        let poller = StatusPoller::new(
                            ctx.backends.training.as_ref(),
                            ctx.config.status_poll_interval,
                        )
                        .with_max_wait(Duration::from_secs(600))
                        .with_events(ctx.events.clone());
                        match poller.wait_until_ready(training_id).await {
                            Ok(status) => println!("{}", render::training_status(training_id, &status)),
                            Err(e) => println!("{}", render::error(&e.to_string())),
                        }
                    }
                }
                return Ok(());
            }
            WizardStep::Submitting => bail!("Wizard left in submitting state"),
        }
    }
}

/// Send the request; remote failures show up as the `Failed` step
async fn submit(ctx: &AppContext, wizard: &mut Wizard) {
    println!("  {} Submitting...", style("→").cyan());
    if let Err(e) = wizard.submit(ctx.backends.training.as_ref()).await {
        println!("{}", render::error(&e.to_string()));
    }
}

fn print_step_header(step: WizardStep) {
    let _ = Term::stdout().write_line("");
    println!(
        "  {} {}",
        style(format!(
            "Step {} of {}:",
            step.step_number(),
            WizardStep::total_steps()
        ))
        .dim(),
        style(step.title()).bold()
    );
}

/// Move forward, showing a validation error instead of failing
fn advance(wizard: &mut Wizard) {
    if let Err(e) = wizard.next() {
        println!("{}", render::error(&e.to_string()));
    }
}

fn details_step(theme: &ColorfulTheme, wizard: &mut Wizard) -> Result<Nav> {
    let name: String = Input::with_theme(theme)
        .with_prompt("  Project name")
        .with_initial_text(wizard.draft().name.clone())
        .interact_text()?;
    wizard.set_name(&name)?;

    let description: String = Input::with_theme(theme)
        .with_prompt("  Description (optional)")
        .with_initial_text(wizard.draft().description.clone())
        .allow_empty(true)
        .interact_text()?;
    wizard.set_description(&description)?;

    let items: Vec<String> = ProjectType::ALL
        .iter()
        .map(|t| format!("{:<11} {}", t.title(), style(t.description()).dim()))
        .collect();
    let current = wizard
        .draft()
        .project_type
        .and_then(|t| ProjectType::ALL.iter().position(|p| *p == t))
        .unwrap_or(0);
    let idx = Select::with_theme(theme)
        .with_prompt("  Project type")
        .items(&items)
        .default(current)
        .interact_opt()?;

    match idx {
        Some(idx) => {
            wizard.set_project_type(ProjectType::ALL[idx])?;
            Ok(Nav::Continue)
        }
        None => Ok(Nav::Quit),
    }
}

async fn upload_step(theme: &ColorfulTheme, wizard: &mut Wizard) -> Result<Nav> {
    if let Some(dataset) = wizard.dataset() {
        println!("{}", render::dataset_summary(dataset));
        let choice = Select::with_theme(theme)
            .with_prompt("  Dataset")
            .items(&["Keep this file", "Choose another file", "Back", "Quit"])
            .default(0)
            .interact()?;
        match choice {
            0 => return Ok(Nav::Continue),
            1 => {}
            2 => return Ok(Nav::Back),
            _ => return Ok(Nav::Quit),
        }
    }

    let raw: String = Input::with_theme(theme)
        .with_prompt("  Dataset file (CSV, Excel or JSON; empty to go back)")
        .allow_empty(true)
        .interact_text()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Nav::Back);
    }

    let path = PathBuf::from(raw);
    let source = match FileSource::from_path(&path) {
        Ok(source) => source,
        Err(e) => {
            println!("{}", render::error(&format!("{}: {}", path.display(), e)));
            return Ok(Nav::Stay);
        }
    };

    match wizard.select_file_async(source).await {
        Ok(dataset) => {
            println!("{}", render::dataset_summary(dataset));
            println!();
            println!("{}", render::preview_table(dataset.preview()));
            if let Some(notice) = wizard.notice() {
                println!("{}", render::notice(notice));
            }
            Ok(Nav::Continue)
        }
        Err(e) => {
            println!("{}", render::error(&e.to_string()));
            Ok(Nav::Stay)
        }
    }
}

fn configure_step(theme: &ColorfulTheme, wizard: &mut Wizard) -> Result<Nav> {
    if let Some(message) = wizard.last_error() {
        println!("{}", render::error(message));
    }

    let columns: Vec<String> = wizard
        .dataset()
        .map(|d| d.columns().to_vec())
        .unwrap_or_default();

    // Target
    let current_target = wizard
        .selection()
        .target()
        .and_then(|t| columns.iter().position(|c| c == t))
        .unwrap_or(0);
    let Some(target_idx) = Select::with_theme(theme)
        .with_prompt("  Target column (what to predict; Esc to go back)")
        .items(&columns)
        .default(current_target)
        .interact_opt()?
    else {
        return Ok(Nav::Back);
    };
    wizard.select_target(&columns[target_idx])?;

    // Features
    let candidates: Vec<&String> = columns.iter().filter(|c| **c != columns[target_idx]).collect();
    let checked: Vec<bool> = candidates
        .iter()
        .map(|c| wizard.selection().is_feature(c))
        .collect();
    let picked = MultiSelect::with_theme(theme)
        .with_prompt("  Feature columns (space to toggle)")
        .items(&candidates)
        .defaults(&checked)
        .interact()?;
    let features: Vec<&str> = picked.iter().map(|i| candidates[*i].as_str()).collect();
    wizard.set_features(&features)?;

    // Task type
    let task_default = wizard
        .settings()
        .task_type
        .and_then(|t| TaskType::ALL.iter().position(|x| *x == t))
        .unwrap_or(0);
    let task_idx = Select::with_theme(theme)
        .with_prompt("  Task type")
        .items(&TaskType::ALL)
        .default(task_default)
        .interact()?;
    wizard.set_task_type(TaskType::ALL[task_idx])?;

    // Metric
    let metric_labels: Vec<&str> = OptimizationMetric::ALL.iter().map(|m| m.label()).collect();
    let metric_default = OptimizationMetric::ALL
        .iter()
        .position(|m| *m == wizard.settings().optimization_metric)
        .unwrap_or(0);
    let metric_idx = Select::with_theme(theme)
        .with_prompt("  Optimization metric")
        .items(&metric_labels)
        .default(metric_default)
        .interact()?;
    wizard.set_optimization_metric(OptimizationMetric::ALL[metric_idx])?;

    // Advanced options
    let advanced = Confirm::with_theme(theme)
        .with_prompt("  Show advanced options?")
        .default(wizard.settings().advanced_options_visible)
        .interact()?;
    if advanced != wizard.settings().advanced_options_visible {
        wizard.toggle_advanced_options()?;
    }
    if advanced {
        let split: u8 = Input::with_theme(theme)
            .with_prompt("  Training data percent (50-90)")
            .default(wizard.settings().training_split_percent())
            .validate_with(|v: &u8| -> Result<(), &str> {
                if (50..=90).contains(v) {
                    Ok(())
                } else {
                    Err("Must be between 50 and 90")
                }
            })
            .interact_text()?;
        wizard.set_training_split(split)?;
    }

    Ok(Nav::Continue)
}
