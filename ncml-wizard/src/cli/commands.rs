//! Non-interactive subcommands

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use ncml_common::events::WizardStep;
use ncml_common::{OptimizationMetric, ProjectType, TaskType};
use ncml_wizard::models::FileSource;
use ncml_wizard::services::{parse_dataset_blocking, prepare_prediction, StatusPoller};
use ncml_wizard::{Wizard, WizardError};

use super::render;
use super::AppContext;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    #[arg(long)]
    pub name: String,

    /// Project type: predictor, classifier or cluster
    #[arg(long = "type")]
    pub project_type: ProjectType,

    /// Dataset file (CSV, Excel or JSON)
    #[arg(long)]
    pub file: PathBuf,

    /// Column to predict
    #[arg(long)]
    pub target: String,

    /// Feature columns (default: every column except the target)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Override the task type derived from the project type
    #[arg(long)]
    pub task: Option<TaskType>,

    #[arg(long)]
    pub metric: Option<OptimizationMetric>,

    /// Percent of rows used for training (50-90); sends the split with the request
    #[arg(long)]
    pub split: Option<u8>,

    /// Wait for training to finish after the request is accepted
    #[arg(long)]
    pub wait: bool,
}

/// Parse `name=value`
pub fn parse_input(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing feature name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> Result<()> {
    let mut wizard = Wizard::start(&ctx.session)?.with_events(ctx.events.clone());

    wizard.set_name(&args.name)?;
    wizard.set_description(&args.description)?;
    wizard.set_project_type(args.project_type)?;
    wizard.next()?;

    let source = FileSource::from_path(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let dataset = wizard.select_file_async(source).await?;
    println!("{}", render::dataset_summary(dataset));
    if let Some(notice) = wizard.notice() {
        println!("{}", render::notice(notice));
    }
    wizard.next()?;

    wizard.select_target(&args.target)?;
    if !args.features.is_empty() {
        wizard.set_features(&args.features)?;
    }
    if let Some(task) = args.task {
        wizard.set_task_type(task)?;
    }
    if let Some(metric) = args.metric {
        wizard.set_optimization_metric(metric)?;
    }
    if let Some(split) = args.split {
        wizard.toggle_advanced_options()?;
        wizard.set_training_split(split)?;
    }

    println!("{}", render::review(&wizard));

    match wizard.submit(ctx.backends.training.as_ref()).await? {
        WizardStep::Success => {
            println!("{}", render::success(wizard.training_id()));
        }
        _ => {
            let message = wizard.state().failure().unwrap_or("Failed to train model");
            bail!("{}", message);
        }
    }

    if args.wait {
        if let Some(training_id) = wizard.training_id() {
            watch(ctx, training_id, Duration::from_secs(600)).await?;
        }
    }
    Ok(())
}

pub async fn preview(file: &Path) -> Result<()> {
    let source = FileSource::from_path(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let dataset = parse_dataset_blocking(source).await?;

    println!("{}", render::dataset_summary(&dataset));
    if let Some(notice) = dataset.notice() {
        println!("{}", render::notice(notice));
    }
    println!();
    println!("{}", render::preview_table(dataset.preview()));
    Ok(())
}

pub async fn status(ctx: &AppContext, training_id: &str, watch_job: bool, max_wait_secs: u64) -> Result<()> {
    if watch_job {
        return watch(ctx, training_id, Duration::from_secs(max_wait_secs)).await;
    }
    let status = ctx.backends.training.training_status(training_id).await?;
    println!("{}", render::training_status(training_id, &status));
    Ok(())
}

async fn watch(ctx: &AppContext, training_id: &str, max_wait: Duration) -> Result<()> {
    println!("Waiting for training {} to finish...", training_id);
    let poller = StatusPoller::new(ctx.backends.training.as_ref(), ctx.config.status_poll_interval)
        .with_max_wait(max_wait)
        .with_events(ctx.events.clone());
    let status = poller.wait_until_ready(training_id).await?;
    println!("{}", render::training_status(training_id, &status));
    Ok(())
}

pub async fn model(ctx: &AppContext, model_id: &str) -> Result<()> {
    let info = ctx.backends.training.model_info(model_id).await?;
    println!("{}", render::model_info(&info));
    Ok(())
}

pub async fn predict(ctx: &AppContext, model_id: &str, inputs: Vec<(String, String)>) -> Result<()> {
    let info = ctx.backends.training.model_info(model_id).await?;
    let inputs: BTreeMap<String, String> = inputs.into_iter().collect();

    let request = match prepare_prediction(&info, &inputs) {
        Ok(request) => request,
        Err(WizardError::Validation(message)) => {
            return Err(anyhow!("{}\n{}", message, render::expected_inputs(&info)));
        }
        Err(e) => return Err(e.into()),
    };

    let result = ctx.backends.prediction.predict(&request).await?;
    println!("{}", render::prediction(&result));
    Ok(())
}
