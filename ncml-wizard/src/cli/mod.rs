//! Command-line interface

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ncml_common::auth::LocalSession;
use ncml_common::config::{self, ClientConfig, ConfigOverrides};
use ncml_common::events::{EventBus, WizardEvent};
use ncml_wizard::services::Backends;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

mod commands;
mod interactive;
mod render;

/// Command-line arguments for ncml
#[derive(Parser, Debug)]
#[command(name = "ncml")]
#[command(about = "Create and train no-code ML projects")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file (default: <config_dir>/ncml/config.toml)
    #[arg(long, global = true, env = "NCML_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the training service
    #[arg(long, global = true)]
    pub service_url: Option<String>,

    /// Timeout for each request, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Use canned responses instead of the training service
    #[arg(long, global = true)]
    pub demo: bool,

    /// Email of the signed-in user
    #[arg(long, global = true)]
    pub user: Option<String>,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            service_url: self.service_url.clone(),
            request_timeout_secs: self.timeout_secs,
            demo_mode: self.demo.then_some(true),
            user_email: self.user.clone(),
        }
    }

    /// Load the TOML file and apply environment and command-line overrides
    pub fn resolve_config(&self) -> Result<(ClientConfig, Option<PathBuf>)> {
        let path = self.config.clone().or_else(config::default_config_path);
        let toml = match &path {
            Some(p) => config::load_toml_config(p)?,
            None => Default::default(),
        };
        let resolved = ClientConfig::resolve(&self.overrides(), &toml)
            .context("Invalid configuration")?;
        Ok((resolved, path))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project interactively
    New,

    /// Create a project and submit it for training without prompts
    Create(commands::CreateArgs),

    /// Show the column inventory and first rows of a dataset
    Preview {
        file: PathBuf,
    },

    /// Show the status of a training job
    Status {
        training_id: String,

        /// Keep polling until the job is ready or failed
        #[arg(long)]
        watch: bool,

        /// Give up watching after this many seconds
        #[arg(long, default_value = "600")]
        max_wait_secs: u64,
    },

    /// Show a trained model's description
    Model {
        model_id: String,
    },

    /// Run a prediction against a trained model
    Predict {
        model_id: String,

        /// Feature value as name=value (repeatable)
        #[arg(long = "input", short = 'i', value_parser = commands::parse_input)]
        inputs: Vec<(String, String)>,
    },
}

/// Resolved configuration plus the services built from it
pub struct AppContext {
    pub config: ClientConfig,
    pub backends: Backends,
    pub session: LocalSession,
    pub events: EventBus,
}

impl AppContext {
    fn new(config: ClientConfig) -> Result<Self> {
        let backends = Backends::from_config(&config).context("Failed to create service clients")?;
        let session = LocalSession::for_email(&config.user_email, config.user_display_name.clone());
        Ok(Self {
            config,
            backends,
            session,
            events: EventBus::default(),
        })
    }
}

pub async fn run(cli: Cli, config: ClientConfig) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let logger = spawn_event_logger(&ctx.events);

    let result = match cli.command {
        Command::New => interactive::run_new_wizard(&ctx).await,
        Command::Create(args) => commands::create(&ctx, args).await,
        Command::Preview { file } => commands::preview(&file).await,
        Command::Status {
            training_id,
            watch,
            max_wait_secs,
        } => commands::status(&ctx, &training_id, watch, max_wait_secs).await,
        Command::Model { model_id } => commands::model(&ctx, &model_id).await,
        Command::Predict { model_id, inputs } => commands::predict(&ctx, &model_id, inputs).await,
    };

    drop(ctx);
    let _ = logger.await;
    result
}

/// Log every wizard event until the bus closes
fn spawn_event_logger(events: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &WizardEvent) {
    match event {
        WizardEvent::StepChanged { from, to, .. } => {
            debug!(step = %to, previous = %from, "Wizard step changed")
        }
        WizardEvent::DatasetLoaded {
            filename,
            column_count,
            full_preview,
            ..
        } => info!(filename = %filename, columns = column_count, full_preview, "Dataset loaded"),
        WizardEvent::DatasetRejected {
            filename, reason, ..
        } => warn!(filename = %filename, reason = %reason, "Dataset rejected"),
        WizardEvent::SubmissionStarted {
            project_name,
            task_type,
            feature_count,
            ..
        } => info!(project = %project_name, task_type = %task_type, features = feature_count, "Submitting training request"),
        WizardEvent::SubmissionSucceeded { training_id, .. } => {
            info!(training_id = training_id.as_deref().unwrap_or("-"), "Training request accepted")
        }
        WizardEvent::SubmissionFailed { message, .. } => {
            warn!(message = %message, "Training request failed")
        }
        WizardEvent::TrainingStatusChanged {
            training_id,
            status,
            ..
        } => info!(training_id = %training_id, status = %status, "Training status"),
    }
}
