//! Project creation wizard
//!
//! Owns one project draft, dataset, column selection and settings, and
//! moves them through Details → Upload → Configure → Submitting →
//! Success | Failed. All mutation goes through `&mut self`, so at most one
//! training request can be in flight per wizard.

use crate::error::{WizardError, WizardResult};
use crate::models::{
    ColumnSelection, DatasetFile, FeatureToggle, FileSource, ModelSettings, ProjectDraft,
    StateTransition, SubmissionPayload, WizardState,
};
use crate::services::{dataset_parser, TrainingService};
use chrono::Utc;
use ncml_common::api::TrainingResponse;
use ncml_common::auth::{SessionProvider, UserProfile};
use ncml_common::events::{EventBus, WizardEvent, WizardStep};
use ncml_common::{OptimizationMetric, ProjectType, TaskType};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Claim on a file selection; only the newest ticket's result is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTicket {
    generation: u64,
    filename: String,
}

impl ParseTicket {
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

pub struct Wizard {
    session_id: Uuid,
    owner: UserProfile,
    state: WizardState,
    draft: ProjectDraft,
    dataset: Option<DatasetFile>,
    selection: ColumnSelection,
    settings: ModelSettings,
    /// Inline error for the current step
    last_error: Option<String>,
    /// Newest file selection; older parse results are discarded
    parse_generation: u64,
    transitions: Vec<StateTransition>,
    events: Option<EventBus>,
}

impl Wizard {
    /// Start a wizard for the signed-in user
    pub fn start(session: &dyn SessionProvider) -> WizardResult<Self> {
        if session.is_loading() {
            debug!("Session still loading; wizard not started");
            return Err(WizardError::NotAuthenticated);
        }
        let owner = session.current_user().ok_or(WizardError::NotAuthenticated)?;

        let wizard = Self {
            session_id: Uuid::new_v4(),
            owner,
            state: WizardState::Details,
            draft: ProjectDraft::default(),
            dataset: None,
            selection: ColumnSelection::default(),
            settings: ModelSettings::default(),
            last_error: None,
            parse_generation: 0,
            transitions: Vec::new(),
            events: None,
        };
        info!(session_id = %wizard.session_id, user = %wizard.owner.email, "Wizard started");
        Ok(wizard)
    }

    /// Publish wizard events on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn owner(&self) -> &UserProfile {
        &self.owner
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn dataset(&self) -> Option<&DatasetFile> {
        self.dataset.as_ref()
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Notice about the loaded dataset (placeholder previews)
    pub fn notice(&self) -> Option<&'static str> {
        self.dataset.as_ref().and_then(DatasetFile::notice)
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Server-issued id after a successful submission
    pub fn training_id(&self) -> Option<&str> {
        match &self.state {
            WizardState::Success { training_id } => training_id.as_deref(),
            _ => None,
        }
    }

    // ========================================
    // Navigation
    // ========================================

    /// Advance one step after validating the current one
    pub fn next(&mut self) -> WizardResult<WizardStep> {
        let target = match self.step() {
            WizardStep::Details => {
                let valid = self.draft.validate();
                self.guard(valid)?;
                WizardState::Upload
            }
            WizardStep::Upload => {
                if self.dataset.is_none() {
                    return self.guard(Err(WizardError::Validation(
                        "Please upload a dataset".to_string(),
                    )));
                }
                WizardState::Configure
            }
            WizardStep::Submitting => return Err(WizardError::SubmissionInFlight),
            _ => return Err(self.invalid("advance")),
        };

        self.last_error = None;
        self.transition(target);
        Ok(self.step())
    }

    /// Go back one step; no data is cleared
    pub fn back(&mut self) -> WizardResult<WizardStep> {
        let target = match self.step() {
            WizardStep::Upload => WizardState::Details,
            WizardStep::Configure | WizardStep::Failed => WizardState::Upload,
            WizardStep::Submitting => return Err(WizardError::SubmissionInFlight),
            _ => return Err(self.invalid("go back")),
        };

        self.last_error = None;
        self.transition(target);
        Ok(self.step())
    }

    // ========================================
    // Details
    // ========================================

    pub fn set_name(&mut self, name: &str) -> WizardResult<()> {
        self.ensure_editable("edit the project name")?;
        self.draft.name = name.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> WizardResult<()> {
        self.ensure_editable("edit the description")?;
        self.draft.description = description.to_string();
        Ok(())
    }

    /// Set the project type; the task type follows it only when the type changes
    pub fn set_project_type(&mut self, project_type: ProjectType) -> WizardResult<()> {
        self.ensure_editable("change the project type")?;
        if self.draft.project_type != Some(project_type) {
            self.draft.project_type = Some(project_type);
            self.settings.apply_project_type(project_type);
        }
        Ok(())
    }

    // ========================================
    // Upload
    // ========================================

    /// Claim a new file selection, superseding any in progress
    pub fn begin_file_selection(&mut self, filename: &str) -> WizardResult<ParseTicket> {
        self.ensure_editable("select a file")?;
        self.parse_generation += 1;
        Ok(ParseTicket {
            generation: self.parse_generation,
            filename: filename.to_string(),
        })
    }

    /// Apply a parse result
    ///
    /// Returns `Ok(false)` when the ticket was superseded and the result
    /// discarded. A failed parse keeps the previous dataset.
    pub fn apply_file_selection(
        &mut self,
        ticket: ParseTicket,
        result: WizardResult<DatasetFile>,
    ) -> WizardResult<bool> {
        if ticket.generation != self.parse_generation {
            debug!(filename = %ticket.filename, "Discarding superseded file selection");
            return Ok(false);
        }
        self.ensure_editable("select a file")?;

        match result {
            Ok(dataset) => {
                self.selection.retain_available(dataset.columns());
                self.last_error = None;
                info!(
                    session_id = %self.session_id,
                    dataset = %dataset.summary(),
                    "Dataset loaded"
                );
                self.emit(WizardEvent::DatasetLoaded {
                    session_id: self.session_id,
                    filename: dataset.filename().to_string(),
                    column_count: dataset.columns().len(),
                    full_preview: dataset.notice().is_none(),
                    timestamp: Utc::now(),
                });
                self.dataset = Some(dataset);
                Ok(true)
            }
            Err(e) => {
                warn!(filename = %ticket.filename, error = %e, "Dataset rejected");
                self.last_error = Some(e.to_string());
                self.emit(WizardEvent::DatasetRejected {
                    session_id: self.session_id,
                    filename: ticket.filename,
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Parse and apply a file in one go
    pub fn select_file(&mut self, source: FileSource) -> WizardResult<&DatasetFile> {
        let ticket = self.begin_file_selection(&source.filename)?;
        let result = dataset_parser::parse_dataset(source);
        self.apply_file_selection(ticket, result)?;
        self.loaded_dataset()
    }

    /// Like [`Wizard::select_file`], parsing on the blocking pool
    pub async fn select_file_async(&mut self, source: FileSource) -> WizardResult<&DatasetFile> {
        let ticket = self.begin_file_selection(&source.filename)?;
        let result = dataset_parser::parse_dataset_blocking(source).await;
        self.apply_file_selection(ticket, result)?;
        self.loaded_dataset()
    }

    fn loaded_dataset(&self) -> WizardResult<&DatasetFile> {
        self.dataset
            .as_ref()
            .ok_or_else(|| WizardError::Internal("dataset missing after load".to_string()))
    }

    // ========================================
    // Configure
    // ========================================

    pub fn select_target(&mut self, column: &str) -> WizardResult<()> {
        self.ensure_editable("select the target column")?;
        let columns = self.columns()?;
        let result = self.selection.select_target(column, &columns);
        self.guard(result)
    }

    pub fn toggle_feature(&mut self, column: &str) -> WizardResult<FeatureToggle> {
        self.ensure_editable("change feature columns")?;
        let columns = self.columns()?;
        let result = self.selection.toggle_feature(column, &columns);
        self.guard(result)
    }

    /// Replace the feature set in one call
    pub fn set_features<S: AsRef<str>>(&mut self, features: &[S]) -> WizardResult<()> {
        self.ensure_editable("change feature columns")?;
        let columns = self.columns()?;
        let result = self.selection.set_features(features, &columns);
        self.guard(result)
    }

    pub fn set_task_type(&mut self, task_type: TaskType) -> WizardResult<()> {
        self.ensure_editable("change the task type")?;
        self.settings.task_type = Some(task_type);
        Ok(())
    }

    pub fn set_optimization_metric(&mut self, metric: OptimizationMetric) -> WizardResult<()> {
        self.ensure_editable("change the optimization metric")?;
        self.settings.optimization_metric = metric;
        Ok(())
    }

    pub fn set_training_split(&mut self, percent: u8) -> WizardResult<()> {
        self.ensure_editable("change the training split")?;
        let result = self.settings.set_training_split(percent);
        self.guard(result)
    }

    pub fn toggle_advanced_options(&mut self) -> WizardResult<bool> {
        self.ensure_editable("toggle advanced options")?;
        Ok(self.settings.toggle_advanced_options())
    }

    fn columns(&self) -> WizardResult<Vec<String>> {
        self.dataset
            .as_ref()
            .map(|d| d.columns().to_vec())
            .ok_or_else(|| WizardError::Validation("Please upload a dataset".to_string()))
    }

    // ========================================
    // Submission
    // ========================================

    /// Validate and move to `Submitting`, returning the payload to send
    ///
    /// Nothing changes when validation fails.
    pub fn begin_submission(&mut self) -> WizardResult<SubmissionPayload> {
        if self.state == WizardState::Submitting {
            warn!(session_id = %self.session_id, "Submission already in flight");
            return Err(WizardError::SubmissionInFlight);
        }
        if !self.state.can_submit() {
            return Err(self.invalid("submit"));
        }

        let payload = SubmissionPayload::build(
            &self.draft,
            self.dataset.as_ref(),
            &self.selection,
            &self.settings,
        );
        let payload = self.guard(payload)?;

        self.last_error = None;
        self.transition(WizardState::Submitting);
        self.emit(WizardEvent::SubmissionStarted {
            session_id: self.session_id,
            project_name: payload.project_name.clone(),
            task_type: payload.task_type,
            feature_count: payload.feature_columns.len(),
            timestamp: Utc::now(),
        });
        Ok(payload)
    }

    /// Record the outcome of the request started by [`Wizard::begin_submission`]
    pub fn complete_submission(
        &mut self,
        result: WizardResult<TrainingResponse>,
    ) -> WizardResult<WizardStep> {
        if self.state != WizardState::Submitting {
            return Err(self.invalid("complete a submission"));
        }

        match result {
            Ok(response) => {
                info!(
                    session_id = %self.session_id,
                    training_id = response.training_id.as_deref().unwrap_or("-"),
                    "Project created"
                );
                self.emit(WizardEvent::SubmissionSucceeded {
                    session_id: self.session_id,
                    training_id: response.training_id.clone(),
                    timestamp: Utc::now(),
                });
                self.transition(WizardState::Success {
                    training_id: response.training_id,
                });
            }
            Err(e) => {
                let message = e.to_string();
                warn!(session_id = %self.session_id, error = %message, "Training request failed");
                self.emit(WizardEvent::SubmissionFailed {
                    session_id: self.session_id,
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
                self.transition(WizardState::Failed { message });
            }
        }
        Ok(self.step())
    }

    /// Send the training request and record the outcome
    ///
    /// Remote failures land in `Failed` and are not returned as errors;
    /// calling this again from `Failed` retries with the same data.
    pub async fn submit(&mut self, service: &dyn TrainingService) -> WizardResult<WizardStep> {
        let payload = self.begin_submission()?;
        let result = service.submit(&payload).await;
        self.complete_submission(result)
    }

    /// Leave `Failed` for `Configure`, keeping the message as the step error
    pub fn acknowledge_failure(&mut self) -> WizardResult<()> {
        let WizardState::Failed { message } = &self.state else {
            return Err(self.invalid("acknowledge a failure"));
        };
        self.last_error = Some(message.clone());
        self.transition(WizardState::Configure);
        Ok(())
    }

    // ========================================
    // Internals
    // ========================================

    fn transition(&mut self, to: WizardState) {
        let record = StateTransition {
            session_id: self.session_id,
            from: self.state.step(),
            to: to.step(),
            at: Utc::now(),
        };
        debug!(session_id = %self.session_id, from = %record.from, to = %record.to, "Step changed");
        self.state = to;

        if record.from != record.to {
            self.emit(WizardEvent::StepChanged {
                session_id: record.session_id,
                from: record.from,
                to: record.to,
                timestamp: record.at,
            });
        }
        self.transitions.push(record);
    }

    /// Record a validation failure as the current step's error
    fn guard<T>(&mut self, result: WizardResult<T>) -> WizardResult<T> {
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn ensure_editable(&self, action: &'static str) -> WizardResult<()> {
        match self.state {
            WizardState::Submitting => Err(WizardError::SubmissionInFlight),
            WizardState::Success { .. } => Err(self.invalid(action)),
            _ => Ok(()),
        }
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            from: self.step(),
            action,
        }
    }

    fn emit(&self, event: WizardEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}
