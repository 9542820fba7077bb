//! Training request derived from the wizard's data at submit time

use crate::error::{WizardError, WizardResult};
use crate::models::{ColumnSelection, DatasetFile, ModelSettings, ProjectDraft};
use ncml_common::{OptimizationMetric, TaskType};
use reqwest::multipart::{Form, Part};

/// Multipart field names expected by the training service
pub mod field {
    pub const FILE: &str = "file";
    pub const TARGET_COLUMN: &str = "target_column";
    pub const TASK_TYPE: &str = "task_type";
    pub const FEATURE_COLUMNS: &str = "feature_columns";
    pub const PROJECT_NAME: &str = "project_name";
    pub const PROJECT_DESCRIPTION: &str = "project_description";
    pub const OPTIMIZATION_METRIC: &str = "optimization_metric";
    pub const TRAINING_PERCENTAGE: &str = "training_percentage";
}

/// Everything sent to `POST /send_training`
///
/// Built fresh for each attempt and never stored.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub file_bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
    pub target_column: String,
    pub task_type: TaskType,
    pub feature_columns: Vec<String>,
    pub project_name: String,
    pub project_description: String,
    pub optimization_metric: OptimizationMetric,
    /// Present only when advanced options are visible
    pub training_percentage: Option<u8>,
}

impl SubmissionPayload {
    /// Validate the wizard's data and assemble the payload
    pub fn build(
        draft: &ProjectDraft,
        dataset: Option<&DatasetFile>,
        selection: &ColumnSelection,
        settings: &ModelSettings,
    ) -> WizardResult<Self> {
        draft.validate()?;
        let dataset = dataset
            .ok_or_else(|| WizardError::Validation("Please upload a dataset".to_string()))?;
        selection.validate()?;
        settings.validate()?;

        let (Some(target_column), Some(task_type)) = (selection.target(), settings.task_type)
        else {
            return Err(WizardError::Internal(
                "validated selection is incomplete".to_string(),
            ));
        };

        Ok(Self {
            file_bytes: dataset.raw().to_vec(),
            filename: dataset.filename().to_string(),
            mime: dataset.media_type().mime(),
            target_column: target_column.to_string(),
            task_type,
            feature_columns: selection.features().to_vec(),
            project_name: draft.trimmed_name().to_string(),
            project_description: draft.description.clone(),
            optimization_metric: settings.optimization_metric,
            training_percentage: settings.submitted_split(),
        })
    }

    /// `feature_columns` as sent on the wire: a JSON array in selection order
    pub fn feature_columns_json(&self) -> WizardResult<String> {
        serde_json::to_string(&self.feature_columns)
            .map_err(|e| WizardError::Internal(format!("encode feature columns: {}", e)))
    }

    /// Text fields in the order they are appended to the form
    pub fn text_fields(&self) -> WizardResult<Vec<(&'static str, String)>> {
        let mut fields = vec![
            (field::TARGET_COLUMN, self.target_column.clone()),
            (field::TASK_TYPE, self.task_type.as_str().to_string()),
            (field::FEATURE_COLUMNS, self.feature_columns_json()?),
            (field::PROJECT_NAME, self.project_name.clone()),
            (field::PROJECT_DESCRIPTION, self.project_description.clone()),
            (
                field::OPTIMIZATION_METRIC,
                self.optimization_metric.as_str().to_string(),
            ),
        ];
        if let Some(percent) = self.training_percentage {
            fields.push((field::TRAINING_PERCENTAGE, percent.to_string()));
        }
        Ok(fields)
    }

    /// Multipart form for the training request
    pub fn to_form(&self) -> WizardResult<Form> {
        let file = Part::bytes(self.file_bytes.clone())
            .file_name(self.filename.clone())
            .mime_str(self.mime)
            .map_err(|e| WizardError::Internal(format!("invalid media type: {}", e)))?;

        let form = self
            .text_fields()?
            .into_iter()
            .fold(Form::new().part(field::FILE, file), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }
}
