//! Training options chosen on the configure step

use crate::error::{WizardError, WizardResult};
use ncml_common::{OptimizationMetric, ProjectType, TaskType};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed training split, in percent of rows
pub const TRAINING_SPLIT_RANGE: RangeInclusive<u8> = 50..=90;
pub const DEFAULT_TRAINING_SPLIT: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub task_type: Option<TaskType>,
    pub optimization_metric: OptimizationMetric,
    training_split_percent: u8,
    pub advanced_options_visible: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            task_type: None,
            optimization_metric: OptimizationMetric::default(),
            training_split_percent: DEFAULT_TRAINING_SPLIT,
            advanced_options_visible: false,
        }
    }
}

impl ModelSettings {
    /// Reset the task type from the project type; other fields are kept
    pub fn apply_project_type(&mut self, project_type: ProjectType) {
        self.task_type = Some(TaskType::for_project(project_type));
    }

    pub fn training_split_percent(&self) -> u8 {
        self.training_split_percent
    }

    pub fn test_split_percent(&self) -> u8 {
        100 - self.training_split_percent
    }

    pub fn set_training_split(&mut self, percent: u8) -> WizardResult<()> {
        if !TRAINING_SPLIT_RANGE.contains(&percent) {
            return Err(WizardError::Validation(format!(
                "Training split must be between {}% and {}% (got {}%)",
                TRAINING_SPLIT_RANGE.start(),
                TRAINING_SPLIT_RANGE.end(),
                percent
            )));
        }
        self.training_split_percent = percent;
        Ok(())
    }

    /// Returns the new visibility
    pub fn toggle_advanced_options(&mut self) -> bool {
        self.advanced_options_visible = !self.advanced_options_visible;
        self.advanced_options_visible
    }

    /// Split sent with the request; only when advanced options are shown
    pub fn submitted_split(&self) -> Option<u8> {
        self.advanced_options_visible
            .then_some(self.training_split_percent)
    }

    pub fn validate(&self) -> WizardResult<()> {
        if self.task_type.is_none() {
            return Err(WizardError::Validation(
                "Please select a task type".to_string(),
            ));
        }
        Ok(())
    }
}
