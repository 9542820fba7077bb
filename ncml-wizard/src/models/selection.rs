//! Target and feature column selection
//!
//! Invariant: the target is never a member of the feature set.

use crate::error::{WizardError, WizardResult};
use serde::{Deserialize, Serialize};

/// Outcome of toggling a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureToggle {
    Added,
    Removed,
    /// Column is the current target; nothing changed
    Ignored,
}

/// Column roles chosen on the configure step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    target: Option<String>,
    /// Ordered by selection
    features: Vec<String>,
}

impl ColumnSelection {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn is_feature(&self, column: &str) -> bool {
        self.features.iter().any(|f| f == column)
    }

    /// Set the target column
    ///
    /// The column leaves the feature set. When nothing has been chosen yet,
    /// every other column becomes a feature.
    pub fn select_target(&mut self, column: &str, columns: &[String]) -> WizardResult<()> {
        ensure_known(column, columns)?;

        let first_choice = self.target.is_none() && self.features.is_empty();
        self.target = Some(column.to_string());

        if first_choice {
            self.features = columns.iter().filter(|c| *c != column).cloned().collect();
        } else {
            self.features.retain(|f| f != column);
        }
        Ok(())
    }

    /// Flip feature membership of a column
    pub fn toggle_feature(&mut self, column: &str, columns: &[String]) -> WizardResult<FeatureToggle> {
        ensure_known(column, columns)?;

        if self.target.as_deref() == Some(column) {
            return Ok(FeatureToggle::Ignored);
        }

        if let Some(pos) = self.features.iter().position(|f| f == column) {
            self.features.remove(pos);
            Ok(FeatureToggle::Removed)
        } else {
            self.features.push(column.to_string());
            Ok(FeatureToggle::Added)
        }
    }

    /// Replace the feature set; the target is skipped, duplicates collapse
    pub fn set_features<S: AsRef<str>>(&mut self, selected: &[S], columns: &[String]) -> WizardResult<()> {
        let mut features: Vec<String> = Vec::with_capacity(selected.len());
        for column in selected {
            let column = column.as_ref();
            ensure_known(column, columns)?;
            if self.target.as_deref() == Some(column) || features.iter().any(|f| f == column) {
                continue;
            }
            features.push(column.to_string());
        }
        self.features = features;
        Ok(())
    }

    /// Drop roles for columns missing from a new dataset
    pub fn retain_available(&mut self, columns: &[String]) {
        if let Some(target) = &self.target {
            if !columns.contains(target) {
                tracing::debug!(target_column = %target, "Target column no longer present");
                self.target = None;
            }
        }
        self.features.retain(|f| columns.contains(f));
    }

    /// Check the selection is complete enough to submit
    pub fn validate(&self) -> WizardResult<()> {
        if self.target.is_none() {
            return Err(WizardError::Validation(
                "Please select a target column".to_string(),
            ));
        }
        if self.features.is_empty() {
            return Err(WizardError::Validation(
                "Please select at least one feature column".to_string(),
            ));
        }
        Ok(())
    }
}

fn ensure_known(column: &str, columns: &[String]) -> WizardResult<()> {
    if columns.iter().any(|c| c == column) {
        Ok(())
    } else {
        Err(WizardError::Validation(format!(
            "Unknown column '{}'",
            column
        )))
    }
}
