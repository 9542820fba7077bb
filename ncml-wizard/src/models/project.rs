//! Project metadata entered on the first wizard step

use crate::error::{WizardError, WizardResult};
use ncml_common::ProjectType;
use serde::{Deserialize, Serialize};

/// Project metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,

    /// Free text, may be empty
    #[serde(default)]
    pub description: String,

    pub project_type: Option<ProjectType>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>, project_type: ProjectType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            project_type: Some(project_type),
        }
    }

    /// Name as sent to the training service
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    /// Check the fields required to leave the details step
    pub fn validate(&self) -> WizardResult<()> {
        let mut missing = Vec::new();
        if self.trimmed_name().is_empty() {
            missing.push("project name");
        }
        if self.project_type.is_none() {
            missing.push("project type");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Validation(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            )))
        }
    }
}
