//! ML vocabulary shared by the wizard and the training-service types
//!
//! Wire values are the lowercase strings the training service expects
//! (`"classification"`, `"f1"`, ...).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of project the user is creating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Predict numerical values
    Predictor,
    /// Categorize records into groups
    Classifier,
    /// Discover groups of similar records
    Cluster,
}

impl ProjectType {
    pub const ALL: [ProjectType; 3] = [Self::Predictor, Self::Classifier, Self::Cluster];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predictor => "predictor",
            Self::Classifier => "classifier",
            Self::Cluster => "cluster",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Predictor => "Predictor",
            Self::Classifier => "Classifier",
            Self::Cluster => "Clustering",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Predictor => "Predict numerical values like sales, prices, or ratings",
            Self::Classifier => {
                "Categorize data into groups like spam detection or sentiment analysis"
            }
            Self::Cluster => "Discover patterns and group similar data points",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "predictor" => Ok(Self::Predictor),
            "classifier" => Ok(Self::Classifier),
            "cluster" | "clustering" => Ok(Self::Cluster),
            other => Err(Error::InvalidInput(format!(
                "Unknown project type '{}' (expected predictor, classifier or cluster)",
                other
            ))),
        }
    }
}

/// Learning paradigm sent to the training service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Classification,
    Regression,
    Clustering,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [Self::Classification, Self::Regression, Self::Clustering];

    /// Default task type for a project type
    pub fn for_project(project_type: ProjectType) -> Self {
        match project_type {
            ProjectType::Predictor => Self::Regression,
            ProjectType::Classifier => Self::Classification,
            ProjectType::Cluster => Self::Clustering,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
            Self::Clustering => "clustering",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(Self::Classification),
            "regression" => Ok(Self::Regression),
            "clustering" => Ok(Self::Clustering),
            other => Err(Error::InvalidInput(format!(
                "Unknown task type '{}' (expected classification, regression or clustering)",
                other
            ))),
        }
    }
}

/// Scoring criterion used to evaluate the trained model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMetric {
    #[default]
    Accuracy,
    Precision,
    Recall,
    F1,
    Rmse,
    Mae,
}

impl OptimizationMetric {
    pub const ALL: [OptimizationMetric; 6] = [
        Self::Accuracy,
        Self::Precision,
        Self::Recall,
        Self::F1,
        Self::Rmse,
        Self::Mae,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Precision => "precision",
            Self::Recall => "recall",
            Self::F1 => "f1",
            Self::Rmse => "rmse",
            Self::Mae => "mae",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accuracy => "Accuracy",
            Self::Precision => "Precision",
            Self::Recall => "Recall",
            Self::F1 => "F1 Score",
            Self::Rmse => "RMSE (for Regression)",
            Self::Mae => "MAE (for Regression)",
        }
    }

    /// Error-based metrics only make sense for regression
    pub fn is_regression_metric(&self) -> bool {
        matches!(self, Self::Rmse | Self::Mae)
    }
}

impl fmt::Display for OptimizationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accuracy" => Ok(Self::Accuracy),
            "precision" => Ok(Self::Precision),
            "recall" => Ok(Self::Recall),
            "f1" => Ok(Self::F1),
            "rmse" => Ok(Self::Rmse),
            "mae" => Ok(Self::Mae),
            other => Err(Error::InvalidInput(format!(
                "Unknown optimization metric '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_for_project() {
        assert_eq!(TaskType::for_project(ProjectType::Predictor), TaskType::Regression);
        assert_eq!(TaskType::for_project(ProjectType::Classifier), TaskType::Classification);
        assert_eq!(TaskType::for_project(ProjectType::Cluster), TaskType::Clustering);
    }

    #[test]
    fn test_parse_accepts_case_and_whitespace() {
        assert_eq!(" Classifier ".parse::<ProjectType>().unwrap(), ProjectType::Classifier);
        assert_eq!("clustering".parse::<ProjectType>().unwrap(), ProjectType::Cluster);
        assert_eq!("F1".parse::<OptimizationMetric>().unwrap(), OptimizationMetric::F1);
        assert!("svm".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_values() {
        let json = serde_json::to_string(&TaskType::Classification).unwrap();
        assert_eq!(json, "\"classification\"");

        let metric: OptimizationMetric = serde_json::from_str("\"rmse\"").unwrap();
        assert_eq!(metric, OptimizationMetric::Rmse);
        assert!(metric.is_regression_metric());
    }

    #[test]
    fn test_default_metric_is_accuracy() {
        assert_eq!(OptimizationMetric::default(), OptimizationMetric::Accuracy);
    }
}
