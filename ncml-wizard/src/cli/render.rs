//! Terminal output formatting

use console::style;
use ncml_common::api::{ModelInfo, PredictionResult, TrainingStatus, TrainingStatusResponse};
use ncml_wizard::models::{DataPreview, DatasetFile};
use ncml_wizard::Wizard;
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 20;

pub fn dataset_summary(dataset: &DatasetFile) -> String {
    format!("  {} {}", style("✓").green(), dataset.summary())
}

pub fn notice(message: &str) -> String {
    format!("  {} {}", style("ℹ").blue(), style(message).dim())
}

pub fn error(message: &str) -> String {
    format!("  {} {}", style("✗").red(), style(message).red())
}

/// Fixed-width table of the preview rows
pub fn preview_table(preview: &DataPreview) -> String {
    let cells = |row: &[String]| -> Vec<String> { row.iter().map(|c| truncate(c)).collect() };
    let headers = cells(&preview.headers);
    let rows: Vec<Vec<String>> = preview.rows.iter().map(|r| cells(r)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" │ ")
    };

    let mut out = vec![format!("  {}", style(line(&headers)).bold())];
    out.push(format!(
        "  {}",
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─")
    ));
    for row in &rows {
        out.push(format!("  {}", line(row)));
    }
    if rows.is_empty() {
        out.push(format!("  {}", style("(no rows to preview)").dim()));
    }
    out.join("\n")
}

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        cell.to_string()
    } else {
        let mut s: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
        s.push('…');
        s
    }
}

/// Everything that will be sent, for confirmation
pub fn review(wizard: &Wizard) -> String {
    let draft = wizard.draft();
    let selection = wizard.selection();
    let settings = wizard.settings();

    let mut lines = vec![format!("  {}", style("Review").bold())];
    lines.push(format!("  Project:      {}", style(draft.trimmed_name()).cyan()));
    if !draft.description.trim().is_empty() {
        lines.push(format!("  Description:  {}", draft.description.trim()));
    }
    if let Some(dataset) = wizard.dataset() {
        lines.push(format!("  Dataset:      {}", dataset.filename()));
    }
    lines.push(format!(
        "  Target:       {}",
        selection.target().unwrap_or("-")
    ));
    lines.push(format!("  Features:     {}", selection.features().join(", ")));
    lines.push(format!(
        "  Task type:    {}",
        settings
            .task_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "  Metric:       {}",
        settings.optimization_metric.label()
    ));
    if let Some(split) = settings.submitted_split() {
        lines.push(format!(
            "  Split:        {}% training / {}% testing",
            split,
            100 - split
        ));
    }
    lines.join("\n")
}

pub fn success(training_id: Option<&str>) -> String {
    match training_id {
        Some(id) => format!(
            "  {} Project created. Training id: {}",
            style("✓").green(),
            style(id).cyan()
        ),
        None => format!("  {} Project created.", style("✓").green()),
    }
}

pub fn training_status(training_id: &str, status: &TrainingStatusResponse) -> String {
    let label = match status.status {
        TrainingStatus::Ready => style(status.status.to_string()).green(),
        TrainingStatus::Failed => style(status.status.to_string()).red(),
        TrainingStatus::Training | TrainingStatus::Unknown => style(status.status.to_string()).yellow(),
    };
    let mut out = format!("  Training {}: {}", training_id, label);
    if let Some(progress) = status.progress {
        out.push_str(&format!(" ({:.0}%)", progress));
    }
    if let Some(message) = &status.message {
        out.push_str(&format!("\n  {}", style(message).dim()));
    }
    out
}

pub fn model_info(info: &ModelInfo) -> String {
    let mut lines = vec![format!(
        "  {} {}",
        style(info.name.as_deref().unwrap_or("Model")).bold(),
        style(format!("({})", info.id)).dim()
    )];
    if let Some(task) = info.model_type {
        lines.push(format!("  Type:      {}", task));
    }
    if let Some(status) = info.status {
        lines.push(format!("  Status:    {}", status));
    }
    if let Some(target) = &info.target {
        lines.push(format!("  Target:    {}", target));
    }
    if let Some(accuracy) = info.accuracy {
        lines.push(format!("  Accuracy:  {:.1}%", accuracy * 100.0));
    }
    lines.push(expected_inputs(info));
    lines.join("\n")
}

/// Feature names with the allowed values of categorical ones
pub fn expected_inputs(info: &ModelInfo) -> String {
    let mut lines = vec!["  Inputs:".to_string()];
    for feature in &info.features {
        match info.categorical_options.get(feature) {
            Some(options) => lines.push(format!("    {} ({})", feature, options.join(" | "))),
            None => lines.push(format!("    {}", feature)),
        }
    }
    lines.join("\n")
}

pub fn prediction(result: &PredictionResult) -> String {
    let mut lines = vec![format!(
        "  {} Prediction: {}",
        style("✓").green(),
        style(display_value(&result.prediction)).cyan().bold()
    )];
    if let Some(confidence) = result.confidence.as_ref().and_then(Value::as_f64) {
        lines.push(format!("  Confidence: {:.1}%", confidence * 100.0));
    }
    if let Some(probabilities) = &result.class_probabilities {
        for (class, p) in probabilities {
            match p.as_f64() {
                Some(p) => lines.push(format!("    {:<16} {:.1}%", class, p * 100.0)),
                None => lines.push(format!("    {:<16} {}", class, p)),
            }
        }
    }
    lines.join("\n")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(30);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_WIDTH);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_preview_table_without_rows() {
        let preview = DataPreview {
            headers: vec!["File loaded successfully".to_string()],
            rows: Vec::new(),
        };
        let table = preview_table(&preview);
        assert!(table.contains("no rows to preview"));
    }
}
