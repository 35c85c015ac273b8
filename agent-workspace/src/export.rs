//! Export sink: renders a completed week plan to a downloadable document.
//!
//! One-way, fire-and-forget from the workspace's point of view: the sink
//! consumes the artifact's structured fields and produces a file; a
//! failure is an auxiliary warning, never a workspace error.

use agent_workspace_sdk::WeekPlan;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Document sink consuming a week plan and an optional logo
pub trait ExportSink {
    fn export(&self, plan: &WeekPlan, logo: Option<&Path>) -> Result<PathBuf>;
}

/// Renders the plan as a Markdown table file
pub struct TableFileExporter {
    pub output_path: PathBuf,
}

impl ExportSink for TableFileExporter {
    fn export(&self, plan: &WeekPlan, logo: Option<&Path>) -> Result<PathBuf> {
        let mut doc = String::new();
        if let Some(logo) = logo {
            doc.push_str(&format!("![logo]({})\n\n", logo.display()));
        }
        doc.push_str(&format!("# Week plan ({} weeks)\n\n", plan.weeks));
        doc.push_str("| Week | Topic |\n|------|-------|\n");
        for row in &plan.rows {
            doc.push_str(&format!("| {} | {} |\n", row.week, row.topic));
        }

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(&self.output_path, doc)
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;

        Ok(self.output_path.clone())
    }
}
