//! Step report for one flow run.
//!
//! Written as JSON to `{reports}/results/{flow}_{YYYYMMDD_HHmmss}.json`.

use crate::artifacts::{timestamp, Artifacts};
use crate::result::OnboardResult;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Step result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step passed
    Passed,
    /// Step failed
    Failed,
    /// Not run because an earlier step failed
    Skipped,
}

impl StepStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Outcome of one named step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name
    pub name: String,
    /// Step status
    pub status: StepStatus,
    /// Duration of step execution
    pub duration: Duration,
    /// Error message if failed
    pub error: Option<String>,
    /// Failure screenshot, if one was captured
    pub screenshot: Option<PathBuf>,
}

impl StepRecord {
    /// Create a passing record
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Passed,
            duration,
            error: None,
            screenshot: None,
        }
    }

    /// Create a failing record
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Failed,
            duration,
            error: Some(error.into()),
            screenshot: None,
        }
    }

    /// Create a skipped record
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
            screenshot: None,
        }
    }

    /// Attach the failure screenshot
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Records of one flow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Flow name
    pub flow: String,
    /// Unique id of this run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Local>,
    /// Per-step records, in execution order
    pub steps: Vec<StepRecord>,
}

impl SuiteReport {
    /// Empty report for `flow`, started now
    #[must_use]
    pub fn new(flow: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            run_id: Uuid::new_v4(),
            started_at: Local::now(),
            steps: Vec::new(),
        }
    }

    /// Append a record
    pub fn record(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    /// Get number of passed steps
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(StepStatus::Passed)
    }

    /// Get number of failed steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    /// Get number of skipped steps
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(StepStatus::Skipped)
    }

    fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Check if every step passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_passed())
    }

    /// Get total duration
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// The failed step, if any
    #[must_use]
    pub fn failure(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status.is_failed())
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed, {} failed, {} skipped",
            self.flow,
            self.passed_count(),
            self.steps.len(),
            self.failed_count(),
            self.skipped_count()
        )
    }

    /// Serialize as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> OnboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report under the results directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub async fn write(&self, artifacts: &Artifacts) -> OnboardResult<PathBuf> {
        let dir = artifacts.results_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}_{}.json", self.flow, timestamp(self.started_at)));
        tokio::fs::write(&path, self.to_json()?).await?;
        info!(run_id = %self.run_id, path = %path.display(), "report written");
        Ok(path)
    }
}
