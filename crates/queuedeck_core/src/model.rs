use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobStatus, TaskStatus};

/// Opaque server-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

/// Opaque server-assigned task identifier, unique within its job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Bookkeeping task that resolves the URL into downloadable entries.
    FetchUrlContents,
    DownloadAndConvert,
}

impl TaskKind {
    pub fn is_fetch_metadata(self) -> bool {
        matches!(self, TaskKind::FetchUrlContents)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    pub bytes_downloaded: u64,
    #[serde(default)]
    pub bytes_estimate: u64,
    #[serde(default)]
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub progress: HashMap<TaskId, TaskProgress>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// Done-out-of-total over the work tasks of a job; 0/0 is a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressFraction {
    pub done: usize,
    pub total: usize,
}

impl Job {
    /// Counts only work tasks; the fetch-metadata task never contributes.
    pub fn progress_fraction(&self) -> ProgressFraction {
        let work = self.tasks.iter().filter(|task| !task.kind.is_fetch_metadata());
        let (done, total) = work.fold((0, 0), |(done, total), task| {
            (done + usize::from(task.status == TaskStatus::Done), total + 1)
        });
        ProgressFraction { done, total }
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.created_at, self.finished_at, now)
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.task_id == task_id)
    }

    pub fn task_progress(&self, task_id: &TaskId) -> Option<TaskProgress> {
        self.progress.get(task_id).copied()
    }

    /// Display index per task in creation order: the fetch-metadata task is 0,
    /// work tasks are numbered from 1.
    pub fn task_indices(&self) -> Vec<usize> {
        let mut next = 1;
        self.tasks
            .iter()
            .map(|task| {
                if task.kind.is_fetch_metadata() {
                    0
                } else {
                    let index = next;
                    next += 1;
                    index
                }
            })
            .collect()
    }
}

impl Task {
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.created_at, self.finished_at, now)
    }
}

/// `(finished_at ?? now) - created_at` in whole seconds, floored at zero.
pub fn elapsed_secs(
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u64 {
    let end = finished_at.unwrap_or(now);
    let millis = (end - created_at).num_milliseconds();
    u64::try_from(millis.div_euclid(1000)).unwrap_or(0)
}

/// A download format advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub id: String,
    pub display: String,
}

/// Aggregate task counts from the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub num_total: u32,
    pub num_active: u32,
    pub num_waiting: u32,
    pub num_done: u32,
    pub num_cancelled: u32,
    pub num_failed: u32,
}
