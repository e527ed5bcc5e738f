use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-reported job status. Unknown values fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Processing,
    Paused,
    PartiallyDone,
    Done,
    Failed,
    Cancelled,
}

/// Server-reported task status. Unknown values fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Waiting,
    Processing,
    Paused,
    Done,
    Failed,
    Cancelled,
}

/// A state transition the client may ask the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Cancel,
    Pause,
    Resume,
    Retry,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Cancel,
        Action::Pause,
        Action::Resume,
        Action::Retry,
        Action::Delete,
    ];

    /// Path segment used by the job, task and bulk endpoints.
    pub fn as_path(self) -> &'static str {
        match self {
            Action::Cancel => "cancel",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Retry => "retry",
            Action::Delete => "delete",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_path().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Which captured output stream of a task to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "stdout" | "out" => Some(LogStream::Stdout),
            "stderr" | "err" => Some(LogStream::Stderr),
            _ => None,
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JobStatus {
    /// Whether `action` may be requested for a job in this status.
    pub fn allows(self, action: Action) -> bool {
        use JobStatus::*;
        match action {
            Action::Cancel | Action::Pause => matches!(self, Waiting | Processing),
            Action::Resume => matches!(self, Paused),
            Action::Retry => matches!(self, PartiallyDone | Cancelled | Paused | Failed),
            Action::Delete => true,
        }
    }

    /// Waiting and Processing are the only statuses worth polling again.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Waiting | JobStatus::Processing)
    }
}

impl TaskStatus {
    /// Whether `action` may be requested for a task in this status.
    pub fn allows(self, action: Action) -> bool {
        use TaskStatus::*;
        match action {
            Action::Cancel | Action::Pause => matches!(self, Waiting | Processing),
            Action::Resume => matches!(self, Paused),
            Action::Retry => matches!(self, Cancelled | Paused | Failed),
            Action::Delete => true,
        }
    }

    /// Captured stdout/stderr can be viewed once a task has stopped short of success.
    pub fn has_logs(self) -> bool {
        !matches!(self, TaskStatus::Waiting | TaskStatus::Done | TaskStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            JobStatus::Waiting => "Waiting",
            JobStatus::Processing => "Processing",
            JobStatus::Paused => "Paused",
            JobStatus::PartiallyDone => "Partially Done",
            JobStatus::Done => "Done",
            JobStatus::Failed => "Failed",
            JobStatus::Cancelled => "Cancelled",
        };
        f.write_str(text)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TaskStatus::Waiting => "Waiting",
            TaskStatus::Processing => "Processing",
            TaskStatus::Paused => "Paused",
            TaskStatus::Done => "Done",
            TaskStatus::Failed => "Failed",
            TaskStatus::Cancelled => "Cancelled",
        };
        f.write_str(text)
    }
}
