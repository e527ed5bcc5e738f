use chrono::{DateTime, Utc};

use crate::{Action, IndicatorColor, JobId, LogStream, SyncReport, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A sync cycle finished (including skipped cycles).
    CycleCompleted(SyncReport),
    /// User turned periodic updates on or off; `None` flips the current value.
    SetUpdates(Option<bool>),
    /// User turned diagnostics on or off; `None` flips the current value.
    SetDebug(Option<bool>),
    /// User expanded or collapsed a job's task list; `None` flips membership.
    SetExpanded { job_id: JobId, expanded: Option<bool> },
    /// User asked for a job-level transition.
    JobAction { job_id: JobId, action: Action },
    /// User asked for a task-level transition.
    TaskAction { task_id: TaskId, action: Action },
    /// User asked for a transition on every job.
    BulkAction(Action),
    /// User asked for a task's captured output.
    OpenTaskLog { task_id: TaskId, stream: LogStream },
    /// User submitted a URL for conversion.
    SubmitUrl { url: String, format: Option<String> },
    /// User started a tracked download on the quick-download indicator.
    StartDownload { url: String, format: Option<String> },
    /// User asked the server to shut down.
    RequestShutdown,
    /// The server accepted the shutdown request.
    ShutdownAccepted,
    /// The quick-download indicator changed color.
    IndicatorChanged(IndicatorColor),
    /// Show a transient message.
    Notice { text: String, at: DateTime<Utc> },
    /// Fallback for blank input.
    NoOp,
}
