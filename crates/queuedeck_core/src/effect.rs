use crate::{Action, JobId, LogStream, TaskId};

/// Requests the engine must send. Only legal actions ever become effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendJobAction { job_id: JobId, action: Action },
    SendTaskAction { task_id: TaskId, action: Action },
    SendBulkAction { action: Action },
    FetchTaskLog { task_id: TaskId, stream: LogStream },
    SubmitJob { url: String, format: String },
    StartDownload { url: String, format: String },
    RequestShutdown,
}
