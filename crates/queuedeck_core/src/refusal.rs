use std::fmt;

use crate::{Action, JobId, JobStatus, TaskId, TaskStatus};

/// Why a user request was not turned into an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    UnknownJob(JobId),
    UnknownTask(TaskId),
    JobActionNotAllowed {
        job_id: JobId,
        action: Action,
        status: JobStatus,
    },
    TaskActionNotAllowed {
        task_id: TaskId,
        action: Action,
        status: TaskStatus,
    },
    LogsUnavailable {
        task_id: TaskId,
        status: TaskStatus,
    },
    InvalidUrl(String),
    NoFormat,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::UnknownJob(job_id) => write!(f, "no job {job_id} in the current listing"),
            Refusal::UnknownTask(task_id) => {
                write!(f, "no task {task_id} in the current listing")
            }
            Refusal::JobActionNotAllowed {
                job_id,
                action,
                status,
            } => write!(f, "cannot {action} job {job_id} while {status}"),
            Refusal::TaskActionNotAllowed {
                task_id,
                action,
                status,
            } => write!(f, "cannot {action} task {task_id} while {status}"),
            Refusal::LogsUnavailable { task_id, status } => {
                write!(f, "no logs for task {task_id} while {status}")
            }
            Refusal::InvalidUrl(url) => write!(f, "not a valid url: {url}"),
            Refusal::NoFormat => write!(f, "no format given and none known yet"),
        }
    }
}
