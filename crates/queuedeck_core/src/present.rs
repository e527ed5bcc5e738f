use chrono::{DateTime, Utc};

use crate::view_model::{
    BadgeClass, ControlSet, DashboardView, JobCard, ServerBadge, ShutdownBadge, StatusBadge,
    TaskCard,
};
use crate::{format_bytes, Connectivity, Job, JobStatus, Session, Task, TaskProgress, TaskStatus};

/// Builds the render descriptor for a session snapshot. No I/O; the same
/// session and `now` always produce the same descriptor.
pub fn present(session: &Session, now: DateTime<Utc>) -> DashboardView {
    let shutdown = if session.shutdown_requested() {
        ShutdownBadge {
            text: "Shutdown requested",
            enabled: false,
        }
    } else {
        ShutdownBadge {
            text: "Shutdown server",
            enabled: true,
        }
    };

    DashboardView {
        server: server_badge(session.connectivity()),
        counts: session.summary(),
        updates_enabled: session.updates_enabled(),
        debug_enabled: session.debug_enabled(),
        shutdown,
        indicator: session.indicator(),
        notice: session
            .notice()
            .filter(|notice| notice.is_visible(now))
            .map(|notice| notice.text.clone()),
        refusal: session.refusal().map(ToString::to_string),
        jobs: session
            .jobs()
            .iter()
            .map(|job| job_card(session, job, now))
            .collect(),
    }
}

pub fn server_badge(connectivity: Option<Connectivity>) -> ServerBadge {
    let (text, color) = match connectivity {
        None => ("Connecting", "#9ca3af"),
        Some(Connectivity::Offline) => ("Offline", "#724c4c"),
        Some(Connectivity::Unauthorized) => ("Unauthorized", "#c05705"),
        Some(Connectivity::Error) => ("Internal error", "#de2706"),
        Some(Connectivity::Ok) => ("Ok", "rgb(100 116 139)"),
    };
    ServerBadge {
        text,
        color,
        connectivity,
    }
}

pub fn job_badge(status: JobStatus) -> StatusBadge {
    let class = match status {
        JobStatus::Waiting => BadgeClass::Waiting,
        JobStatus::Processing => BadgeClass::Processing,
        JobStatus::Paused => BadgeClass::Paused,
        JobStatus::PartiallyDone => BadgeClass::PartiallyDone,
        JobStatus::Done => BadgeClass::Done,
        JobStatus::Failed => BadgeClass::Failed,
        JobStatus::Cancelled => BadgeClass::Cancelled,
    };
    StatusBadge {
        text: status.to_string(),
        class,
    }
}

/// Processing tasks describe their transfer: no progress yet, a percentage,
/// or conversion at exactly 100%. Estimates can be exceeded, so a percentage
/// above 100 is still a download.
pub fn task_badge(status: TaskStatus, progress: Option<TaskProgress>) -> StatusBadge {
    let class = match status {
        TaskStatus::Waiting => BadgeClass::Waiting,
        TaskStatus::Processing => BadgeClass::Processing,
        TaskStatus::Paused => BadgeClass::Paused,
        TaskStatus::Done => BadgeClass::Done,
        TaskStatus::Failed => BadgeClass::Failed,
        TaskStatus::Cancelled => BadgeClass::Cancelled,
    };
    let text = match (status, progress) {
        (TaskStatus::Processing, None) => "Downloading".to_string(),
        (TaskStatus::Processing, Some(progress)) if progress.percent == 100 => {
            "Converting".to_string()
        }
        (TaskStatus::Processing, Some(progress)) => format!("Downloading {}%", progress.percent),
        (status, _) => status.to_string(),
    };
    StatusBadge { text, class }
}

fn job_card(session: &Session, job: &Job, now: DateTime<Utc>) -> JobCard {
    let debug = session.debug_enabled();
    let progress = job.progress_fraction();
    let elapsed_secs = job.elapsed_secs(now);
    let tasks = job
        .tasks
        .iter()
        .zip(job.task_indices())
        .map(|(task, index)| task_card(session, job, task, index, now))
        .collect();

    JobCard {
        job_id: job.job_id.clone(),
        show_id: debug,
        title: job.title.clone(),
        url: job.url.clone(),
        format: session.format_display(&job.format).to_string(),
        thumbnail: non_empty(&job.thumbnail),
        badge: job_badge(job.status),
        elapsed_secs,
        elapsed_text: format!("{elapsed_secs} seconds"),
        progress,
        progress_text: format!("{} out of {}", progress.done, progress.total),
        expanded: session.is_expanded(&job.job_id),
        controls: ControlSet::from_predicate(|action| job.status.allows(action)),
        tasks,
    }
}

fn task_card(
    session: &Session,
    job: &Job,
    task: &Task,
    index: usize,
    now: DateTime<Utc>,
) -> TaskCard {
    let debug = session.debug_enabled();
    let diagnostic = task.kind.is_fetch_metadata();
    let progress = job.task_progress(&task.task_id);
    let elapsed_secs = task.elapsed_secs(now);

    TaskCard {
        task_id: task.task_id.clone(),
        index,
        kind: task.kind,
        diagnostic,
        visible: !diagnostic || debug,
        show_id: debug,
        title: task.title.clone(),
        url: task.url.clone(),
        format: session.format_display(&task.format).to_string(),
        thumbnail: non_empty(&task.thumbnail),
        badge: task_badge(task.status, progress),
        elapsed_secs,
        elapsed_text: format!("{elapsed_secs} seconds"),
        transfer_text: progress.map(|progress| {
            format!(
                "{} / {}",
                format_bytes(progress.bytes_downloaded),
                format_bytes(progress.bytes_estimate)
            )
        }),
        controls: ControlSet::from_predicate(|action| task.status.allows(action)),
        logs_enabled: task.status.has_logs(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
