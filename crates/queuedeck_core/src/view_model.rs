use crate::{Action, Connectivity, IndicatorColor, JobId, ProgressFraction, StatusSummary, TaskId, TaskKind};

/// Render descriptor for the whole dashboard. Any renderer can consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub server: ServerBadge,
    pub counts: Option<StatusSummary>,
    pub updates_enabled: bool,
    pub debug_enabled: bool,
    pub shutdown: ShutdownBadge,
    pub indicator: IndicatorColor,
    pub notice: Option<String>,
    pub refusal: Option<String>,
    pub jobs: Vec<JobCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBadge {
    pub text: &'static str,
    pub color: &'static str,
    /// `None` until the first cycle completes.
    pub connectivity: Option<Connectivity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownBadge {
    pub text: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeClass {
    Waiting,
    Processing,
    Paused,
    PartiallyDone,
    Done,
    Failed,
    Cancelled,
}

impl BadgeClass {
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeClass::Waiting => "status-waiting",
            BadgeClass::Processing => "status-processing",
            BadgeClass::Paused => "status-paused",
            BadgeClass::PartiallyDone => "status-partially-done",
            BadgeClass::Done => "status-done",
            BadgeClass::Failed => "status-failed",
            BadgeClass::Cancelled => "status-cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub text: String,
    pub class: BadgeClass,
}

/// Enabled state of the per-entity action controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSet {
    pub cancel: bool,
    pub pause: bool,
    pub resume: bool,
    pub retry: bool,
    pub delete: bool,
}

impl ControlSet {
    pub fn from_predicate(allows: impl Fn(Action) -> bool) -> Self {
        Self {
            cancel: allows(Action::Cancel),
            pause: allows(Action::Pause),
            resume: allows(Action::Resume),
            retry: allows(Action::Retry),
            delete: allows(Action::Delete),
        }
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::Cancel => self.cancel,
            Action::Pause => self.pause,
            Action::Resume => self.resume,
            Action::Retry => self.retry,
            Action::Delete => self.delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub job_id: JobId,
    /// Ids are diagnostics and only shown when debug is on.
    pub show_id: bool,
    pub title: String,
    pub url: String,
    pub format: String,
    pub thumbnail: Option<String>,
    pub badge: StatusBadge,
    pub elapsed_secs: u64,
    pub elapsed_text: String,
    pub progress: ProgressFraction,
    pub progress_text: String,
    pub expanded: bool,
    pub controls: ControlSet,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub task_id: TaskId,
    pub index: usize,
    pub kind: TaskKind,
    /// Fetch-metadata tasks are diagnostics.
    pub diagnostic: bool,
    pub visible: bool,
    pub show_id: bool,
    pub title: String,
    pub url: String,
    pub format: String,
    pub thumbnail: Option<String>,
    pub badge: StatusBadge,
    pub elapsed_secs: u64,
    pub elapsed_text: String,
    /// "downloaded / estimate" when the server reported progress.
    pub transfer_text: Option<String>,
    pub controls: ControlSet,
    pub logs_enabled: bool,
}
