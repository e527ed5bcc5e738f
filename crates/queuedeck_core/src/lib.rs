//! Queuedeck core: status model, action gate and presenter. No I/O.
mod effect;
mod indicator;
mod model;
mod msg;
mod present;
mod refusal;
mod state;
mod status;
mod units;
mod update;
mod view_model;

pub use effect::Effect;
pub use indicator::{watch_step, IndicatorColor, WatchStep};
pub use model::{
    elapsed_secs, Format, Job, JobId, ProgressFraction, StatusSummary, Task, TaskId, TaskKind,
    TaskProgress,
};
pub use msg::Msg;
pub use present::{job_badge, present, server_badge, task_badge};
pub use refusal::Refusal;
pub use state::{Connectivity, CyclePlan, Notice, Session, SyncOutcome, SyncReport};
pub use status::{Action, JobStatus, LogStream, TaskStatus};
pub use units::{format_bytes, format_bytes_with};
pub use update::update;
pub use view_model::{
    BadgeClass, ControlSet, DashboardView, JobCard, ServerBadge, ShutdownBadge, StatusBadge,
    TaskCard,
};
