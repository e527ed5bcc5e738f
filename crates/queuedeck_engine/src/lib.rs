//! Queuedeck engine: HTTP client, sync loop, download watch chains and
//! effect execution.
mod api;
mod effects;
mod persist;
mod sync;
mod types;
mod watch;

pub use api::{ApiSettings, Credentials, JobQueueApi, ReqwestApi, StaticTokens, TokenStore};
pub use effects::{notice, EffectRunner, SUBMITTED_NOTICE, SUBMIT_FAILED_NOTICE};
pub use persist::{ensure_dir, task_log_filename, AtomicFileWriter, PersistError};
pub use sync::{run_cycle, DashboardSink, SyncLoop, SyncSettings};
pub use types::{ApiError, FailureKind};
pub use watch::{follow_job, watch_download, Indicator, WatchSettings, WatchToken};
