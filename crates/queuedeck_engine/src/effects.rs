use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use deck_logging::{deck_info, deck_warn, SYNC_TARGET};
use queuedeck_core::{Effect, LogStream, Msg, TaskId};
use tokio::sync::mpsc::UnboundedSender;

use crate::persist::{task_log_filename, AtomicFileWriter, PersistError};
use crate::watch::{watch_download, Indicator, WatchSettings};
use crate::JobQueueApi;

pub const SUBMITTED_NOTICE: &str = "URL submitted";
pub const SUBMIT_FAILED_NOTICE: &str = "Failed to submit URL";

/// A notice stamped with the current time.
pub fn notice(text: impl Into<String>) -> Msg {
    Msg::Notice {
        text: text.into(),
        at: Utc::now(),
    }
}

/// Executes effects produced by `update` and reports back through the inbox.
///
/// Results never edit the session directly: action outcomes are only logged
/// and the next listing shows what the server did.
#[derive(Clone)]
pub struct EffectRunner {
    api: Arc<dyn JobQueueApi>,
    inbox: UnboundedSender<Msg>,
    indicator: Arc<Indicator>,
    log_writer: Arc<AtomicFileWriter>,
    watch: WatchSettings,
}

impl EffectRunner {
    pub fn new(
        api: Arc<dyn JobQueueApi>,
        inbox: UnboundedSender<Msg>,
        indicator: Arc<Indicator>,
        log_dir: PathBuf,
        watch: WatchSettings,
    ) -> Self {
        Self {
            api,
            inbox,
            indicator,
            log_writer: Arc::new(AtomicFileWriter::new(log_dir)),
            watch,
        }
    }

    pub fn indicator(&self) -> &Arc<Indicator> {
        &self.indicator
    }

    /// Runs the effect on its own task; the caller never waits for it.
    pub fn spawn(&self, effect: Effect) {
        let runner = self.clone();
        tokio::spawn(async move { runner.execute(effect).await });
    }

    pub async fn execute(&self, effect: Effect) {
        match effect {
            Effect::SendJobAction { job_id, action } => {
                if let Err(err) = self.api.job_action(&job_id, action).await {
                    deck_warn!(target: SYNC_TARGET, "Failed to {action} job {job_id}: {err}");
                }
            }
            Effect::SendTaskAction { task_id, action } => {
                if let Err(err) = self.api.task_action(&task_id, action).await {
                    deck_warn!(target: SYNC_TARGET, "Failed to {action} task {task_id}: {err}");
                }
            }
            Effect::SendBulkAction { action } => {
                if let Err(err) = self.api.bulk_action(action).await {
                    deck_warn!(target: SYNC_TARGET, "Failed to {action} all jobs: {err}");
                }
            }
            Effect::FetchTaskLog { task_id, stream } => self.save_task_log(task_id, stream).await,
            Effect::SubmitJob { url, format } => {
                let text = match self.api.create_job(&url, &format).await {
                    Ok(job_id) => {
                        deck_info!(target: SYNC_TARGET, "Submitted {url} as job {job_id}");
                        SUBMITTED_NOTICE
                    }
                    Err(err) => {
                        deck_warn!(target: SYNC_TARGET, "Failed to submit {url}: {err}");
                        SUBMIT_FAILED_NOTICE
                    }
                };
                self.notice(text);
            }
            Effect::StartDownload { url, format } => {
                watch_download(
                    self.api.clone(),
                    self.indicator.clone(),
                    url,
                    format,
                    self.watch.clone(),
                )
                .await;
            }
            Effect::RequestShutdown => match self.api.shutdown().await {
                Ok(()) => {
                    deck_info!(target: SYNC_TARGET, "Server shutdown requested");
                    self.send(Msg::ShutdownAccepted);
                }
                Err(err) => deck_warn!(target: SYNC_TARGET, "Failed to request shutdown: {err}"),
            },
        }
    }

    async fn save_task_log(&self, task_id: TaskId, stream: LogStream) {
        let bytes = match self.api.task_log(&task_id, stream).await {
            Ok(bytes) => bytes,
            Err(err) => {
                deck_warn!(target: SYNC_TARGET, "Failed to fetch {stream} of task {task_id}: {err}");
                self.notice(format!("Failed to fetch {stream} of task {task_id}"));
                return;
            }
        };

        let writer = self.log_writer.clone();
        let filename = task_log_filename(&task_id, stream);
        let saved = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes))
            .await
            .unwrap_or_else(|join| Err(PersistError::Io(std::io::Error::other(join))));

        match saved {
            Ok(path) => self.notice(format!("Saved {stream} of task {task_id} to {}", path.display())),
            Err(err) => {
                deck_warn!(target: SYNC_TARGET, "Failed to save {stream} of task {task_id}: {err}");
                self.notice(format!("Failed to save {stream} of task {task_id}"));
            }
        }
    }

    fn notice(&self, text: impl Into<String>) {
        self.send(notice(text));
    }

    fn send(&self, msg: Msg) {
        let _ = self.inbox.send(msg);
    }
}
