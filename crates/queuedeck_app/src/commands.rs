//! One-shot commands. Requests that the dashboard gates are gated here too:
//! the message goes through `update` first and only an emitted effect reaches
//! the server.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use deck_logging::deck_info;
use queuedeck_core::{
    server_badge, update, CyclePlan, Effect, IndicatorColor, Msg, Session, SyncOutcome,
};
use queuedeck_engine::{
    run_cycle, task_log_filename, watch_download, AtomicFileWriter, Indicator, JobQueueApi,
};

use crate::config::AppConfig;

pub struct Client {
    api: Arc<dyn JobQueueApi>,
    config: AppConfig,
}

impl Client {
    pub fn new(api: Arc<dyn JobQueueApi>, config: AppConfig) -> Self {
        Self { api, config }
    }

    pub fn fresh_session(&self) -> Session {
        Session::with_default_format(self.config.default_format.clone())
    }

    /// A session holding the current listing, for requests gated on status.
    pub async fn listed_session(&self) -> Result<Session> {
        let plan = CyclePlan {
            load_formats: false,
            fetch_updates: true,
        };
        let report = run_cycle(self.api.as_ref(), plan).await;
        if !matches!(report.outcome, SyncOutcome::Ok { .. }) {
            bail!(
                "server status: {}",
                server_badge(report.outcome.connectivity()).text
            );
        }
        let (session, _) = update(self.fresh_session(), Msg::CycleCompleted(report));
        Ok(session)
    }

    /// Runs `msg` through the gate against `session` and performs the result.
    pub async fn gated(&self, session: Session, msg: Msg) -> Result<()> {
        let (session, effects) = update(session, msg);
        if effects.is_empty() {
            return match session.refusal() {
                Some(refusal) => Err(anyhow!("refused: {refusal}")),
                None => Ok(()),
            };
        }
        for effect in effects {
            self.perform(effect).await?;
        }
        Ok(())
    }

    async fn perform(&self, effect: Effect) -> Result<()> {
        match effect {
            Effect::SendJobAction { job_id, action } => {
                self.api
                    .job_action(&job_id, action)
                    .await
                    .with_context(|| format!("failed to {action} job {job_id}"))?;
                println!("Requested {action} of job {job_id}");
            }
            Effect::SendTaskAction { task_id, action } => {
                self.api
                    .task_action(&task_id, action)
                    .await
                    .with_context(|| format!("failed to {action} task {task_id}"))?;
                println!("Requested {action} of task {task_id}");
            }
            Effect::SendBulkAction { action } => {
                self.api
                    .bulk_action(action)
                    .await
                    .with_context(|| format!("failed to {action} all jobs"))?;
                println!("Requested {action} of all jobs");
            }
            Effect::FetchTaskLog { task_id, stream } => {
                let bytes = self
                    .api
                    .task_log(&task_id, stream)
                    .await
                    .with_context(|| format!("failed to fetch {stream} of task {task_id}"))?;
                let writer = AtomicFileWriter::new(self.config.log_dir.clone());
                let path = writer
                    .write(&task_log_filename(&task_id, stream), &bytes)
                    .context("failed to save task log")?;
                println!("{}", path.display());
            }
            Effect::SubmitJob { url, format } => {
                let job_id = self
                    .api
                    .create_job(&url, &format)
                    .await
                    .context("failed to submit URL")?;
                deck_info!("Submitted {url} as job {job_id}");
                println!("{job_id}");
            }
            Effect::StartDownload { url, format } => self.download(url, format).await?,
            Effect::RequestShutdown => {
                self.api
                    .shutdown()
                    .await
                    .context("failed to request shutdown")?;
                println!("Shutdown requested");
            }
        }
        Ok(())
    }

    /// Follows a quick download in the terminal, printing each color change.
    async fn download(&self, url: String, format: String) -> Result<()> {
        let indicator = Arc::new(Indicator::with_observer(|color: IndicatorColor| {
            println!("{} {}", color.label(), color.hex());
        }));
        watch_download(
            self.api.clone(),
            indicator.clone(),
            url,
            format,
            self.config.watch_settings(),
        )
        .await;
        match indicator.color() {
            IndicatorColor::Green => Ok(()),
            other => bail!("download ended {}", other.label()),
        }
    }

    pub async fn print_formats(&self) -> Result<()> {
        let formats = self
            .api
            .list_formats()
            .await
            .context("failed to load formats")?;
        for format in formats {
            println!("{}\t{}", format.id, format.display);
        }
        Ok(())
    }

    pub async fn print_status(&self) -> Result<()> {
        let session = self.listed_session().await?;
        println!("server: {}", server_badge(session.connectivity()).text);
        if let Some(counts) = session.summary() {
            println!(
                "total {} | active {} | waiting {} | done {} | cancelled {} | failed {}",
                counts.num_total,
                counts.num_active,
                counts.num_waiting,
                counts.num_done,
                counts.num_cancelled,
                counts.num_failed,
            );
        }
        for job in session.jobs() {
            let progress = job.progress_fraction();
            println!(
                "{}\t{}\t{} out of {}\t{}",
                job.job_id, job.status, progress.done, progress.total, job.url
            );
        }
        Ok(())
    }

    pub async fn show_remote_config(&self) -> Result<()> {
        let value = self
            .api
            .get_config()
            .await
            .context("failed to read server config")?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }

    pub async fn set_remote_config(&self, raw: &str) -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("config must be valid JSON")?;
        self.api
            .set_config(&value)
            .await
            .context("failed to update server config")?;
        println!("Config updated");
        Ok(())
    }
}
