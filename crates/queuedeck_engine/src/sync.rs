use std::sync::Arc;
use std::time::Duration;

use deck_logging::{deck_debug, deck_info, deck_warn, SYNC_TARGET};
use queuedeck_core::{update, CyclePlan, Msg, Session, SyncOutcome, SyncReport};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{EffectRunner, JobQueueApi};

#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Receives the session whenever the dashboard should be redrawn.
pub trait DashboardSink: Send {
    fn render(&mut self, session: &Session);
}

/// One sync cycle: formats when the plan asks for them, then
/// liveness → summary → listing, stopping at the first failure.
pub async fn run_cycle(api: &dyn JobQueueApi, plan: CyclePlan) -> SyncReport {
    let formats = if plan.load_formats {
        match api.list_formats().await {
            Ok(formats) => Some(formats),
            Err(err) => {
                deck_warn!(target: SYNC_TARGET, "Failed to load formats: {err}");
                None
            }
        }
    } else {
        None
    };

    let outcome = if plan.fetch_updates {
        fetch_snapshot(api).await
    } else {
        SyncOutcome::Skipped
    };

    SyncReport { formats, outcome }
}

async fn fetch_snapshot(api: &dyn JobQueueApi) -> SyncOutcome {
    if let Err(err) = api.ping().await {
        deck_debug!(target: SYNC_TARGET, "Liveness probe failed: {err}");
        return SyncOutcome::Offline;
    }

    let summary = match api.status_summary().await {
        Ok(summary) => summary,
        Err(err) => {
            deck_debug!(target: SYNC_TARGET, "Summary rejected: {err}");
            return SyncOutcome::Unauthorized;
        }
    };

    match api.list_jobs().await {
        Ok(jobs) => SyncOutcome::Ok { summary, jobs },
        Err(err) => {
            deck_warn!(target: SYNC_TARGET, "Listing failed: {err}");
            SyncOutcome::Error { summary }
        }
    }
}

/// Owns the session and drives it: periodic cycles, inbox messages, effects
/// and redraws.
///
/// Cycles never overlap. The next one is armed `interval` after the previous
/// one completed, whatever its outcome. Inbox messages are applied while a
/// cycle is in flight, so user input is never held behind a slow server.
pub struct SyncLoop<S: DashboardSink> {
    api: Arc<dyn JobQueueApi>,
    settings: SyncSettings,
    runner: EffectRunner,
    inbox: UnboundedReceiver<Msg>,
    sink: S,
}

impl<S: DashboardSink> SyncLoop<S> {
    pub fn new(
        api: Arc<dyn JobQueueApi>,
        settings: SyncSettings,
        runner: EffectRunner,
        inbox: UnboundedReceiver<Msg>,
        sink: S,
    ) -> Self {
        Self {
            api,
            settings,
            runner,
            inbox,
            sink,
        }
    }

    /// Runs until `cancel` fires and hands back the final session.
    pub async fn run(mut self, mut session: Session, cancel: CancellationToken) -> Session {
        let api = self.api.clone();
        let mut inbox_open = true;
        self.sink.render(&session);

        loop {
            let cycle = run_cycle(api.as_ref(), session.cycle_plan());
            tokio::pin!(cycle);

            let report = loop {
                tokio::select! {
                    report = &mut cycle => break Some(report),
                    msg = self.inbox.recv(), if inbox_open => match msg {
                        Some(msg) => session = self.apply(session, msg),
                        None => inbox_open = false,
                    },
                    _ = cancel.cancelled() => break None,
                }
            };
            let Some(report) = report else {
                return session;
            };

            session = self.complete_cycle(session, report);

            let deadline = Instant::now() + self.settings.interval;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => break,
                    msg = self.inbox.recv(), if inbox_open => match msg {
                        Some(msg) => session = self.apply(session, msg),
                        None => inbox_open = false,
                    },
                    _ = cancel.cancelled() => return session,
                }
            }
        }
    }

    fn complete_cycle(&mut self, session: Session, report: SyncReport) -> Session {
        let before = session.connectivity();
        let after = report.outcome.connectivity();
        match after {
            Some(now) if before != Some(now) => {
                deck_info!(target: SYNC_TARGET, "Server status {before:?} -> {now:?}");
            }
            Some(now) => deck_debug!(target: SYNC_TARGET, "Cycle finished: {now:?}"),
            None => deck_debug!(target: SYNC_TARGET, "Cycle skipped, updates disabled"),
        }

        let (mut session, effects) = update(session, Msg::CycleCompleted(report));
        for effect in effects {
            self.runner.spawn(effect);
        }
        // Elapsed times and notice expiry move with the clock, so every
        // cycle redraws.
        session.consume_dirty();
        self.sink.render(&session);
        session
    }

    fn apply(&mut self, session: Session, msg: Msg) -> Session {
        let gated = matches!(
            msg,
            Msg::JobAction { .. }
                | Msg::TaskAction { .. }
                | Msg::OpenTaskLog { .. }
                | Msg::SubmitUrl { .. }
                | Msg::StartDownload { .. }
        );
        let (mut session, effects) = update(session, msg);
        if gated && effects.is_empty() {
            if let Some(refusal) = session.refusal() {
                deck_info!(target: SYNC_TARGET, "Refused: {refusal}");
            }
        }
        for effect in effects {
            self.runner.spawn(effect);
        }
        if session.consume_dirty() {
            self.sink.render(&session);
        }
        session
    }
}
