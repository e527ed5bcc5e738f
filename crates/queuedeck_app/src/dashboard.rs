use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use deck_logging::deck_info;
use queuedeck_core::{present, update, Msg};
use queuedeck_engine::{run_cycle, EffectRunner, Indicator, JobQueueApi, SyncLoop};
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::commands::Client;
use crate::config::AppConfig;
use crate::terminal::{dashboard_text, run_terminal, TerminalSink};

/// Renders a single cycle as plain text and returns.
pub async fn run_once(client: &Client, api: Arc<dyn JobQueueApi>) -> Result<()> {
    let session = client.fresh_session();
    let report = run_cycle(api.as_ref(), session.cycle_plan()).await;
    let (session, _) = update(session, Msg::CycleCompleted(report));
    print!("{}", dashboard_text(&present(&session, Utc::now())));
    Ok(())
}

/// Live dashboard until `quit`, Ctrl-C or a terminal failure.
pub async fn run(client: &Client, api: Arc<dyn JobQueueApi>, config: &AppConfig) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("the live dashboard needs a terminal; use `dashboard --once` instead");
    }

    let (tx, rx) = unbounded_channel();
    let indicator_tx = tx.clone();
    let indicator = Arc::new(Indicator::with_observer(move |color| {
        let _ = indicator_tx.send(Msg::IndicatorChanged(color));
    }));
    let runner = EffectRunner::new(
        api.clone(),
        tx.clone(),
        indicator,
        config.log_dir.clone(),
        config.watch_settings(),
    );

    let session = client.fresh_session();
    let (views_tx, views_rx) = watch::channel(present(&session, Utc::now()));
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let sync = SyncLoop::new(
        api,
        config.sync_settings(),
        runner,
        rx,
        TerminalSink::new(views_tx),
    );

    deck_info!("Dashboard started against {}", config.api_root);
    let (session, drawn) = tokio::join!(
        sync.run(session, cancel.clone()),
        run_terminal(views_rx, tx, cancel),
    );
    deck_info!(
        "Dashboard stopped, last server status {:?}",
        session.connectivity()
    );
    drawn?;
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancel.cancel();
    }
}
