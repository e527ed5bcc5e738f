use crate::{Effect, Msg, Refusal, Session};

/// Pure update function: applies a message to the session and returns the
/// requests to send. Action requests are checked against the latest snapshot
/// here; an illegal one records a [`Refusal`] and produces no effect.
pub fn update(mut state: Session, msg: Msg) -> (Session, Vec<Effect>) {
    let effects = match msg {
        Msg::CycleCompleted(report) => {
            if let Some(formats) = report.formats {
                state.register_formats(formats);
            }
            state.apply_outcome(report.outcome);
            Vec::new()
        }
        Msg::SetUpdates(value) => {
            let enabled = value.unwrap_or(!state.updates_enabled());
            state.set_updates_enabled(enabled);
            Vec::new()
        }
        Msg::SetDebug(value) => {
            let enabled = value.unwrap_or(!state.debug_enabled());
            state.set_debug_enabled(enabled);
            Vec::new()
        }
        Msg::SetExpanded { job_id, expanded } => {
            let expanded = expanded.unwrap_or(!state.is_expanded(&job_id));
            state.set_expanded(job_id, expanded);
            Vec::new()
        }
        Msg::JobAction { job_id, action } => {
            let verdict = match state.find_job(&job_id) {
                None => Err(Refusal::UnknownJob(job_id)),
                Some(job) if !job.status.allows(action) => Err(Refusal::JobActionNotAllowed {
                    status: job.status,
                    job_id,
                    action,
                }),
                Some(_) => Ok(Effect::SendJobAction { job_id, action }),
            };
            settle(&mut state, verdict)
        }
        Msg::TaskAction { task_id, action } => {
            let verdict = match state.find_task(&task_id).map(|(_, task)| task.status) {
                None => Err(Refusal::UnknownTask(task_id)),
                Some(status) if !status.allows(action) => Err(Refusal::TaskActionNotAllowed {
                    task_id,
                    action,
                    status,
                }),
                Some(_) => Ok(Effect::SendTaskAction { task_id, action }),
            };
            settle(&mut state, verdict)
        }
        Msg::BulkAction(action) => settle(&mut state, Ok(Effect::SendBulkAction { action })),
        Msg::OpenTaskLog { task_id, stream } => {
            let verdict = match state.find_task(&task_id).map(|(_, task)| task.status) {
                None => Err(Refusal::UnknownTask(task_id)),
                Some(status) if !status.has_logs() => {
                    Err(Refusal::LogsUnavailable { task_id, status })
                }
                Some(_) => Ok(Effect::FetchTaskLog { task_id, stream }),
            };
            settle(&mut state, verdict)
        }
        Msg::SubmitUrl { url, format } => {
            let verdict = resolve_submission(&state, url, format)
                .map(|(url, format)| Effect::SubmitJob { url, format });
            settle(&mut state, verdict)
        }
        Msg::StartDownload { url, format } => {
            let verdict = resolve_submission(&state, url, format)
                .map(|(url, format)| Effect::StartDownload { url, format });
            settle(&mut state, verdict)
        }
        Msg::RequestShutdown => {
            if state.shutdown_requested() {
                Vec::new()
            } else {
                settle(&mut state, Ok(Effect::RequestShutdown))
            }
        }
        Msg::ShutdownAccepted => {
            state.mark_shutdown_requested();
            Vec::new()
        }
        Msg::IndicatorChanged(color) => {
            state.set_indicator(color);
            Vec::new()
        }
        Msg::Notice { text, at } => {
            state.post_notice(text, at);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn settle(state: &mut Session, verdict: Result<Effect, Refusal>) -> Vec<Effect> {
    match verdict {
        Ok(effect) => {
            state.set_refusal(None);
            vec![effect]
        }
        Err(refusal) => {
            state.set_refusal(Some(refusal));
            Vec::new()
        }
    }
}

fn resolve_submission(
    state: &Session,
    url: String,
    format: Option<String>,
) -> Result<(String, String), Refusal> {
    let url = url.trim().to_string();
    if url::Url::parse(&url).is_err() {
        return Err(Refusal::InvalidUrl(url));
    }
    let format = format
        .filter(|format| !format.trim().is_empty())
        .or_else(|| state.default_format().map(ToOwned::to_owned))
        .or_else(|| state.formats().first().map(|format| format.id.clone()))
        .ok_or(Refusal::NoFormat)?;
    Ok((url, format))
}
