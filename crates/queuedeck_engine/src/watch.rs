//! Download indicator and the polling chain that drives it.
//!
//! One [`Indicator`] is shared by every quick download. Each submission
//! bumps the indicator's generation; a chain holding an older
//! [`WatchToken`] can no longer paint, so a superseded chain goes quiet
//! without any explicit cancel call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deck_logging::{deck_debug, deck_info, deck_warn, WATCH_TARGET};
use queuedeck_core::{watch_step, IndicatorColor, JobId, WatchStep};

use crate::JobQueueApi;

const COLOR_BITS: u32 = 8;
const COLOR_MASK: u64 = (1 << COLOR_BITS) - 1;

#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Delay between status polls of a non-terminal job.
    pub interval: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Fencing token: the job a chain watches plus the generation it was bound in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchToken {
    pub job_id: JobId,
    pub generation: u64,
}

type Observer = Box<dyn Fn(IndicatorColor) + Send + Sync>;

/// Indicator color packed next to a generation counter in one atomic word,
/// so the token comparison and the paint happen in a single step.
pub struct Indicator {
    state: AtomicU64,
    observer: Option<Observer>,
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}

fn pack(generation: u64, color: IndicatorColor) -> u64 {
    (generation << COLOR_BITS) | u64::from(color.code())
}

fn unpack(word: u64) -> (u64, IndicatorColor) {
    // Masked to eight bits, so the narrowing is lossless.
    let code = (word & COLOR_MASK) as u8;
    (word >> COLOR_BITS, IndicatorColor::from_code(code))
}

impl Indicator {
    pub fn new() -> Self {
        Self {
            state: AtomicU64::new(pack(0, IndicatorColor::Idle)),
            observer: None,
        }
    }

    /// Calls `observer` whenever the visible color changes.
    pub fn with_observer(observer: impl Fn(IndicatorColor) + Send + Sync + 'static) -> Self {
        Self {
            state: AtomicU64::new(pack(0, IndicatorColor::Idle)),
            observer: Some(Box::new(observer)),
        }
    }

    pub fn color(&self) -> IndicatorColor {
        unpack(self.state.load(Ordering::Acquire)).1
    }

    pub fn generation(&self) -> u64 {
        unpack(self.state.load(Ordering::Acquire)).0
    }

    /// Starts a new submission: fences out every earlier chain and paints gray.
    pub fn begin_submission(&self) -> u64 {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (generation, previous) = unpack(current);
            let next_generation = generation.wrapping_add(1) & (u64::MAX >> COLOR_BITS);
            let next = pack(next_generation, IndicatorColor::Gray);
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.notify(previous, IndicatorColor::Gray);
                    return next_generation;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Binds the created job to the submission, unless a newer one started meanwhile.
    pub fn bind(&self, generation: u64, job_id: JobId) -> Option<WatchToken> {
        (self.generation() == generation).then_some(WatchToken { job_id, generation })
    }

    pub fn is_current(&self, token: &WatchToken) -> bool {
        self.generation() == token.generation
    }

    /// Paints `color` if the generation still matches. Returns whether it did.
    pub fn paint_generation(&self, generation: u64, color: IndicatorColor) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (held, previous) = unpack(current);
            if held != generation {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                pack(generation, color),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.notify(previous, color);
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn paint(&self, token: &WatchToken, color: IndicatorColor) -> bool {
        self.paint_generation(token.generation, color)
    }

    fn notify(&self, previous: IndicatorColor, next: IndicatorColor) {
        if previous != next {
            if let Some(observer) = &self.observer {
                observer(next);
            }
        }
    }
}

/// Submits `url` and follows the resulting job on `indicator` until it
/// reaches a terminal status or a newer submission takes over.
pub async fn watch_download(
    api: Arc<dyn JobQueueApi>,
    indicator: Arc<Indicator>,
    url: String,
    format: String,
    settings: WatchSettings,
) {
    let generation = indicator.begin_submission();
    deck_info!(target: WATCH_TARGET, "Quick download of {url} as {format}");

    let job_id = match api.create_job(&url, &format).await {
        Ok(job_id) => job_id,
        Err(err) => {
            deck_warn!(target: WATCH_TARGET, "Failed to submit {url}: {err}");
            indicator.paint_generation(generation, IndicatorColor::Red);
            return;
        }
    };

    let Some(token) = indicator.bind(generation, job_id) else {
        deck_debug!(target: WATCH_TARGET, "Submission superseded before binding");
        return;
    };
    follow_job(api.as_ref(), indicator.as_ref(), token, &settings).await;
}

/// Polls the bound job immediately, then every `settings.interval` while it
/// is still queued or running.
pub async fn follow_job(
    api: &dyn JobQueueApi,
    indicator: &Indicator,
    token: WatchToken,
    settings: &WatchSettings,
) {
    loop {
        if !indicator.is_current(&token) {
            deck_debug!(target: WATCH_TARGET, "Chain for {} fenced out", token.job_id);
            return;
        }

        let step = match api.job_status(&token.job_id).await {
            Ok(status) => watch_step(status),
            Err(err) => {
                deck_warn!(target: WATCH_TARGET, "Failed to poll {}: {err}", token.job_id);
                WatchStep::Finish(IndicatorColor::Red)
            }
        };

        if !indicator.paint(&token, step.color()) {
            deck_debug!(target: WATCH_TARGET, "Stale poll for {} dropped", token.job_id);
            return;
        }

        match step {
            WatchStep::Continue(_) => tokio::time::sleep(settings.interval).await,
            WatchStep::Finish(color) => {
                deck_info!(target: WATCH_TARGET, "Job {} finished {}", token.job_id, color.label());
                return;
            }
        }
    }
}
