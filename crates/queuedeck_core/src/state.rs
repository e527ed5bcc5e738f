use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::view_model::DashboardView;
use crate::{Format, IndicatorColor, Job, JobId, Refusal, StatusSummary, Task, TaskId};

/// Outcome class of the most recent sync cycle that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// Liveness probe failed.
    Offline,
    /// Summary fetch was rejected.
    Unauthorized,
    /// Listing fetch failed after authentication succeeded.
    Error,
    Ok,
}

/// What the next sync cycle should fetch, derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    pub load_formats: bool,
    pub fetch_updates: bool,
}

/// Result of the liveness → summary → listing pipeline for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Updates were disabled; nothing was requested.
    Skipped,
    Offline,
    Unauthorized,
    Error { summary: StatusSummary },
    Ok {
        summary: StatusSummary,
        jobs: Vec<Job>,
    },
}

impl SyncOutcome {
    pub fn connectivity(&self) -> Option<Connectivity> {
        match self {
            SyncOutcome::Skipped => None,
            SyncOutcome::Offline => Some(Connectivity::Offline),
            SyncOutcome::Unauthorized => Some(Connectivity::Unauthorized),
            SyncOutcome::Error { .. } => Some(Connectivity::Error),
            SyncOutcome::Ok { .. } => Some(Connectivity::Ok),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Formats fetched this cycle, when the plan asked for them and the fetch succeeded.
    pub formats: Option<Vec<Format>>,
    pub outcome: SyncOutcome,
}

/// Transient message shown on the dashboard for [`Notice::TTL_SECS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

impl Notice {
    pub const TTL_SECS: i64 = 5;

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        (now - self.posted_at).num_seconds() < Self::TTL_SECS
    }
}

/// Client-local session context shared by the sync loop and the presenter.
///
/// Starts empty and is discarded when the process exits; nothing here is
/// persisted. Server entities are only ever replaced wholesale by a new
/// listing, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    formats: Vec<Format>,
    formats_loaded: bool,
    default_format: Option<String>,
    expanded: HashSet<JobId>,
    debug_enabled: bool,
    updates_enabled: bool,
    connectivity: Option<Connectivity>,
    summary: Option<StatusSummary>,
    jobs: Vec<Job>,
    indicator: IndicatorColor,
    notice: Option<Notice>,
    refusal: Option<Refusal>,
    shutdown_requested: bool,
    dirty: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            formats_loaded: false,
            default_format: None,
            expanded: HashSet::new(),
            debug_enabled: false,
            updates_enabled: true,
            connectivity: None,
            summary: None,
            jobs: Vec::new(),
            indicator: IndicatorColor::Idle,
            notice: None,
            refusal: None,
            shutdown_requested: false,
            dirty: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose submissions fall back to `format` when none is given.
    pub fn with_default_format(format: impl Into<String>) -> Self {
        Self {
            default_format: Some(format.into()),
            ..Self::default()
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> DashboardView {
        crate::present::present(self, now)
    }

    pub fn cycle_plan(&self) -> CyclePlan {
        CyclePlan {
            load_formats: !self.formats_loaded,
            fetch_updates: self.updates_enabled,
        }
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn formats_loaded(&self) -> bool {
        self.formats_loaded
    }

    /// Display name for a format id, or the id itself when unknown.
    pub fn format_display<'a>(&'a self, format_id: &'a str) -> &'a str {
        self.formats
            .iter()
            .find(|format| format.id == format_id)
            .map_or(format_id, |format| format.display.as_str())
    }

    pub fn default_format(&self) -> Option<&str> {
        self.default_format.as_deref()
    }

    pub fn is_expanded(&self, job_id: &JobId) -> bool {
        self.expanded.contains(job_id)
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn updates_enabled(&self) -> bool {
        self.updates_enabled
    }

    pub fn connectivity(&self) -> Option<Connectivity> {
        self.connectivity
    }

    pub fn summary(&self) -> Option<StatusSummary> {
        self.summary
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn indicator(&self) -> IndicatorColor {
        self.indicator
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The last request the action gate turned down, cleared by the next accepted one.
    pub fn refusal(&self) -> Option<&Refusal> {
        self.refusal.as_ref()
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    pub fn find_job(&self, job_id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| &job.job_id == job_id)
    }

    pub fn find_task(&self, task_id: &TaskId) -> Option<(&Job, &Task)> {
        self.jobs
            .iter()
            .find_map(|job| job.task(task_id).map(|task| (job, task)))
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn register_formats(&mut self, formats: Vec<Format>) {
        for format in formats {
            if !self.formats.iter().any(|known| known.id == format.id) {
                self.formats.push(format);
            }
        }
        self.formats_loaded = true;
        self.mark_dirty();
    }

    /// Applies a cycle outcome. Skipped cycles leave the previous classification in place.
    pub(crate) fn apply_outcome(&mut self, outcome: SyncOutcome) {
        let Some(connectivity) = outcome.connectivity() else {
            return;
        };
        self.connectivity = Some(connectivity);
        match outcome {
            SyncOutcome::Ok { summary, jobs } => {
                self.summary = Some(summary);
                self.expanded
                    .retain(|job_id| jobs.iter().any(|job| &job.job_id == job_id));
                self.jobs = jobs;
            }
            SyncOutcome::Error { summary } => {
                self.summary = Some(summary);
            }
            SyncOutcome::Skipped | SyncOutcome::Offline | SyncOutcome::Unauthorized => {}
        }
        self.mark_dirty();
    }

    pub(crate) fn set_updates_enabled(&mut self, enabled: bool) {
        if self.updates_enabled != enabled {
            self.updates_enabled = enabled;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_debug_enabled(&mut self, enabled: bool) {
        if self.debug_enabled != enabled {
            self.debug_enabled = enabled;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_expanded(&mut self, job_id: JobId, expanded: bool) {
        let changed = if expanded {
            self.expanded.insert(job_id)
        } else {
            self.expanded.remove(&job_id)
        };
        if changed {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_indicator(&mut self, color: IndicatorColor) {
        if self.indicator != color {
            self.indicator = color;
            self.mark_dirty();
        }
    }

    pub(crate) fn post_notice(&mut self, text: String, posted_at: DateTime<Utc>) {
        self.notice = Some(Notice { text, posted_at });
        self.mark_dirty();
    }

    pub(crate) fn set_refusal(&mut self, refusal: Option<Refusal>) {
        if self.refusal != refusal {
            self.refusal = refusal;
            self.mark_dirty();
        }
    }

    pub(crate) fn mark_shutdown_requested(&mut self) {
        self.shutdown_requested = true;
        self.updates_enabled = false;
        self.mark_dirty();
    }
}
