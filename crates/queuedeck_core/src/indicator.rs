use crate::JobStatus;

/// Color of the per-download indicator. It carries no numeric detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndicatorColor {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Job creation request in flight.
    Gray,
    Violet,
    Yellow,
    Green,
    Red,
}

impl IndicatorColor {
    pub fn hex(self) -> &'static str {
        match self {
            IndicatorColor::Idle => "#ffffff",
            IndicatorColor::Gray => "#d5d5d5",
            IndicatorColor::Violet => "#410794",
            IndicatorColor::Yellow => "#fff200",
            IndicatorColor::Green => "#0f0",
            IndicatorColor::Red => "#f00",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IndicatorColor::Idle => "idle",
            IndicatorColor::Gray => "gray",
            IndicatorColor::Violet => "violet",
            IndicatorColor::Yellow => "yellow",
            IndicatorColor::Green => "green",
            IndicatorColor::Red => "red",
        }
    }

    /// Compact encoding used to pack the color next to a generation counter.
    pub fn code(self) -> u8 {
        match self {
            IndicatorColor::Idle => 0,
            IndicatorColor::Gray => 1,
            IndicatorColor::Violet => 2,
            IndicatorColor::Yellow => 3,
            IndicatorColor::Green => 4,
            IndicatorColor::Red => 5,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => IndicatorColor::Gray,
            2 => IndicatorColor::Violet,
            3 => IndicatorColor::Yellow,
            4 => IndicatorColor::Green,
            5 => IndicatorColor::Red,
            _ => IndicatorColor::Idle,
        }
    }
}

/// What a watch chain does after observing a job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStep {
    /// Paint and poll again after the watch interval.
    Continue(IndicatorColor),
    /// Paint and stop the chain.
    Finish(IndicatorColor),
}

impl WatchStep {
    pub fn color(self) -> IndicatorColor {
        match self {
            WatchStep::Continue(color) | WatchStep::Finish(color) => color,
        }
    }
}

/// Maps a polled job status to the indicator's next step.
pub fn watch_step(status: JobStatus) -> WatchStep {
    match status {
        JobStatus::Waiting => WatchStep::Continue(IndicatorColor::Violet),
        JobStatus::Processing => WatchStep::Continue(IndicatorColor::Yellow),
        JobStatus::Done => WatchStep::Finish(IndicatorColor::Green),
        JobStatus::Paused
        | JobStatus::PartiallyDone
        | JobStatus::Failed
        | JobStatus::Cancelled => WatchStep::Finish(IndicatorColor::Red),
    }
}
