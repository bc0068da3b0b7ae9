//! Work timer state machine.
//!
//! ```text
//! idle --start--> running --pause--> paused --resume--> running
//!  ^                 |                  |
//!  +------stop-------+-------stop-------+
//! ```
//!
//! The machine only counts: it never reads a clock on its own, and it never
//! talks to storage. [`crate::Tracker`] feeds it timestamps and persists the
//! [`FinishedRun`] returned by [`TimerState::stop`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CustomerId, SessionId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the session being timed. Fixed from start until stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRun {
    pub customer_id: CustomerId,
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
}

/// What a stopped timer hands over for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRun {
    pub customer_id: CustomerId,
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub elapsed_seconds: u64,
}

/// Process-local timer state.
///
/// `run` is `Some` exactly when `status` is not [`TimerStatus::Idle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    status: TimerStatus,
    run: Option<ActiveRun>,
    elapsed_seconds: u64,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> TimerStatus {
        self.status
    }

    pub const fn is_idle(&self) -> bool {
        matches!(self.status, TimerStatus::Idle)
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.status, TimerStatus::Running)
    }

    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub const fn run(&self) -> Option<&ActiveRun> {
        self.run.as_ref()
    }

    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.run.as_ref().map(|run| &run.customer_id)
    }

    /// Starts timing a new session for `customer_id`.
    ///
    /// Ignored (returns `false`) unless the timer is idle, so a second start
    /// can never open a concurrent session.
    pub fn start(&mut self, customer_id: CustomerId, now: DateTime<Utc>) -> bool {
        if !self.is_idle() {
            debug!(status = %self.status, "start ignored, timer already active");
            return false;
        }

        let session_id = SessionId::generate();
        debug!(%customer_id, %session_id, "timer started");
        *self = Self {
            status: TimerStatus::Running,
            run: Some(ActiveRun {
                customer_id,
                session_id,
                start_time: now,
            }),
            elapsed_seconds: 0,
        };
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = TimerStatus::Paused;
        debug!(elapsed = self.elapsed_seconds, "timer paused");
        true
    }

    /// Resumes a paused timer. The start time is left alone.
    pub fn resume(&mut self) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.status = TimerStatus::Running;
        debug!(elapsed = self.elapsed_seconds, "timer resumed");
        true
    }

    /// Counts one second. No-op unless running.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        true
    }

    /// Returns to idle, handing back the finished run.
    ///
    /// `None` when already idle; nothing changes in that case.
    pub fn stop(&mut self) -> Option<FinishedRun> {
        let run = self.run.take()?;
        let finished = FinishedRun {
            customer_id: run.customer_id,
            session_id: run.session_id,
            start_time: run.start_time,
            elapsed_seconds: self.elapsed_seconds,
        };
        *self = Self::default();
        debug!(
            session_id = %finished.session_id,
            elapsed = finished.elapsed_seconds,
            "timer stopped"
        );
        Some(finished)
    }
}
