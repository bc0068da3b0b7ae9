//! Idle detection: stop a timer that has been left running too long.

use crate::settings::AppSettings;
use crate::timer::TimerStatus;

/// Decides when a running timer has hit the configured idle cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleMonitor {
    timeout_minutes: Option<u32>,
}

impl IdleMonitor {
    /// A monitor that never fires.
    pub const fn disabled() -> Self {
        Self {
            timeout_minutes: None,
        }
    }

    pub const fn with_timeout_minutes(minutes: u32) -> Self {
        Self {
            timeout_minutes: Some(minutes),
        }
    }

    pub const fn from_settings(settings: &AppSettings) -> Self {
        if settings.idle_detection {
            Self::with_timeout_minutes(settings.idle_timeout_minutes)
        } else {
            Self::disabled()
        }
    }

    /// Cutoff in seconds of running time, when enabled.
    pub fn threshold_seconds(&self) -> Option<u64> {
        self.timeout_minutes.map(|minutes| u64::from(minutes) * 60)
    }

    /// Whether a timer in `status` with `elapsed_seconds` must be stopped.
    ///
    /// Must be called with the counter value after the tick was applied.
    pub fn should_stop(&self, status: TimerStatus, elapsed_seconds: u64) -> bool {
        status == TimerStatus::Running
            && self
                .threshold_seconds()
                .is_some_and(|threshold| elapsed_seconds >= threshold)
    }

    /// The advisory shown after an idle stop, if the monitor is enabled.
    pub fn stop_message(&self) -> Option<String> {
        self.timeout_minutes.map(idle_stop_message)
    }
}

/// Builds the notice shown after an idle stop.
///
/// Hours are shown with one decimal; exact halves (15, 45, 75 minutes) round
/// up. The unit is singular only for exactly "1.0".
pub fn idle_stop_message(timeout_minutes: u32) -> String {
    let hours = f64::from(timeout_minutes) / 60.0;
    let hours = if timeout_minutes % 30 == 15 {
        format!("{:.1}", hours + 0.05)
    } else {
        format!("{hours:.1}")
    };
    let unit = if hours == "1.0" { "hour" } else { "hours" };
    format!("Timer stopped: Idle detection triggered after {hours} {unit}")
}
