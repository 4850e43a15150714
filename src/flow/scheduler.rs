//! Throttled triggering of flow passes.
//!
//! The scheduler is a plain state machine driven by the host's clock: the
//! host reports content-height changes and polls for due runs. It never
//! starts work itself.

use std::time::{Duration, Instant};

use log::debug;

/// Default throttle interval.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(200);

/// What the host should do after a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Run a pass now.
    RunNow,
    /// A pass is scheduled for the given instant.
    Scheduled(Instant),
    /// Folded into the pass already scheduled for the given instant.
    Coalesced(Instant),
    /// Height did not change; nothing to do.
    Unchanged,
}

/// Leading/trailing-edge throttle over content-height changes.
#[derive(Debug, Clone)]
pub struct FlowScheduler {
    interval: Duration,
    last_height: Option<i64>,
    last_run: Option<Instant>,
    pending: Option<Instant>,
}

impl Default for FlowScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}

impl FlowScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_height: None,
            last_run: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Report the current content height. Heights are compared after
    /// flooring to whole pixels.
    pub fn height_changed(&mut self, height: f64, now: Instant) -> Trigger {
        let floored = height.floor() as i64;
        if self.last_height == Some(floored) {
            return Trigger::Unchanged;
        }
        self.last_height = Some(floored);
        self.request(now)
    }

    /// Ask for a pass regardless of height, e.g. after a pass split a block.
    pub fn request_rerun(&mut self, now: Instant) -> Trigger {
        self.request(now)
    }

    fn request(&mut self, now: Instant) -> Trigger {
        if let Some(due) = self.pending {
            debug!("flow request coalesced into pending run");
            return Trigger::Coalesced(due);
        }

        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                let due = last + self.interval;
                self.pending = Some(due);
                Trigger::Scheduled(due)
            }
            _ => {
                self.last_run = Some(now);
                Trigger::RunNow
            }
        }
    }

    /// Whether the pending pass is due at `now`. Returns true at most once
    /// per scheduled pass; the caller must run it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(due) if due <= now => {
                self.pending = None;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    /// When the pending pass is due, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
