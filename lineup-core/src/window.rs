use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Where `now` sits relative to a lineup's due window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPhase {
    /// Window has not opened yet
    Pending,
    /// Inside the window; the lineup is due for locking
    Open,
    /// Window has fully passed
    Closed,
}

/// The interval around kickoff in which a draft lineup is locked:
/// `[kickoff - lead, kickoff + grace]`, both ends inclusive.
///
/// A bound that falls outside the representable calendar is treated as
/// unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    lead: Duration,
    grace: Duration,
}

impl Default for DueWindow {
    fn default() -> Self {
        Self {
            lead: Duration::minutes(1),
            grace: Duration::minutes(30),
        }
    }
}

impl DueWindow {
    /// Negative durations are clamped to zero.
    pub fn new(lead: Duration, grace: Duration) -> Self {
        Self {
            lead: lead.max(Duration::zero()),
            grace: grace.max(Duration::zero()),
        }
    }

    pub fn lead(&self) -> Duration {
        self.lead
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// `None` when the opening lies before the earliest representable time.
    pub fn opens_at(&self, kickoff: NaiveDateTime) -> Option<NaiveDateTime> {
        kickoff.checked_sub_signed(self.lead)
    }

    /// `None` when the close lies past the latest representable time.
    pub fn closes_at(&self, kickoff: NaiveDateTime) -> Option<NaiveDateTime> {
        kickoff.checked_add_signed(self.grace)
    }

    pub fn phase(&self, kickoff: NaiveDateTime, now: NaiveDateTime) -> WindowPhase {
        if self.opens_at(kickoff).is_some_and(|opens| now < opens) {
            WindowPhase::Pending
        } else if self.closes_at(kickoff).is_some_and(|closes| now > closes) {
            WindowPhase::Closed
        } else {
            WindowPhase::Open
        }
    }

    pub fn is_due(&self, kickoff: NaiveDateTime, now: NaiveDateTime) -> bool {
        self.phase(kickoff, now) == WindowPhase::Open
    }
}
