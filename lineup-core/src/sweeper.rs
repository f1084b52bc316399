use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LineupError, Result};
use crate::manager::{FinalizeOutcome, LineupManager};
use crate::types::{Lineup, LineupId};
use crate::window::{DueWindow, WindowPhase};

/// Tunables for the auto-lock sweep.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Delay between sweep cycles (default: 60s)
    pub interval: Duration,
    pub window: DueWindow,
    /// Also lock drafts whose window has already closed, e.g. after downtime
    pub catch_up: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            window: DueWindow::default(),
            catch_up: false,
        }
    }
}

/// A lineup the sweep could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub lineup_id: LineupId,
    pub error: String,
}

/// Tally of one sweep cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub examined: usize,
    pub locked: Vec<LineupId>,
    pub auto_filled: Vec<LineupId>,
    pub already_locked: usize,
    pub unscheduled: usize,
    pub not_due: usize,
    pub failures: Vec<SweepFailure>,
}

enum Disposition {
    Unscheduled,
    NotDue,
    Due,
}

pub struct AutoLockSweeper {
    manager: Arc<LineupManager>,
    config: SweeperConfig,
}

impl AutoLockSweeper {
    pub fn new(manager: Arc<LineupManager>, config: SweeperConfig) -> Self {
        Self { manager, config }
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Lock every draft whose due window contains `now`.
    ///
    /// Only a failure to list drafts fails the cycle. Problems with an
    /// individual lineup are logged, recorded in the report and skipped.
    pub fn sweep(&self, now: NaiveDateTime) -> Result<SweepReport> {
        let drafts = self.manager.drafts()?;
        let mut report = SweepReport {
            examined: drafts.len(),
            ..SweepReport::default()
        };

        for lineup in &drafts {
            match self.process(lineup, now) {
                Ok(Disposition::Unscheduled) => {
                    tracing::debug!(lineup_id = %lineup.id, match_id = lineup.match_id, "Fixture has no kickoff time, skipping");
                    report.unscheduled += 1;
                }
                Ok(Disposition::NotDue) => report.not_due += 1,
                Ok(Disposition::Due) => match self.manager.finalize_lineup(lineup, now) {
                    Ok(FinalizeOutcome::Locked { auto_filled }) => {
                        if auto_filled {
                            report.auto_filled.push(lineup.id.clone());
                        }
                        report.locked.push(lineup.id.clone());
                    }
                    Ok(FinalizeOutcome::AlreadyLocked) => report.already_locked += 1,
                    Err(e) => Self::record_failure(&mut report, lineup, e),
                },
                Err(e) => Self::record_failure(&mut report, lineup, e),
            }
        }

        if !report.locked.is_empty() || !report.failures.is_empty() {
            tracing::info!(
                examined = report.examined,
                locked = report.locked.len(),
                auto_filled = report.auto_filled.len(),
                failed = report.failures.len(),
                "Auto-lock sweep finished"
            );
        }

        Ok(report)
    }

    fn process(&self, lineup: &Lineup, now: NaiveDateTime) -> Result<Disposition> {
        let fixture = self
            .manager
            .directory()
            .fixture(lineup.match_id)
            .ok_or(LineupError::MatchNotFound(lineup.match_id))?;

        let Some(kickoff) = fixture.kickoff() else {
            return Ok(Disposition::Unscheduled);
        };

        let disposition = match self.config.window.phase(kickoff, now) {
            WindowPhase::Open => Disposition::Due,
            WindowPhase::Closed if self.config.catch_up => {
                tracing::warn!(
                    lineup_id = %lineup.id,
                    match_id = lineup.match_id,
                    %kickoff,
                    "Due window missed, locking on catch-up"
                );
                Disposition::Due
            }
            WindowPhase::Pending | WindowPhase::Closed => Disposition::NotDue,
        };
        Ok(disposition)
    }

    fn record_failure(report: &mut SweepReport, lineup: &Lineup, error: LineupError) {
        tracing::error!(
            lineup_id = %lineup.id,
            match_id = lineup.match_id,
            error = %error,
            "Failed to auto-lock lineup"
        );
        report.failures.push(SweepFailure {
            lineup_id: lineup.id.clone(),
            error: error.to_string(),
        });
    }
}
