//! Background task that runs the auto-lock sweep on a fixed period.
//!
//! Uses `tokio::time::interval` for the cadence and a `Notify` for shutdown.
//! A stop request is only observed between cycles, so no lineup is ever left
//! half-finalized. Each cycle runs on the blocking pool because store calls
//! are synchronous.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use lineup_core::sweeper::AutoLockSweeper;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of "now" for sweep cycles.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

#[derive(Debug, thiserror::Error)]
pub enum SweeperTaskError {
    /// Attempted to start the task when it's already running
    #[error("Sweeper already running - call stop() first")]
    AlreadyRunning,

    /// Attempted to stop the task when it's not running
    #[error("Sweeper not running - call start() first")]
    NotRunning,

    /// Shutdown did not complete within the timeout
    #[error("Shutdown timeout after {0}ms - sweep cycle may be stuck")]
    ShutdownTimeout(u64),
}

pub struct SweeperTask {
    sweeper: Arc<AutoLockSweeper>,
    clock: Clock,
    shutdown: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl SweeperTask {
    pub fn new(sweeper: Arc<AutoLockSweeper>, clock: Clock) -> Self {
        Self {
            sweeper,
            clock,
            shutdown: Arc::new(Notify::new()),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the periodic loop. The first cycle runs immediately.
    pub fn start(&mut self) -> Result<(), SweeperTaskError> {
        if self.is_running() {
            return Err(SweeperTaskError::AlreadyRunning);
        }

        self.shutdown = Arc::new(Notify::new());
        let sweeper = Arc::clone(&self.sweeper);
        let clock = Arc::clone(&self.clock);
        let shutdown = Arc::clone(&self.shutdown);
        let period = sweeper.config().interval;

        self.handle = Some(tokio::spawn(async move {
            sweep_loop(sweeper, clock, shutdown, period).await;
        }));

        tracing::info!(interval_secs = period.as_secs(), "Auto-lock sweeper started");
        Ok(())
    }

    /// Signal the loop to stop and wait for the current cycle to finish.
    pub async fn stop(&mut self) -> Result<(), SweeperTaskError> {
        let handle = self.handle.take().ok_or(SweeperTaskError::NotRunning)?;

        // notify_one stores a permit, so a loop busy in a cycle still sees it.
        self.shutdown.notify_one();

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => {
                tracing::info!("Auto-lock sweeper stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Auto-lock sweeper task panicked");
                Ok(())
            }
            Err(_) => Err(SweeperTaskError::ShutdownTimeout(STOP_TIMEOUT.as_millis() as u64)),
        }
    }
}

async fn sweep_loop(
    sweeper: Arc<AutoLockSweeper>,
    clock: Clock,
    shutdown: Arc<Notify>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            _ = interval.tick() => {
                let sweeper = Arc::clone(&sweeper);
                let now = clock();
                match tokio::task::spawn_blocking(move || sweeper.sweep(now)).await {
                    Ok(Ok(report)) => {
                        tracing::debug!(
                            examined = report.examined,
                            locked = report.locked.len(),
                            "Sweep cycle complete"
                        );
                    }
                    // The next tick retries; a single bad cycle is not fatal.
                    Ok(Err(e)) => tracing::error!(error = %e, "Sweep cycle failed"),
                    Err(e) => tracing::error!(error = %e, "Sweep cycle panicked"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use lineup_core::directory_in_memory::InMemoryDirectory;
    use lineup_core::manager::LineupManager;
    use lineup_core::sweeper::SweeperConfig;
    use lineup_core::types::{Coach, Fixture, LineupStatus, Player};

    fn kickoff() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|d| d.and_hms_opt(15, 0, 0))
            .unwrap()
    }

    fn sweeper() -> (Arc<LineupManager>, Arc<AutoLockSweeper>) {
        let directory = InMemoryDirectory::new();
        directory.upsert_coach(Coach { id: 1, team_id: Some(10) });
        directory.upsert_fixture(Fixture {
            id: 100,
            date: kickoff().date(),
            time: Some(kickoff().time()),
            home_team_id: 10,
            away_team_id: 20,
        });
        for id in 1..=12 {
            directory.upsert_player(Player::new(id, 10, format!("Player {}", id)));
        }

        let manager = Arc::new(LineupManager::in_memory(Arc::new(directory)));
        let config = SweeperConfig {
            interval: Duration::from_millis(10),
            ..SweeperConfig::default()
        };
        let sweeper = Arc::new(AutoLockSweeper::new(manager.clone(), config));
        (manager, sweeper)
    }

    #[tokio::test]
    async fn test_task_locks_due_lineup_and_stops() {
        let (manager, sweeper) = sweeper();
        manager.submit_lineup(1, 100, vec![], None).unwrap();

        let clock: Clock = Arc::new(kickoff);
        let mut task = SweeperTask::new(sweeper, clock);
        task.start().unwrap();
        assert!(task.is_running());
        assert!(matches!(task.start(), Err(SweeperTaskError::AlreadyRunning)));

        let mut locked = false;
        for _ in 0..100 {
            if manager.get_lineup(1, 100).unwrap().status == LineupStatus::Locked {
                locked = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(locked, "sweeper never locked the due lineup");

        task.stop().await.unwrap();
        assert!(!task.is_running());
        assert!(matches!(task.stop().await, Err(SweeperTaskError::NotRunning)));
    }

    #[tokio::test]
    async fn test_task_can_restart_after_stop() {
        let (_manager, sweeper) = sweeper();
        let mut task = SweeperTask::new(sweeper, local_clock());

        task.start().unwrap();
        task.stop().await.unwrap();
        task.start().unwrap();
        task.stop().await.unwrap();
    }
}
