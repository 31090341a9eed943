use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::{trim_base_url, RobotConfig};
use crate::error::Result;
use crate::request::Step;
use crate::runlog::RunLog;
use crate::transport::{HttpTransport, Transport};

// ─── Status / outcome ─────────────────────────────────────────────────────

/// What the runner is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    /// `step` is the 1-based position of the action being dispatched.
    Running { step: usize, total: usize },
    /// Last run stopped at `position` (1-based). A new run may start.
    Failed { position: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Empty,
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { actions: usize },
    Failed { position: usize, reason: String },
    Skipped { reason: SkipReason },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

// ─── ActionRunner ─────────────────────────────────────────────────────────

/// Dispatches a program to the robot one action at a time.
///
/// At most one run is active per runner. Each action becomes exactly one
/// request (or a local sleep for `wait`), followed by the fixed gap. The
/// first request that never completes aborts the rest of the run.
pub struct ActionRunner {
    transport: Arc<dyn Transport>,
    log: RunLog,
    gap: Duration,
    settle: Duration,
    running: AtomicBool,
    status: Mutex<RunStatus>,
}

impl ActionRunner {
    pub fn new(transport: Arc<dyn Transport>, log: RunLog) -> Self {
        Self {
            transport,
            log,
            gap: Duration::from_millis(crate::config::DEFAULT_GAP_MS),
            settle: Duration::from_millis(crate::config::DEFAULT_SETTLE_MS),
            running: AtomicBool::new(false),
            status: Mutex::new(RunStatus::Idle),
        }
    }

    /// Runner talking HTTP with the gap, settle delay and timeout from `config`.
    pub fn from_config(config: &RobotConfig, log: RunLog) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::new(Arc::new(transport), log)
            .with_gap(config.gap())
            .with_settle(config.settle()))
    }

    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn status(&self) -> RunStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claim the single-flight lock for a run of `actions`.
    ///
    /// An empty program is refused without touching any state. The returned
    /// ticket releases the lock when dropped, however the run ends.
    pub fn try_start(
        self: &Arc<Self>,
        actions: &[Action],
    ) -> std::result::Result<RunTicket, SkipReason> {
        if actions.is_empty() {
            return Err(SkipReason::Empty);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("run ignored: another run is in progress");
            return Err(SkipReason::AlreadyRunning);
        }
        self.set_status(RunStatus::Running {
            step: 0,
            total: actions.len(),
        });
        Ok(RunTicket {
            runner: Arc::clone(self),
        })
    }

    /// Run `actions` against `base_url` to completion or first failure.
    pub async fn run(self: &Arc<Self>, actions: &[Action], base_url: &str) -> RunOutcome {
        match self.try_start(actions) {
            Ok(ticket) => ticket.execute(actions, base_url).await,
            Err(reason) => RunOutcome::Skipped { reason },
        }
    }

    fn set_status(&self, status: RunStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }
}

// ─── RunTicket ────────────────────────────────────────────────────────────

/// Proof that the holder owns the runner's single-flight lock.
pub struct RunTicket {
    runner: Arc<ActionRunner>,
}

impl RunTicket {
    pub async fn execute(self, actions: &[Action], base_url: &str) -> RunOutcome {
        self.dispatch(actions, base_url).await
    }

    /// Like `execute`, but `finish` sees the outcome while the lock is still
    /// held, so no other run can start before the caller has recorded it.
    pub async fn execute_then<F>(
        self,
        actions: &[Action],
        base_url: &str,
        finish: F,
    ) -> RunOutcome
    where
        F: FnOnce(&RunOutcome),
    {
        let outcome = self.dispatch(actions, base_url).await;
        finish(&outcome);
        outcome
    }

    async fn dispatch(&self, actions: &[Action], base_url: &str) -> RunOutcome {
        let runner = &self.runner;
        let base = trim_base_url(base_url).to_string();
        let total = actions.len();
        info!(base = %base, total, "run started");

        for (i, action) in actions.iter().enumerate() {
            let position = i + 1;
            runner.set_status(RunStatus::Running {
                step: position,
                total,
            });

            let step = Step::for_block(&action.block);
            runner.log.append(step.trace_line(&base));
            debug!(position, id = action.id, kind = %action.kind(), "dispatching");

            match step {
                Step::Request(req) => match runner.transport.send(&base, &req).await {
                    Ok(reply) => runner.log.append(reply.log_line()),
                    Err(e) => {
                        let reason = e.to_string();
                        warn!(position, error = %reason, "run aborted");
                        runner.log.append(format!("error: {reason}"));
                        runner
                            .log
                            .append(format!("failed at action {position}: {reason}"));
                        runner.set_status(RunStatus::Failed {
                            position,
                            reason: reason.clone(),
                        });
                        return RunOutcome::Failed { position, reason };
                    }
                },
                Step::Sleep(d) => tokio::time::sleep(d).await,
            }

            tokio::time::sleep(runner.gap).await;
        }

        runner.log.append(format!("done: {total} action(s)"));
        info!(total, "run completed");
        tokio::time::sleep(runner.settle).await;
        runner.set_status(RunStatus::Idle);
        RunOutcome::Completed { actions: total }
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        // Cancelled or panicked runs must not leave the runner stuck.
        {
            let mut status = self
                .runner
                .status
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if matches!(*status, RunStatus::Running { .. }) {
                *status = RunStatus::Idle;
            }
        }
        self.runner.running.store(false, Ordering::Release);
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
