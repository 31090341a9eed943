use botblocks_core::paths;
use botblocks_core::{
    ActionRunner, HttpTransport, Program, RainbowPanel, RobotConfig, RunLog, RunOutcome,
    Transport,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::AppError;

/// Start and end of the most recent run accepted by the server.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub actions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
}

/// Shared application state passed to all route handlers.
///
/// One program, one runner and one log per server. The rainbow panel shares
/// the runner's transport and log.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub program: Arc<tokio::sync::Mutex<Program>>,
    pub runner: Arc<ActionRunner>,
    pub panel: Arc<RainbowPanel>,
    pub log: RunLog,
    base_url: Arc<RwLock<String>>,
    last_run: Arc<Mutex<Option<RunRecord>>>,
}

impl AppState {
    /// State for the project at `root`, talking HTTP to the robot.
    pub fn new(root: PathBuf, config: &RobotConfig) -> botblocks_core::Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout())?);
        Self::with_transport(root, config, transport)
    }

    pub fn with_transport(
        root: PathBuf,
        config: &RobotConfig,
        transport: Arc<dyn Transport>,
    ) -> botblocks_core::Result<Self> {
        let program = Program::load_or_new(&paths::program_path(&root))?;
        let log = RunLog::new();
        let runner = ActionRunner::new(Arc::clone(&transport), log.clone())
            .with_gap(config.gap())
            .with_settle(config.settle());
        let panel = RainbowPanel::new(transport, log.clone());

        Ok(Self {
            root,
            program: Arc::new(tokio::sync::Mutex::new(program)),
            runner: Arc::new(runner),
            panel: Arc::new(panel),
            log,
            base_url: Arc::new(RwLock::new(config.trimmed_base_url().to_string())),
            last_run: Arc::new(Mutex::new(None)),
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_base_url(&self, url: &str) {
        *self.base_url.write().unwrap_or_else(|e| e.into_inner()) =
            botblocks_core::config::trim_base_url(url).to_string();
    }

    pub fn last_run(&self) -> Option<RunRecord> {
        self.last_run.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn begin_run(&self, actions: usize) {
        *self.last_run.lock().unwrap_or_else(|e| e.into_inner()) = Some(RunRecord {
            started_at: Utc::now(),
            finished_at: None,
            actions,
            outcome: None,
        });
    }

    pub(crate) fn finish_run(&self, outcome: RunOutcome) {
        let mut guard = self.last_run.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = guard.as_mut() {
            record.finished_at = Some(Utc::now());
            record.outcome = Some(outcome);
        }
    }

    /// Edits are refused while a run holds the program.
    pub(crate) fn ensure_idle(&self) -> Result<(), AppError> {
        if self.runner.is_running() {
            return Err(AppError::run_in_progress());
        }
        Ok(())
    }

    /// Write the program back to `.botblocks/program.yaml`.
    pub(crate) async fn persist(&self, program: &Program) -> Result<(), AppError> {
        let path = paths::program_path(&self.root);
        let program = program.clone();
        tokio::task::spawn_blocking(move || program.save(&path))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("save join error: {e}")))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_config_base_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RobotConfig {
            base_url: "http://10.0.0.7/".into(),
            ..RobotConfig::default()
        };
        let state = AppState::new(dir.path().to_path_buf(), &config).unwrap();
        assert_eq!(state.base_url(), "http://10.0.0.7");
        assert!(state.last_run().is_none());
    }

    #[test]
    fn set_base_url_trims_trailing_slash() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(dir.path().to_path_buf(), &RobotConfig::default()).unwrap();
        state.set_base_url(" http://robot.local// ");
        assert_eq!(state.base_url(), "http://robot.local");
    }

    #[test]
    fn finish_run_fills_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(dir.path().to_path_buf(), &RobotConfig::default()).unwrap();
        state.begin_run(2);
        state.finish_run(RunOutcome::Completed { actions: 2 });
        let record = state.last_run().unwrap();
        assert!(record.finished_at.is_some());
        assert_eq!(record.outcome, Some(RunOutcome::Completed { actions: 2 }));
    }
}
