//! Direct control of the LED ring's rainbow effect, outside any program.
//!
//! Unlike a program run, nothing here aborts: an HTTP error status and an
//! unreachable robot are both just logged and reported back.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::action::{DEFAULT_RAINBOW_INTERVAL, DEFAULT_RAINBOW_SAT, DEFAULT_RAINBOW_VAL};
use crate::request::{rainbow_start, rainbow_stop, RobotRequest};
use crate::runlog::RunLog;
use crate::scalar::Scalar;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainbowSettings {
    /// Milliseconds between animation frames.
    #[serde(default)]
    pub interval: Option<Scalar>,
    #[serde(default)]
    pub sat: Option<Scalar>,
    #[serde(default)]
    pub val: Option<Scalar>,
}

impl Default for RainbowSettings {
    fn default() -> Self {
        Self {
            interval: Some(DEFAULT_RAINBOW_INTERVAL.into()),
            sat: Some(DEFAULT_RAINBOW_SAT.into()),
            val: Some(DEFAULT_RAINBOW_VAL.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelStatus {
    Ok,
    HttpError { code: u16 },
    Unreachable { message: String },
}

pub struct RainbowPanel {
    transport: Arc<dyn Transport>,
    log: RunLog,
}

impl RainbowPanel {
    pub fn new(transport: Arc<dyn Transport>, log: RunLog) -> Self {
        Self { transport, log }
    }

    pub async fn start(&self, base_url: &str, settings: &RainbowSettings) -> PanelStatus {
        let req = rainbow_start(
            settings.interval.as_ref(),
            settings.sat.as_ref(),
            settings.val.as_ref(),
        );
        self.send(base_url, &req).await
    }

    pub async fn stop(&self, base_url: &str) -> PanelStatus {
        self.send(base_url, &rainbow_stop()).await
    }

    async fn send(&self, base_url: &str, req: &RobotRequest) -> PanelStatus {
        self.log.append(req.trace_line(base_url));
        match self.transport.send(base_url, req).await {
            Ok(reply) => {
                self.log.append(reply.log_line());
                if reply.is_ok() {
                    PanelStatus::Ok
                } else {
                    PanelStatus::HttpError { code: reply.status }
                }
            }
            Err(e) => {
                warn!(path = req.path, error = %e, "rainbow request failed");
                self.log.append(format!("error: {e}"));
                PanelStatus::Unreachable {
                    message: e.to_string(),
                }
            }
        }
    }
}
