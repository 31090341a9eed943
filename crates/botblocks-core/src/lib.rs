//! `botblocks-core`: the robot action model and the sequential runner.
//!
//! ```text
//! Program (ordered Vec<Action>)
//!     │  snapshot()
//!     ▼
//! ActionRunner  ← single-flight; one Step per action, then the gap
//!     │
//!     ▼
//! Step::Request → Transport (reqwest) → robot HTTP API
//! Step::Sleep   → local delay
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod io;
pub mod paths;
pub mod program;
pub mod rainbow;
pub mod request;
pub mod runlog;
pub mod runner;
pub mod scalar;
pub mod script;
pub mod transport;
pub mod types;

pub use action::{Action, Block};
pub use config::RobotConfig;
pub use error::{BotError, Result};
pub use program::Program;
pub use rainbow::{PanelStatus, RainbowPanel, RainbowSettings};
pub use runlog::RunLog;
pub use runner::{ActionRunner, RunOutcome, RunStatus, SkipReason};
pub use scalar::Scalar;
pub use transport::{HttpTransport, Reply, Transport};
pub use types::{BlockKind, Direction};
