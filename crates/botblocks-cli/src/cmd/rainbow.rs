use anyhow::{bail, Context};
use botblocks_core::{HttpTransport, PanelStatus, RainbowPanel, RainbowSettings, RunLog};
use clap::Subcommand;
use std::path::Path;
use std::sync::Arc;

use crate::output::print_json;

#[derive(Subcommand, Debug)]
pub enum RainbowSubcommand {
    /// Start the rainbow animation
    Start {
        /// Milliseconds between frames (5-1000)
        #[arg(long, default_value_t = 40.0)]
        interval: f64,
        /// Saturation (0-255)
        #[arg(long, default_value_t = 255.0)]
        sat: f64,
        /// Brightness (0-255)
        #[arg(long, default_value_t = 160.0)]
        val: f64,
    },
    /// Stop the rainbow animation
    Stop,
}

pub fn run(
    root: &Path,
    subcmd: RainbowSubcommand,
    url: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root, url)?;
    let base_url = config.trimmed_base_url().to_string();
    let log = RunLog::new();
    let transport =
        HttpTransport::new(config.timeout()).context("failed to set up the HTTP client")?;
    let panel = RainbowPanel::new(Arc::new(transport), log.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let status = rt.block_on(async {
        match subcmd {
            RainbowSubcommand::Start { interval, sat, val } => {
                let settings = RainbowSettings {
                    interval: Some(interval.into()),
                    sat: Some(sat.into()),
                    val: Some(val.into()),
                };
                panel.start(&base_url, &settings).await
            }
            RainbowSubcommand::Stop => panel.stop(&base_url).await,
        }
    });

    if json {
        print_json(&serde_json::json!({ "status": status, "log": log.lines() }))?;
    } else {
        for line in log.lines() {
            println!("{line}");
        }
    }

    match status {
        PanelStatus::Ok => Ok(()),
        PanelStatus::HttpError { code } => bail!("robot answered with HTTP {code}"),
        PanelStatus::Unreachable { message } => bail!("robot unreachable: {message}"),
    }
}
