use anyhow::{bail, Context};
use botblocks_core::{ActionRunner, RunLog, RunOutcome, SkipReason};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::output::print_json;

pub fn run(
    root: &Path,
    program: Option<&Path>,
    url: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root, url)?;
    let path = super::program_file(root, program);
    let program = super::load_program(&path)?;
    let actions = program.snapshot();
    let base_url = config.trimmed_base_url().to_string();

    let rt = tokio::runtime::Runtime::new()?;
    let (outcome, lines) = rt.block_on(async move {
        let log = RunLog::new();
        let runner = Arc::new(
            ActionRunner::from_config(&config, log.clone())
                .context("failed to set up the HTTP client")?,
        );

        // Stream lines while the run is in flight; the printer ends once every
        // handle on the log is gone.
        let printer = (!json).then(|| {
            let mut rx = log.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(line) => println!("{line}"),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        });

        let outcome = runner.run(&actions, &base_url).await;
        let lines = log.lines();
        drop(runner);
        drop(log);
        if let Some(printer) = printer {
            printer.await?;
        }
        Ok::<_, anyhow::Error>((outcome, lines))
    })?;

    if json {
        print_json(&serde_json::json!({ "outcome": outcome, "log": lines }))?;
    }

    match outcome {
        RunOutcome::Completed { .. } => Ok(()),
        RunOutcome::Skipped {
            reason: SkipReason::Empty,
        } => {
            if !json {
                println!("Program is empty; nothing to run.");
            }
            Ok(())
        }
        RunOutcome::Skipped {
            reason: SkipReason::AlreadyRunning,
        } => bail!("a run is already in progress"),
        RunOutcome::Failed { position, reason } => {
            bail!("run failed at action {position}: {reason}")
        }
    }
}
