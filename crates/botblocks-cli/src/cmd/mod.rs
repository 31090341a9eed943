pub mod init;
pub mod program;
pub mod rainbow;
pub mod run;
pub mod script;
pub mod serve;

use anyhow::{bail, Context};
use botblocks_core::config::WarnLevel;
use botblocks_core::{paths, Program, RobotConfig};
use std::path::{Path, PathBuf};

/// Project config with `--url` / `BOTBLOCKS_URL` applied on top.
///
/// Error-level problems (an unusable robot URL) stop the command; the rest
/// are logged.
pub fn load_config(root: &Path, url: Option<&str>) -> anyhow::Result<RobotConfig> {
    let mut config = RobotConfig::load_or_default(root)
        .with_context(|| format!("failed to read {}", paths::CONFIG_FILE))?;
    if let Some(url) = url {
        config.base_url = url.to_string();
    }
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => bail!("{}", warning.message),
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
        }
    }
    Ok(config)
}

pub fn program_file(root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => paths::program_path(root),
    }
}

/// Load a program that must already exist.
pub fn load_program(path: &Path) -> anyhow::Result<Program> {
    if !path.exists() {
        bail!(
            "no program at {} (run `botblocks init` or pass --program)",
            path.display()
        );
    }
    Program::load(path).with_context(|| format!("failed to read {}", path.display()))
}
