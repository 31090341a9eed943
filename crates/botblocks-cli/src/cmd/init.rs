use anyhow::Context;
use botblocks_core::{config, paths, Program, RobotConfig};
use std::path::Path;

pub fn run(root: &Path, url: Option<&str>) -> anyhow::Result<()> {
    println!("Initializing botblocks in: {}", root.display());

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        let mut cfg = RobotConfig::default();
        if let Some(url) = url {
            config::parse_base_url(url)?;
            cfg.base_url = config::trim_base_url(url).to_string();
        }
        cfg.save(root)
            .with_context(|| format!("failed to write {}", paths::CONFIG_FILE))?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let program_path = paths::program_path(root);
    if program_path.exists() {
        println!("  exists:  {}", paths::PROGRAM_FILE);
    } else {
        Program::new()
            .save(&program_path)
            .with_context(|| format!("failed to write {}", paths::PROGRAM_FILE))?;
        println!("  created: {}", paths::PROGRAM_FILE);
    }

    Ok(())
}
