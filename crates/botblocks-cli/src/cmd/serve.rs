use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, url: Option<&str>, port: u16) -> anyhow::Result<()> {
    let config = super::load_config(root, url)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(botblocks_server::serve(root.to_path_buf(), config, port))
        .with_context(|| format!("server on port {port} stopped"))
}
