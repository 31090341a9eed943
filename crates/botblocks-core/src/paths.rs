use std::path::{Path, PathBuf};

pub const BOTBLOCKS_DIR: &str = ".botblocks";
pub const CONFIG_FILE: &str = ".botblocks/config.yaml";
pub const PROGRAM_FILE: &str = ".botblocks/program.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// The program edited by `botblocks program ...` unless another file is named.
pub fn program_path(root: &Path) -> PathBuf {
    root.join(PROGRAM_FILE)
}
