use std::path::Path;

use crate::output::print_json;

pub fn run(root: &Path, program: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let path = super::program_file(root, program);
    let program = super::load_program(&path)?;
    let script = botblocks_core::script::compile(program.actions());
    if json {
        print_json(&serde_json::json!({ "script": script }))
    } else {
        print!("{script}");
        Ok(())
    }
}
