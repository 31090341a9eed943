use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use botblocks_core::{Action, Block, BlockKind, Program};
use clap::Subcommand;
use serde_json::{Map, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ProgramSubcommand {
    /// List the actions in run order
    Show,
    /// Append a block; `key=value` pairs override its defaults
    Add {
        /// Block type (move, beep, note, mary, rgb, lcd, wait, rainbow-start, rainbow-stop)
        kind: String,
        fields: Vec<String>,
    },
    /// Change fields of an action; `key=null` clears an optional field
    Set {
        id: u64,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Move an action one place earlier
    Up { id: u64 },
    /// Move an action one place later
    Down { id: u64 },
    /// Delete an action
    Remove { id: u64 },
    /// Delete every action
    Clear,
    /// List the available block types and their fields
    Kinds,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    file: Option<&Path>,
    subcmd: ProgramSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let path = super::program_file(root, file);
    match subcmd {
        ProgramSubcommand::Show => show(&path, json),
        ProgramSubcommand::Add { kind, fields } => add(&path, &kind, &fields, json),
        ProgramSubcommand::Set { id, fields } => set(&path, id, &fields, json),
        ProgramSubcommand::Up { id } => reorder(&path, id, Direction::Up, json),
        ProgramSubcommand::Down { id } => reorder(&path, id, Direction::Down, json),
        ProgramSubcommand::Remove { id } => remove(&path, id, json),
        ProgramSubcommand::Clear => clear(&path, json),
        ProgramSubcommand::Kinds => kinds(json),
    }
}

fn load(path: &Path) -> anyhow::Result<Program> {
    Program::load_or_new(path).with_context(|| format!("failed to read {}", path.display()))
}

fn save(path: &Path, program: &Program) -> anyhow::Result<()> {
    program
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

// ---------------------------------------------------------------------------
// show / kinds
// ---------------------------------------------------------------------------

fn show(path: &Path, json: bool) -> anyhow::Result<()> {
    let program = load(path)?;
    if json {
        return print_json(&program.actions());
    }
    if program.is_empty() {
        println!("Program is empty.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = program
        .actions()
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.id.to_string(),
                a.kind().to_string(),
                a.block.summary(),
            ]
        })
        .collect();
    print_table(&["#", "ID", "TYPE", "SUMMARY"], &rows);
    Ok(())
}

fn kinds(json: bool) -> anyhow::Result<()> {
    if json {
        let list: Vec<Value> = BlockKind::all()
            .iter()
            .map(|k| {
                serde_json::json!({
                    "type": k.as_str(),
                    "label": k.label(),
                    "fields": k.fields(),
                })
            })
            .collect();
        return print_json(&list);
    }
    let rows: Vec<Vec<String>> = BlockKind::all()
        .iter()
        .map(|k| {
            vec![
                k.as_str().to_string(),
                k.label().to_string(),
                k.fields().join(", "),
            ]
        })
        .collect();
    print_table(&["TYPE", "LABEL", "FIELDS"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// add / set
// ---------------------------------------------------------------------------

fn add(path: &Path, kind: &str, fields: &[String], json: bool) -> anyhow::Result<()> {
    let kind: BlockKind = kind.parse()?;
    let mut draft = Action::new(0, Block::with_defaults(kind));
    draft.apply_patch(&parse_fields(fields)?)?;

    let mut program = load(path)?;
    let id = program.push(draft.block);
    save(path, &program)?;

    let action = program.get(id)?;
    if json {
        print_json(action)?;
    } else {
        println!("Added {id}: {}", action.block.summary());
    }
    Ok(())
}

fn set(path: &Path, id: u64, fields: &[String], json: bool) -> anyhow::Result<()> {
    let patch = parse_fields(fields)?;
    let mut program = load(path)?;
    let action = program.patch(id, &patch)?.clone();
    save(path, &program)?;

    if json {
        print_json(&action)?;
    } else {
        println!("Updated {id}: {}", action.block.summary());
    }
    Ok(())
}

/// Fields whose values are always text, even when they look like numbers.
const TEXT_FIELDS: &[&str] = &["direction", "name", "hex", "msg", "align"];

/// Turn `key=value` arguments into a patch object.
///
/// Numeric fields take JSON scalars (`1.5`, `null`); anything that does not
/// parse is passed through as text and coerced when the action runs.
fn parse_fields(args: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut map = Map::new();
    for arg in args {
        let Some((key, raw)) = arg.split_once('=') else {
            bail!("expected key=value, got '{arg}'");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("missing field name in '{arg}'");
        }
        let value = if raw == "null" {
            Value::Null
        } else if TEXT_FIELDS.contains(&key) {
            Value::String(raw.to_string())
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(v @ Value::Number(_)) => v,
                _ => Value::String(raw.to_string()),
            }
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// up / down / remove / clear
// ---------------------------------------------------------------------------

enum Direction {
    Up,
    Down,
}

fn reorder(path: &Path, id: u64, direction: Direction, json: bool) -> anyhow::Result<()> {
    let mut program = load(path)?;
    let moved = match direction {
        Direction::Up => program.move_up(id)?,
        Direction::Down => program.move_down(id)?,
    };
    if moved {
        save(path, &program)?;
    }

    if json {
        print_json(&serde_json::json!({ "id": id, "moved": moved }))?;
    } else if moved {
        println!("Moved {id}.");
    } else {
        let edge = match direction {
            Direction::Up => "top",
            Direction::Down => "bottom",
        };
        println!("{id} is already at the {edge}.");
    }
    Ok(())
}

fn remove(path: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let mut program = load(path)?;
    let removed = program.remove(id)?;
    save(path, &program)?;

    if json {
        print_json(&removed)?;
    } else {
        println!("Removed {id}: {}", removed.block.summary());
    }
    Ok(())
}

fn clear(path: &Path, json: bool) -> anyhow::Result<()> {
    let mut program = load(path)?;
    let removed = program.len();
    program.clear();
    save(path, &program)?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else {
        println!("Removed {removed} action(s).");
    }
    Ok(())
}
