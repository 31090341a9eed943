use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::action::{Action, Block};
use crate::error::{BotError, Result};
use crate::types::BlockKind;

/// An ordered list of actions. Insertion order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Next id to hand out. Ids are never reused, even after `clear`.
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    actions: Vec<Action>,
}

fn first_id() -> u64 {
    1
}

impl Program {
    pub fn new() -> Self {
        Self {
            next_id: first_id(),
            actions: Vec::new(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, id: u64) -> Result<&Action> {
        self.actions
            .iter()
            .find(|a| a.id == id)
            .ok_or(BotError::ActionNotFound(id))
    }

    /// Append a block of `kind` with its palette defaults.
    pub fn add(&mut self, kind: BlockKind) -> u64 {
        self.push(Block::with_defaults(kind))
    }

    pub fn push(&mut self, block: Block) -> u64 {
        // Loaded files may carry ids past a stale counter.
        let max_seen = self.actions.iter().map(|a| a.id).max().unwrap_or(0);
        let id = self.next_id.max(max_seen + 1);
        self.next_id = id + 1;
        self.actions.push(Action::new(id, block));
        id
    }

    pub fn patch(
        &mut self,
        id: u64,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<&Action> {
        let idx = self.position(id)?;
        self.actions[idx].apply_patch(fields)?;
        Ok(&self.actions[idx])
    }

    /// Swap with the previous action. Returns false at the top.
    pub fn move_up(&mut self, id: u64) -> Result<bool> {
        let idx = self.position(id)?;
        if idx == 0 {
            return Ok(false);
        }
        self.actions.swap(idx - 1, idx);
        Ok(true)
    }

    /// Swap with the next action. Returns false at the bottom.
    pub fn move_down(&mut self, id: u64) -> Result<bool> {
        let idx = self.position(id)?;
        if idx + 1 >= self.actions.len() {
            return Ok(false);
        }
        self.actions.swap(idx, idx + 1);
        Ok(true)
    }

    pub fn remove(&mut self, id: u64) -> Result<Action> {
        let idx = self.position(id)?;
        Ok(self.actions.remove(idx))
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Owned copy of the current sequence, taken when a run starts.
    pub fn snapshot(&self) -> Vec<Action> {
        self.actions.clone()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let program: Program = serde_yaml::from_str(&data)?;
        Ok(program)
    }

    /// Load `path`, or start an empty program if it does not exist yet.
    pub fn load_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.actions
            .iter()
            .position(|a| a.id == id)
            .ok_or(BotError::ActionNotFound(id))
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Block> for Program {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut program = Program::new();
        for block in iter {
            program.push(block);
        }
        program
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
