use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BotError;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Written as `forward`/`backward`; read through `FromStr`, so the motor
/// codes and any letter case are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }

    /// Motor command sent for both wheels.
    pub fn motor_code(self) -> &'static str {
        match self {
            Direction::Forward => "fwd",
            Direction::Backward => "back",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(Direction::Forward),
            "backward" | "back" => Ok(Direction::Backward),
            _ => Err(BotError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = BotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// BlockKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Move,
    Beep,
    Note,
    Mary,
    Rgb,
    Lcd,
    Wait,
    RainbowStart,
    RainbowStop,
}

impl BlockKind {
    pub fn all() -> &'static [BlockKind] {
        &[
            BlockKind::Move,
            BlockKind::Beep,
            BlockKind::Note,
            BlockKind::Mary,
            BlockKind::Rgb,
            BlockKind::Lcd,
            BlockKind::Wait,
            BlockKind::RainbowStart,
            BlockKind::RainbowStop,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Move => "move",
            BlockKind::Beep => "beep",
            BlockKind::Note => "note",
            BlockKind::Mary => "mary",
            BlockKind::Rgb => "rgb",
            BlockKind::Lcd => "lcd",
            BlockKind::Wait => "wait",
            BlockKind::RainbowStart => "rainbowStart",
            BlockKind::RainbowStop => "rainbowStop",
        }
    }

    /// Field names a block of this kind accepts in a patch.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            BlockKind::Move => &["direction", "seconds"],
            BlockKind::Note => &["name", "beats"],
            BlockKind::Rgb => &["hex", "r", "g", "b"],
            BlockKind::Lcd => &["msg", "row", "align", "hex", "r", "g", "b"],
            BlockKind::Wait => &["seconds"],
            BlockKind::RainbowStart => &["interval", "sat", "val"],
            BlockKind::Beep | BlockKind::Mary | BlockKind::RainbowStop => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Move => "Move",
            BlockKind::Beep => "Beep",
            BlockKind::Note => "Play note",
            BlockKind::Mary => "Mary had a little lamb",
            BlockKind::Rgb => "Set RGB",
            BlockKind::Lcd => "Display text",
            BlockKind::Wait => "Wait",
            BlockKind::RainbowStart => "Start rainbow",
            BlockKind::RainbowStop => "Stop rainbow",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both the wire tag and a dashed spelling for the CLI.
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        BlockKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| BotError::UnknownKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
