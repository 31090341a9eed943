use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::scalar::{lenient_opt_text, lenient_text, Scalar};
use crate::types::{BlockKind, Direction};

// ---------------------------------------------------------------------------
// Nominal defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_MOVE_SECONDS: f64 = 0.8;
pub const DEFAULT_WAIT_SECONDS: f64 = 1.0;
pub const DEFAULT_NOTE_NAME: &str = "C4";
pub const DEFAULT_NOTE_BEATS: f64 = 1.0;
pub const MIN_NOTE_BEATS: f64 = 0.1;
pub const DEFAULT_RGB_HEX: &str = "#ff0000";
pub const DEFAULT_LCD_MSG: &str = "Hello!";
pub const DEFAULT_LCD_ALIGN: &str = "left";
pub const DEFAULT_RAINBOW_INTERVAL: f64 = 40.0;
pub const DEFAULT_RAINBOW_SAT: f64 = 255.0;
pub const DEFAULT_RAINBOW_VAL: f64 = 160.0;

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One robot command with its raw, uncoerced parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Move {
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<Scalar>,
    },
    Beep,
    Note {
        #[serde(default = "default_note_name", deserialize_with = "lenient_text")]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        beats: Option<Scalar>,
    },
    Mary,
    Rgb {
        #[serde(
            default,
            deserialize_with = "lenient_opt_text",
            skip_serializing_if = "Option::is_none"
        )]
        hex: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        r: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        g: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        b: Option<Scalar>,
    },
    Lcd {
        #[serde(default, deserialize_with = "lenient_text")]
        msg: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row: Option<Scalar>,
        #[serde(default = "default_lcd_align", deserialize_with = "lenient_text")]
        align: String,
        #[serde(
            default,
            deserialize_with = "lenient_opt_text",
            skip_serializing_if = "Option::is_none"
        )]
        hex: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        r: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        g: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        b: Option<Scalar>,
    },
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<Scalar>,
    },
    RainbowStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sat: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        val: Option<Scalar>,
    },
    RainbowStop,
}

fn default_note_name() -> String {
    DEFAULT_NOTE_NAME.to_string()
}

fn default_lcd_align() -> String {
    DEFAULT_LCD_ALIGN.to_string()
}

impl Block {
    /// The block an editor drops when the user picks `kind` from the palette.
    pub fn with_defaults(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Move => Block::Move {
                direction: Direction::Forward,
                seconds: Some(DEFAULT_MOVE_SECONDS.into()),
            },
            BlockKind::Beep => Block::Beep,
            BlockKind::Note => Block::Note {
                name: default_note_name(),
                beats: Some(DEFAULT_NOTE_BEATS.into()),
            },
            BlockKind::Mary => Block::Mary,
            BlockKind::Rgb => Block::Rgb {
                hex: Some(DEFAULT_RGB_HEX.to_string()),
                r: None,
                g: None,
                b: None,
            },
            BlockKind::Lcd => Block::Lcd {
                msg: DEFAULT_LCD_MSG.to_string(),
                row: Some(Scalar::Number(0.0)),
                align: default_lcd_align(),
                hex: None,
                r: None,
                g: None,
                b: None,
            },
            BlockKind::Wait => Block::Wait {
                seconds: Some(DEFAULT_WAIT_SECONDS.into()),
            },
            BlockKind::RainbowStart => Block::RainbowStart {
                interval: Some(DEFAULT_RAINBOW_INTERVAL.into()),
                sat: Some(DEFAULT_RAINBOW_SAT.into()),
                val: Some(DEFAULT_RAINBOW_VAL.into()),
            },
            BlockKind::RainbowStop => Block::RainbowStop,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Move { .. } => BlockKind::Move,
            Block::Beep => BlockKind::Beep,
            Block::Note { .. } => BlockKind::Note,
            Block::Mary => BlockKind::Mary,
            Block::Rgb { .. } => BlockKind::Rgb,
            Block::Lcd { .. } => BlockKind::Lcd,
            Block::Wait { .. } => BlockKind::Wait,
            Block::RainbowStart { .. } => BlockKind::RainbowStart,
            Block::RainbowStop => BlockKind::RainbowStop,
        }
    }

    /// One-line description for listings, e.g. `move forward 0.8s`.
    pub fn summary(&self) -> String {
        fn opt(v: &Option<Scalar>) -> String {
            v.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "-".into())
        }
        match self {
            Block::Move { direction, seconds } => format!("move {direction} {}s", opt(seconds)),
            Block::Note { name, beats } => format!("note {name} x{}", opt(beats)),
            Block::Rgb { hex, r, g, b } => match hex {
                Some(h) => format!("rgb {h}"),
                None => format!("rgb {},{},{}", opt(r), opt(g), opt(b)),
            },
            Block::Lcd { msg, row, align, .. } => {
                format!("lcd \"{msg}\" row {} {align}", opt(row))
            }
            Block::Wait { seconds } => format!("wait {}s", opt(seconds)),
            Block::RainbowStart { interval, sat, val } => format!(
                "rainbow start {}ms sat {} val {}",
                opt(interval),
                opt(sat),
                opt(val)
            ),
            Block::Beep => "beep".into(),
            Block::Mary => "mary".into(),
            Block::RainbowStop => "rainbow stop".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A block placed in a program, tagged with its list identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    #[serde(flatten)]
    pub block: Block,
}

impl Action {
    pub fn new(id: u64, block: Block) -> Self {
        Self { id, block }
    }

    pub fn kind(&self) -> BlockKind {
        self.block.kind()
    }

    /// Overwrite the named fields of the block in place.
    ///
    /// Field names are checked against the block's kind; the merged block is
    /// then re-read so a patch can never leave a half-valid action behind.
    /// A `null` value clears an optional field.
    pub fn apply_patch(
        &mut self,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let kind = self.kind();
        for field in patch.keys() {
            if !kind.fields().contains(&field.as_str()) {
                return Err(BotError::UnknownField {
                    kind: kind.to_string(),
                    field: field.clone(),
                });
            }
        }

        let mut value = serde_json::to_value(&self.block)?;
        let obj = value.as_object_mut().ok_or_else(|| BotError::InvalidPatch {
            id: self.id,
            reason: "block is not an object".into(),
        })?;
        for (field, v) in patch {
            if v.is_null() {
                obj.remove(field);
            } else {
                obj.insert(field.clone(), v.clone());
            }
        }

        self.block = serde_json::from_value(value).map_err(|e| BotError::InvalidPatch {
            id: self.id,
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
