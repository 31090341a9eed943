//! Block-to-script compiler.
//!
//! Renders a program as the imperative script a block editor would show next
//! to the workspace, one call per block. Parameters go through the same
//! coercion as a real run, so the script shows what would be sent. The script
//! is for display; running a program always goes through the runner.

use crate::action::{
    Action, Block, DEFAULT_MOVE_SECONDS, DEFAULT_RAINBOW_INTERVAL, DEFAULT_RAINBOW_SAT,
    DEFAULT_RAINBOW_VAL, DEFAULT_WAIT_SECONDS,
};
use crate::request::{lcd_row, note_beats, Color, RAINBOW_INTERVAL_MAX, RAINBOW_INTERVAL_MIN};
use crate::scalar::{coerce, coerce_int, format_number};

pub fn compile(actions: &[Action]) -> String {
    let mut out = String::new();
    for action in actions {
        out.push_str(&compile_block(&action.block));
        out.push('\n');
    }
    out
}

pub fn compile_block(block: &Block) -> String {
    match block {
        Block::Move { direction, seconds } => {
            let secs = coerce(seconds.as_ref(), DEFAULT_MOVE_SECONDS).max(0.0);
            format!("robot.move({}, {});", quote(direction.as_str()), format_number(secs))
        }
        Block::Beep => "robot.beep();".into(),
        Block::Note { name, beats } => format!(
            "robot.note({}, {});",
            quote(name),
            format_number(note_beats(beats.as_ref()))
        ),
        Block::Mary => "robot.mary();".into(),
        Block::Rgb { hex, r, g, b } => {
            match Color::resolve(hex.as_deref(), r.as_ref(), g.as_ref(), b.as_ref())
                .unwrap_or(Color::Rgb(0, 0, 0))
            {
                Color::Hex(h) => format!("robot.rgb({});", quote(&h)),
                Color::Rgb(r, g, b) => format!("robot.rgb({r}, {g}, {b});"),
            }
        }
        Block::Lcd {
            msg,
            row,
            align,
            hex,
            r,
            g,
            b,
        } => {
            let head = format!(
                "robot.lcd({}, {}, {}",
                quote(msg),
                lcd_row(row.as_ref()),
                quote(&align.trim().to_lowercase())
            );
            match Color::resolve(hex.as_deref(), r.as_ref(), g.as_ref(), b.as_ref()) {
                Some(Color::Hex(h)) => format!("{head}, {});", quote(&h)),
                Some(Color::Rgb(r, g, b)) => format!("{head}, {r}, {g}, {b});"),
                None => format!("{head});"),
            }
        }
        Block::Wait { seconds } => {
            let secs = coerce(seconds.as_ref(), DEFAULT_WAIT_SECONDS).max(0.0);
            format!("robot.wait({});", format_number(secs))
        }
        Block::RainbowStart { interval, sat, val } => format!(
            "robot.rainbowStart({}, {}, {});",
            coerce_int(
                interval.as_ref(),
                DEFAULT_RAINBOW_INTERVAL,
                RAINBOW_INTERVAL_MIN,
                RAINBOW_INTERVAL_MAX
            ),
            coerce_int(sat.as_ref(), DEFAULT_RAINBOW_SAT, 0, 255),
            coerce_int(val.as_ref(), DEFAULT_RAINBOW_VAL, 0, 255),
        ),
        Block::RainbowStop => "robot.rainbowStop();".into(),
    }
}

fn quote(s: &str) -> String {
    // JSON string escaping doubles as a JS/Python-compatible literal.
    serde_json::Value::String(s.to_string()).to_string()
}
