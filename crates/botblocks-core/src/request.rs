//! Translation of a block into the single step the runner performs for it.
//!
//! | block         | step                                   |
//! |---------------|----------------------------------------|
//! | move          | `POST /motor` form `l`, `r`, `ms`      |
//! | beep          | `GET /beep`                            |
//! | note          | `GET /note?name&beats`                 |
//! | mary          | `GET /mary`                            |
//! | rgb           | `POST /rgb` form `hex` or `r`,`g`,`b`  |
//! | lcd           | `POST /lcd` form `msg`,`row`,`align`, optional color |
//! | wait          | local sleep, no request                |
//! | rainbowStart  | `GET /fx/rainbow/start?interval&sat&val` |
//! | rainbowStop   | `GET /fx/rainbow/stop`                 |

use std::fmt;
use std::time::Duration;

use url::form_urlencoded;

use crate::action::{
    Block, DEFAULT_MOVE_SECONDS, DEFAULT_NOTE_BEATS, DEFAULT_RAINBOW_INTERVAL, DEFAULT_RAINBOW_SAT,
    DEFAULT_RAINBOW_VAL, DEFAULT_WAIT_SECONDS, MIN_NOTE_BEATS,
};
use crate::config::trim_base_url;
use crate::scalar::{coerce, coerce_int, format_number, seconds_to_ms, Scalar};

pub const RAINBOW_INTERVAL_MIN: i64 = 5;
pub const RAINBOW_INTERVAL_MAX: i64 = 1000;

// ---------------------------------------------------------------------------
// Method / RobotRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP call against the robot, independent of its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotRequest {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub form: Vec<(&'static str, String)>,
}

impl RobotRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    fn query_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn form_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.form.push((key, value.into()));
        self
    }

    /// Absolute URL including the encoded query string.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", trim_base_url(base_url), self.path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode(&self.query));
        }
        url
    }

    /// `application/x-www-form-urlencoded` body for POST requests.
    pub fn body(&self) -> Option<String> {
        match self.method {
            Method::Post => Some(encode(&self.form)),
            Method::Get => None,
        }
    }

    /// Log line: `METHOD url [body]`.
    pub fn trace_line(&self, base_url: &str) -> String {
        match self.body() {
            Some(body) if !body.is_empty() => {
                format!("{} {} {}", self.method, self.url(base_url), body)
            }
            _ => format!("{} {}", self.method, self.url(base_url)),
        }
    }

    /// Value of a form or query parameter, for inspection.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .chain(self.query.iter())
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn encode(pairs: &[(&'static str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// What the runner does for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Request(RobotRequest),
    Sleep(Duration),
}

impl Step {
    pub fn for_block(block: &Block) -> Step {
        match block {
            Block::Move { direction, seconds } => {
                let code = direction.motor_code();
                let ms = seconds_to_ms(seconds.as_ref(), DEFAULT_MOVE_SECONDS);
                Step::Request(
                    RobotRequest::post("/motor")
                        .form_param("l", code)
                        .form_param("r", code)
                        .form_param("ms", ms.to_string()),
                )
            }
            Block::Beep => Step::Request(RobotRequest::get("/beep")),
            Block::Note { name, beats } => {
                let beats = note_beats(beats.as_ref());
                Step::Request(
                    RobotRequest::get("/note")
                        .query_param("name", name.as_str())
                        .query_param("beats", format_number(beats)),
                )
            }
            Block::Mary => Step::Request(RobotRequest::get("/mary")),
            Block::Rgb { hex, r, g, b } => {
                let color = Color::resolve(hex.as_deref(), r.as_ref(), g.as_ref(), b.as_ref())
                    .unwrap_or(Color::Rgb(0, 0, 0));
                Step::Request(color.append_to(RobotRequest::post("/rgb")))
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
                let req = RobotRequest::post("/lcd")
                    .form_param("msg", msg.as_str())
                    .form_param("row", lcd_row(row.as_ref()).to_string())
                    .form_param("align", align.trim().to_lowercase());
                let req = match Color::resolve(hex.as_deref(), r.as_ref(), g.as_ref(), b.as_ref())
                {
                    Some(color) => color.append_to(req),
                    None => req,
                };
                Step::Request(req)
            }
            Block::Wait { seconds } => Step::Sleep(Duration::from_millis(seconds_to_ms(
                seconds.as_ref(),
                DEFAULT_WAIT_SECONDS,
            ))),
            Block::RainbowStart { interval, sat, val } => Step::Request(rainbow_start(
                interval.as_ref(),
                sat.as_ref(),
                val.as_ref(),
            )),
            Block::RainbowStop => Step::Request(rainbow_stop()),
        }
    }

    pub fn trace_line(&self, base_url: &str) -> String {
        match self {
            Step::Request(req) => req.trace_line(base_url),
            Step::Sleep(d) => format!("WAIT {}ms", d.as_millis()),
        }
    }
}

pub fn rainbow_start(
    interval: Option<&Scalar>,
    sat: Option<&Scalar>,
    val: Option<&Scalar>,
) -> RobotRequest {
    let interval = coerce_int(
        interval,
        DEFAULT_RAINBOW_INTERVAL,
        RAINBOW_INTERVAL_MIN,
        RAINBOW_INTERVAL_MAX,
    );
    RobotRequest::get("/fx/rainbow/start")
        .query_param("interval", interval.to_string())
        .query_param("sat", channel(sat, DEFAULT_RAINBOW_SAT).to_string())
        .query_param("val", channel(val, DEFAULT_RAINBOW_VAL).to_string())
}

pub fn rainbow_stop() -> RobotRequest {
    RobotRequest::get("/fx/rainbow/stop")
}

pub(crate) fn note_beats(beats: Option<&Scalar>) -> f64 {
    coerce(beats, DEFAULT_NOTE_BEATS).max(MIN_NOTE_BEATS)
}

pub(crate) fn lcd_row(row: Option<&Scalar>) -> i64 {
    coerce_int(row, 0.0, 0, 1)
}

fn channel(v: Option<&Scalar>, default: f64) -> i64 {
    coerce_int(v, default, 0, 255)
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Color parameters for rgb and lcd blocks after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Hex(String),
    Rgb(i64, i64, i64),
}

impl Color {
    /// A hex string of at least 4 characters wins over r/g/b. Without one,
    /// r/g/b are used if any of them is present (missing channels read 0).
    /// Returns `None` when no usable color field was supplied at all.
    pub fn resolve(
        hex: Option<&str>,
        r: Option<&Scalar>,
        g: Option<&Scalar>,
        b: Option<&Scalar>,
    ) -> Option<Color> {
        if let Some(hex) = hex.map(str::trim).filter(|h| h.chars().count() >= 4) {
            let normalized = if hex.starts_with('#') {
                hex.to_string()
            } else {
                format!("#{hex}")
            };
            return Some(Color::Hex(normalized));
        }
        if r.is_none() && g.is_none() && b.is_none() {
            return None;
        }
        Some(Color::Rgb(
            channel(r, 0.0),
            channel(g, 0.0),
            channel(b, 0.0),
        ))
    }

    fn append_to(self, req: RobotRequest) -> RobotRequest {
        match self {
            Color::Hex(hex) => req.form_param("hex", hex),
            Color::Rgb(r, g, b) => req
                .form_param("r", r.to_string())
                .form_param("g", g.to_string())
                .form_param("b", b.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
