//! Poll snapshot: option labels, texts, and poll metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Option identifier. The service sends an integer code whose value is the
/// code point of the character that stands for this option in a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub struct Label(char);

impl Label {
    /// Label for an integer code. `None` when the code is not a Unicode scalar value.
    pub fn from_code(code: u32) -> Option<Self> {
        char::from_u32(code).map(Label)
    }

    /// Parse an `Options` key: a decimal code (`"65"`), or a single character
    /// taken as its own code point (`"A"`).
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            return key.parse::<u32>().ok().and_then(Self::from_code);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Label(c)),
            _ => None,
        }
    }

    pub fn code(&self) -> u32 {
        self.0 as u32
    }

    /// Ballot character for this label.
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl From<Label> for u32 {
    fn from(label: Label) -> Self {
        label.code()
    }
}

/// One selectable answer of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub label: Label,
    pub text: String,
}

impl PollOption {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// Poll end time as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndTime {
    /// Unix seconds.
    Unix(i64),
    /// Fractional or out-of-range seconds.
    Number(serde_json::Number),
    Text(String),
}

impl EndTime {
    /// Filesystem-safe rendering used in record names.
    pub fn file_stamp(&self) -> String {
        match self {
            EndTime::Unix(secs) => match DateTime::<Utc>::from_timestamp(*secs, 0) {
                Some(at) => at.format("%Y-%m-%d_%H-%M-%S").to_string(),
                None => secs.to_string(),
            },
            EndTime::Number(n) => {
                let stamp = n
                    .as_f64()
                    .filter(|secs| secs.is_finite() && secs.abs() < i64::MAX as f64)
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0));
                match stamp {
                    Some(at) => at.format("%Y-%m-%d_%H-%M-%S").to_string(),
                    None => slug(&n.to_string()),
                }
            }
            EndTime::Text(text) => slug(text),
        }
    }
}

impl fmt::Display for EndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndTime::Unix(secs) => write!(f, "{}", secs),
            EndTime::Number(n) => write!(f, "{}", n),
            EndTime::Text(text) => f.write_str(text),
        }
    }
}

/// The complete state of the active poll. Replaced wholesale on every poll event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollSnapshot {
    pub title: String,
    pub ends: EndTime,
    /// Options in the order the service listed them.
    pub options: Vec<PollOption>,
}

impl PollSnapshot {
    pub fn new(title: impl Into<String>, ends: EndTime, options: Vec<PollOption>) -> Self {
        Self {
            title: title.into(),
            ends,
            options,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Human-readable record identifier derived from title and end time.
    pub fn record_name(&self) -> String {
        let title = slug(&self.title);
        let title = if title.is_empty() { "poll".to_string() } else { title };
        format!("{}_{}", title, self.ends.file_stamp())
    }
}

/// Lower-case, keep alphanumerics, collapse everything else into single `-`.
pub(crate) fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
