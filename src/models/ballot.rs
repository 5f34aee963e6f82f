//! Ballot: ordered vote characters sent in reply to a call event.

use serde::Serialize;
use std::fmt;

use super::poll::Label;

/// Ordered labels, one per vote slot. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ballot(Vec<Label>);

impl Ballot {
    pub fn new(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Wire form: one character per vote whose code point is the label code.
    pub fn encode(&self) -> String {
        self.0.iter().map(Label::as_char).collect()
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
