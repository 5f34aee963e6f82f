//! Inbound events and outbound frames of the polling protocol.

use serde::Deserialize;
use std::fmt;

use super::ballot::Ballot;
use super::poll::{EndTime, PollSnapshot};

/// Discriminator field present on every structured frame.
pub const DISCRIMINATOR: &str = "Mtype";

/// Decoded structured frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A new poll; replaces the current snapshot.
    Poll(PollSnapshot),
    /// The service asks for the ballot now.
    Call,
    /// Unknown `Mtype`, kept for forward compatibility.
    Unrecognized(String),
}

impl InboundEvent {
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::Poll(_) => "poll",
            InboundEvent::Call => "call",
            InboundEvent::Unrecognized(kind) => kind,
        }
    }
}

/// Result of classifying one raw frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Not structured content; keepalive only. Carries the raw frame text.
    Heartbeat(String),
    Event(InboundEvent),
    /// Structured, but missing or invalid required fields.
    Malformed(String),
}

/// Poll payload as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct PollMessage {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Ends")]
    pub ends: EndTime,
    /// Label key -> option text, in wire order.
    #[serde(rename = "Options")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Frames this client sends.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Auth(String),
    Ack,
    Ballot(Ballot),
}

impl Outbound {
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outbound::Auth(token) => write!(f, "auth: {}", token),
            Outbound::Ack => f.write_str("ack"),
            Outbound::Ballot(ballot) => write!(f, "ballot: {}", ballot.encode()),
        }
    }
}
