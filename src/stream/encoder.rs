// src/stream/encoder.rs

use serde::{Deserialize, Serialize};

use crate::engine::{Origin, RunEvent};

/// Wire form of a [`RunEvent`].
///
/// Serializes to the protocol the operator page consumes:
/// `{"type":"stdout","text":...}`, `{"type":"stderr","text":...}`,
/// `{"type":"done","code":...}`, `{"type":"error","text":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Stdout { text: String },
    Stderr { text: String },
    Done { code: i32 },
    Error { text: String },
}

impl Envelope {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Envelope::Done { .. } | Envelope::Error { .. })
    }
}

/// Encode one event into its wire envelope.
///
/// Pure and stateless: callers map a stream of events through this one at
/// a time, and the envelope order is the event order.
pub fn encode(event: &RunEvent) -> Envelope {
    match event {
        RunEvent::OutputChunk {
            origin: Origin::Stdout,
            text,
        } => Envelope::Stdout { text: text.clone() },
        RunEvent::OutputChunk {
            origin: Origin::Stderr,
            text,
        } => Envelope::Stderr { text: text.clone() },
        // The wire protocol has exactly four event types; step markers ride
        // along as a stdout banner line.
        RunEvent::StepStarted { label } => Envelope::Stdout {
            text: format!("\n==> {label}\n"),
        },
        RunEvent::Completed { code } => Envelope::Done { code: *code },
        RunEvent::Failed { message } => Envelope::Error {
            text: message.clone(),
        },
    }
}
