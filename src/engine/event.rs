// src/engine/event.rs

use std::fmt;

/// Which pipe a chunk of process output arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Stdout,
    Stderr,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Stdout => write!(f, "stdout"),
            Origin::Stderr => write!(f, "stderr"),
        }
    }
}

/// A discrete observation of a running or finished operation.
///
/// For any one operation exactly one terminal event (`Completed` or
/// `Failed`) is produced, and it is always the last event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Raw output as delivered by one of the child's pipes. Chunks are not
    /// line-buffered; byte boundaries are whatever the pipe handed us.
    OutputChunk { origin: Origin, text: String },
    /// Synthetic marker announcing the next workflow step.
    StepStarted { label: String },
    /// The process exited; `code` is its exit code (-1 when killed by a
    /// signal).
    Completed { code: i32 },
    /// The process could not be spawned, or the transport errored after
    /// spawn. Treated as non-zero for sequencing purposes.
    Failed { message: String },
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Completed { .. } | RunEvent::Failed { .. })
    }
}
