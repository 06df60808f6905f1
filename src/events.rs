// Typed event channel between the agent worker and the UI thread
//
// The agent runs on a tokio task and reports progress through an unbounded
// mpsc channel. Events arrive on the UI thread in the order they were sent, so
// tool events always precede the terminal Complete/Failed event.

use std::fmt;
use tokio::sync::mpsc;

/// Lifecycle notifications emitted while a request is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Agent decided to call a tool
    ToolCall { name: String, input: String },

    /// A tool finished and produced an observation
    ToolResult { output: String },

    /// Agent finished; `output` is None when the model returned no answer
    Complete { output: Option<String> },

    /// Agent invocation failed with a human-readable message
    Failed { message: String },
}

impl AgentEvent {
    pub fn tool_call(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self::ToolCall {
            name: name.into(),
            input: input.into(),
        }
    }

    pub fn tool_result(output: impl Into<String>) -> Self {
        Self::ToolResult {
            output: output.into(),
        }
    }

    /// True for the events that end a request
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed { .. })
    }
}

/// Sending half handed to the agent for one request
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiver that observes it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Publish an event to the observer
    pub fn publish(&self, event: AgentEvent) -> Result<(), EventError> {
        self.tx.send(event).map_err(|_| EventError::ChannelClosed)
    }

    /// True once the observer is gone (request cancelled or app closing)
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Errors that can occur during event operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    ChannelClosed,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::ChannelClosed => write!(f, "Event channel closed"),
        }
    }
}

impl std::error::Error for EventError {}
