// Event logger: renders agent tool events into the transcript
//
// Invariant: between two consecutive tool calls at most one result entry is
// rendered. Some completion paths report a tool's output more than once; only
// the first report after a call is shown.

use crate::events::AgentEvent;
use crate::transcript::{EntryKind, Transcript};

/// Per-request renderer for tool events
///
/// A fresh logger is created for every submitted query, so the
/// "result already shown" flag never leaks between requests.
#[derive(Debug, Default)]
pub struct EventLogger {
    result_shown: bool,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a tool invocation and reset the result flag
    pub fn on_tool_call(&mut self, transcript: &mut Transcript, name: &str, input: &str) {
        transcript.append(EntryKind::ToolCall, format!("Calling {}: \"{}\"", name, input));
        self.result_shown = false;
    }

    /// Render a tool result unless one was already shown for the current call
    pub fn on_tool_result(&mut self, transcript: &mut Transcript, output: &str) {
        if self.result_shown {
            tracing::debug!("Suppressing duplicate tool result");
            return;
        }

        transcript.append(EntryKind::ToolResult, format!("RESULTS: {}", output));
        self.result_shown = true;
    }

    /// Dispatch a tool event; terminal events belong to the controller
    pub fn handle(&mut self, transcript: &mut Transcript, event: &AgentEvent) {
        match event {
            AgentEvent::ToolCall { name, input } => self.on_tool_call(transcript, name, input),
            AgentEvent::ToolResult { output } => self.on_tool_result(transcript, output),
            AgentEvent::Complete { .. } | AgentEvent::Failed { .. } => {}
        }
    }
}
