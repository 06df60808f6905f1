// Library interface for Cinebot
// This exposes the core functionality as a library that can be:
// - Driven by the desktop window in main.rs
// - Called from scripts and tests without a window

pub mod agent;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod llm;
pub mod logger;
pub mod tool_executor;
pub mod tools;
pub mod transcript;
pub mod ui;
pub mod version;

// Re-export commonly used types for convenience
pub use agent::{AgentConfig, AgentExecutor, AgentRequest, AgentResponse, ToolCallingAgent};
pub use config::AppConfig;
pub use controller::{ConversationController, SubmitOutcome};
pub use error::{CinebotError, Result};
pub use events::{AgentEvent, EventSink};
pub use llm::{LlmAdapter, LlmProvider, LlmRequest, LlmResponse};
pub use logger::EventLogger;
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
