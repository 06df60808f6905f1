// Agent framework: a function-calling loop over an LLM adapter and a tool set
//
// Module Organization:
// - tools.rs: ToolDefinition (OpenAI format), the Tool trait and ToolRegistry
// - Core AgentExecutor boundary, AgentConfig and ToolCallingAgent in this file
//
// The controller only sees the AgentExecutor trait: a query goes in, tool
// events come out through the EventSink while the agent works, and a final
// answer (or an error) is returned.

pub mod tools;

use crate::error::{CinebotError, Result};
use crate::events::{AgentEvent, EventSink};
use crate::llm::{LlmAdapter, LlmRequest, Message, ToolCall};
use crate::tool_executor::ToolExecutor;
use async_trait::async_trait;
use std::sync::Arc;

pub use tools::{
    tool_input, FunctionDefinition, FunctionParameters, Tool, ToolDefinition, ToolRegistry,
};

/// Maximum model round-trips before the agent gives up
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Answer returned when the iteration budget runs out
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// Input for one agent invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub input: String,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Result of one agent invocation; `output` is None when the model gave no answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentResponse {
    pub output: Option<String>,
}

impl AgentResponse {
    pub fn answer(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
        }
    }
}

/// Boundary between the conversation controller and whatever produces answers
///
/// Implementations publish `ToolCall`/`ToolResult` events to `events` as they
/// use tools. Terminal events are published by the caller, not the agent.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn invoke(&self, request: AgentRequest, events: EventSink) -> Result<AgentResponse>;
}

/// Runtime configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique identifier for this agent
    pub id: String,

    /// Display name for the agent
    pub name: String,

    /// System instructions sent ahead of every query
    pub instructions: String,

    /// Model override; the adapter's default model is used when None
    pub model: Option<String>,

    pub max_iterations: u32,

    pub temperature: Option<f32>,
}

impl AgentConfig {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            instructions: String::new(),
            model: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: None,
        }
    }

    /// The movie research assistant used by the desktop app
    pub fn movie_assistant() -> Self {
        Self {
            instructions: Self::build_movie_instructions(),
            ..Self::new("movie_assistant".to_string(), "Movie Assistant".to_string())
        }
    }

    fn build_movie_instructions() -> String {
        r#"You are a movie and series research assistant. Answer the user's question as best you can.

## Tools

- Use `duckduckgo_search` to look up facts about a movie or series: IMDb rating, release date, director, starring cast, plot.
- Use `youtube_search` with the title to find the official trailer link.

## Guidelines

- Search before answering questions about specific titles instead of relying on memory.
- When a trailer was found, include the full trailer URL in the answer.
- If the tools return nothing useful, say so plainly.
- Keep the final answer short and factual."#
            .to_string()
    }
}

/// Agent that lets the model call tools until it produces a text answer
pub struct ToolCallingAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmAdapter>,
    tools: Arc<dyn ToolExecutor>,
}

impl ToolCallingAgent {
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmAdapter>, tools: Arc<dyn ToolExecutor>) -> Self {
        Self { config, llm, tools }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn build_request(&self, messages: &[Message]) -> LlmRequest {
        let mut request = LlmRequest::new(messages.to_vec());

        let tools = self.tools.definitions();
        if !tools.is_empty() {
            request = request
                .with_tools(tools)
                .with_tool_choice("auto".to_string());
        }
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        request
    }

    /// Run one tool call and return the observation fed back to the model
    ///
    /// Unknown tools, unreadable arguments and tool failures all become
    /// observations so the model can recover on its next turn. Fails only when
    /// the observer has gone away.
    async fn run_tool_call(&self, call: &ToolCall, events: &EventSink) -> Result<String> {
        let input = tool_input(&call.arguments);
        let shown_input = match &input {
            Ok(text) => text.clone(),
            Err(_) => call.arguments.to_string(),
        };
        publish(events, AgentEvent::tool_call(&call.name, shown_input))?;

        let observation = if !self.tools.has_tool(&call.name) {
            format!(
                "{} is not a valid tool, try one of [{}].",
                call.name,
                self.tools.tool_names().join(", ")
            )
        } else {
            match input {
                Err(detail) => format!("Invalid tool input: {}", detail),
                Ok(text) => match self.tools.execute_tool(&call.name, &text).await {
                    Ok(output) => output,
                    Err(CinebotError::ToolError(message)) => format!("Tool error: {}", message),
                    Err(e) => format!("Tool error: {}", e),
                },
            }
        };

        publish(events, AgentEvent::tool_result(observation.clone()))?;
        Ok(observation)
    }
}

fn cancelled() -> CinebotError {
    CinebotError::AgentError("Request cancelled.".to_string())
}

/// Publish a tool event; a closed channel means the request was abandoned
fn publish(events: &EventSink, event: AgentEvent) -> Result<()> {
    events.publish(event).map_err(|e| {
        tracing::debug!("Stopping agent: {}", e);
        cancelled()
    })
}

#[async_trait]
impl AgentExecutor for ToolCallingAgent {
    async fn invoke(&self, request: AgentRequest, events: EventSink) -> Result<AgentResponse> {
        let mut messages = Vec::new();
        if !self.config.instructions.is_empty() {
            messages.push(Message::system(self.config.instructions.clone()));
        }
        messages.push(Message::user(request.input));

        for iteration in 0..self.config.max_iterations {
            if events.is_closed() {
                return Err(cancelled());
            }

            tracing::debug!("{} iteration {}", self.config.id, iteration + 1);

            let response = self
                .llm
                .complete_chat(self.build_request(&messages))
                .await
                .map_err(|e| CinebotError::AgentError(format!("{:#}", e)))?;

            if !response.has_tool_calls() {
                let answer = response.content.trim();
                return Ok(AgentResponse {
                    output: (!answer.is_empty()).then(|| answer.to_string()),
                });
            }
            let calls = response.tool_calls.unwrap_or_default();

            messages.push(Message::assistant_tool_calls(
                response.content.clone(),
                calls.clone(),
            ));

            for call in &calls {
                let observation = self.run_tool_call(call, &events).await?;
                messages.push(Message::tool(call.id.clone(), observation));
            }
        }

        tracing::warn!(
            "{} hit the iteration limit ({})",
            self.config.id,
            self.config.max_iterations
        );
        Ok(AgentResponse::answer(ITERATION_LIMIT_MESSAGE))
    }
}
