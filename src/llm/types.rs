use crate::agent::ToolDefinition;
use serde::{Deserialize, Serialize};

/// LLM provider enumeration for configuration
///
/// Every provider listed here speaks the OpenAI chat-completions dialect, so a
/// single adapter serves all of them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenRouter,
    OpenAI,
    Ollama,
}

impl LlmProvider {
    /// Parse a provider name as written in configuration (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(LlmProvider::Gemini),
            "openrouter" => Some(LlmProvider::OpenRouter),
            "openai" => Some(LlmProvider::OpenAI),
            "ollama" => Some(LlmProvider::Ollama),
            _ => None,
        }
    }

    /// Get the default API base URL for this provider
    pub fn default_api_base(&self) -> &str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Get the default environment variable name for this provider's API key
    pub fn default_env_var(&self) -> &str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Ollama => "", // No API key needed for local Ollama
        }
    }

    /// Model used when configuration does not name one
    pub fn default_model(&self) -> &str {
        match self {
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::OpenRouter => "google/gemini-2.0-flash-001",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Ollama => "llama3.1",
        }
    }

    /// Check if this provider requires an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }

    pub fn display_name(&self) -> &str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Ollama => "Ollama",
        }
    }
}

/// Unified request format for all LLM adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>, // Override default model
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,

    /// Tools available for function calling (OpenAI format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// Tool choice parameter: "auto", "none", "required"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, choice: String) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

/// Unified response format from LLM adapters
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// Plain text answer with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: None,
            finish_reason: Some("stop".to_string()),
        }
    }

    /// Response that only requests tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls: Some(tool_calls),
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String, // "user", "assistant", "system", "tool"
    pub content: String,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Id of the call a "tool" message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Assistant turn that carried tool calls; must precede the matching tool messages
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::new("assistant", content)
        }
    }

    /// Observation returned for one tool call
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new("tool", content)
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("Gemini"), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::parse(" openrouter "), Some(LlmProvider::OpenRouter));
        assert_eq!(LlmProvider::parse("ollama"), Some(LlmProvider::Ollama));
        assert_eq!(LlmProvider::parse("watson"), None);
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(LlmProvider::Gemini.default_env_var(), "GEMINI_API_KEY");
        assert_eq!(LlmProvider::Gemini.default_model(), "gemini-2.0-flash");
        assert!(LlmProvider::Gemini.requires_api_key());
        assert!(!LlmProvider::Ollama.requires_api_key());
    }

    #[test]
    fn test_tool_message_constructor() {
        let msg = Message::tool("call_1", "RESULTS");
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert!(msg.tool_calls.is_none());
    }

    #[test]
    fn test_has_tool_calls() {
        assert!(!LlmResponse::text("hi").has_tool_calls());
        assert!(!LlmResponse::with_tool_calls(vec![]).has_tool_calls());
        assert!(LlmResponse::with_tool_calls(vec![ToolCall::new(
            "1",
            "youtube_search",
            serde_json::json!({"query": "Heat"})
        )])
        .has_tool_calls());
    }
}
