// Tool definitions in OpenAI-compatible function calling format
//
// Every tool takes a single text input. The model is shown a one-property
// schema and its arguments object is flattened back to that text before the
// tool runs.
//
// Reference: https://platform.openai.com/docs/guides/function-calling

use crate::error::{CinebotError, Result};
use crate::tool_executor::ToolExecutor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool definition in OpenAI function calling format
///
/// # Example
/// ```json
/// {
///   "type": "function",
///   "function": {
///     "name": "youtube_search",
///     "description": "Find a YouTube trailer link for a movie or series.",
///     "parameters": {
///       "type": "object",
///       "properties": {
///         "query": { "type": "string", "description": "Title of the movie or series" }
///       },
///       "required": ["query"]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function" for function calling
    #[serde(rename = "type")]
    pub tool_type: String,

    /// The function definition
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,

    /// Clear description of what this function does and when to use it
    pub description: String,

    /// JSON schema for the function parameters
    pub parameters: FunctionParameters,
}

/// Parameters schema for a function (JSON Schema format)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionParameters {
    /// Always "object" for parameter schemas
    #[serde(rename = "type")]
    pub param_type: String,

    pub properties: serde_json::Value,

    pub required: Vec<String>,
}

/// Name of the single text parameter every tool exposes
pub const INPUT_PARAMETER: &str = "query";

impl ToolDefinition {
    /// Describe a tool to the model
    pub fn from_tool(tool: &dyn Tool) -> Self {
        let mut properties = serde_json::Map::new();
        properties.insert(
            INPUT_PARAMETER.to_string(),
            serde_json::json!({
                "type": "string",
                "description": tool.input_description()
            }),
        );

        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: FunctionParameters {
                    param_type: "object".to_string(),
                    properties: serde_json::Value::Object(properties),
                    required: vec![INPUT_PARAMETER.to_string()],
                },
            },
        }
    }
}

/// A named function the agent may call with one text input
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name shown to the model (letters, digits, `_` and `-` only)
    fn name(&self) -> &str;

    /// When the model should reach for this tool
    fn description(&self) -> &str;

    /// What the single text input should contain
    fn input_description(&self) -> &str {
        "The text input for the tool"
    }

    async fn run(&self, input: &str) -> Result<String>;
}

/// Flatten model-provided arguments into the tool's text input
///
/// Accepts a bare string, `{"query": "..."}`, or any object with exactly one
/// scalar property. Anything else is reported back to the model as invalid.
pub fn tool_input(arguments: &serde_json::Value) -> std::result::Result<String, String> {
    use serde_json::Value;

    match arguments {
        Value::String(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Object(map) => {
            if let Some(Value::String(query)) = map.get(INPUT_PARAMETER) {
                return Ok(query.clone());
            }

            let mut values = map.values();
            match (values.next(), values.next()) {
                (Some(Value::String(text)), None) => Ok(text.clone()),
                (Some(Value::Number(n)), None) => Ok(n.to_string()),
                (None, _) => Err("missing tool input".to_string()),
                _ => Err(format!("expected a single text argument, got {}", arguments)),
            }
        }
        Value::Null => Err("missing tool input".to_string()),
        Value::Array(_) => Err(format!("expected a single text argument, got {}", arguments)),
    }
}

/// Registry of the tools available to the agent
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute_tool(&self, tool_name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(tool_name)
            .ok_or_else(|| CinebotError::ToolError(format!("Unknown tool: {}", tool_name)))?;

        tracing::debug!("Running tool {} with input {:?}", tool_name, input);
        tool.run(input).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition::from_tool(tool.as_ref()))
            .collect()
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }
}
