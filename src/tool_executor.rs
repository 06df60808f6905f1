// Tool execution abstraction for the agent loop
// Lets the agent call tools without knowing how they are registered

use crate::agent::ToolDefinition;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for executing tool calls requested by the model
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool call and return the result as a string
    ///
    /// # Arguments
    /// * `tool_name` - Name of the tool to call (e.g., "duckduckgo_search")
    /// * `input` - The flattened text input for the tool
    ///
    /// # Returns
    /// * `Result<String>` - The tool output or error
    async fn execute_tool(&self, tool_name: &str, input: &str) -> Result<String>;

    /// Definitions advertised to the model on every request
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Names of all callable tools, in registration order
    fn tool_names(&self) -> Vec<String>;

    fn has_tool(&self, tool_name: &str) -> bool {
        self.tool_names().iter().any(|name| name == tool_name)
    }
}
