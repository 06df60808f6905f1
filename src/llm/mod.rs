mod openai_compat;
mod types;

pub use openai_compat::OpenAiCompatAdapter;
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Unified LLM interface that all adapters must implement
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Get a complete chat response (non-streaming)
    /// Tool calls and the final answer both come back through this call
    async fn complete_chat(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Get the adapter name for logging/debugging
    fn name(&self) -> &str;
}

/// Factory function to create the adapter for a configured provider
pub fn create_adapter(
    provider: LlmProvider,
    api_key: Option<String>,
    api_base: Option<String>,
    model: String,
    timeout: Duration,
) -> Result<Arc<dyn LlmAdapter>> {
    let mut adapter = OpenAiCompatAdapter::new(provider, api_key, model, timeout)?;
    if let Some(base) = api_base {
        adapter = adapter.with_api_base(base);
    }
    Ok(Arc::new(adapter))
}
