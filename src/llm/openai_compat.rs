use super::types::*;
use super::LlmAdapter;
use crate::agent::ToolDefinition;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Adapter for any OpenAI-compatible chat completions endpoint
///
/// Gemini, OpenRouter, OpenAI and Ollama all accept the same request body, so
/// the provider only decides the base URL, the default model and whether an
/// API key is sent.
pub struct OpenAiCompatAdapter {
    client: Client,
    provider: LlmProvider,
    api_key: Option<String>,
    api_base: String,
    default_model: String,
}

impl OpenAiCompatAdapter {
    pub fn new(
        provider: LlmProvider,
        api_key: Option<String>,
        default_model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            provider,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_base: provider.default_api_base().to_string(),
            default_model,
        })
    }

    /// Point the adapter at a different base URL (proxies, self-hosted gateways)
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn send_request(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.provider.display_name()))
    }

    fn build_api_request(&self, request: LlmRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.unwrap_or_else(|| self.default_model.clone()),
            messages: request.messages.into_iter().map(ApiMessage::from).collect(),
            stream: false,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: request.tools.filter(|tools| !tools.is_empty()),
            tool_choice: request.tool_choice,
        }
    }
}

#[async_trait]
impl LlmAdapter for OpenAiCompatAdapter {
    async fn complete_chat(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_request = self.build_api_request(request);
        tracing::debug!(
            "{} request: model={}, messages={}, tools={}",
            self.provider.display_name(),
            api_request.model,
            api_request.messages.len(),
            api_request.tools.as_ref().map_or(0, |t| t.len())
        );

        let response = self.send_request(&api_request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} API error {}: {}",
                self.provider.display_name(),
                status,
                error_text
            );
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        parse_completion(completion)
    }

    fn name(&self) -> &str {
        self.provider.display_name()
    }
}

/// Convert a wire completion into the unified response
fn parse_completion(completion: CompletionResponse) -> Result<LlmResponse> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .context("No choices in response")?;

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, call)| {
            let id = call
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{}", index));
            ToolCall::new(id, call.function.name, parse_arguments(&call.function.arguments))
        })
        .collect();

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        },
        finish_reason: choice.finish_reason,
    })
}

/// Arguments arrive as a JSON-encoded string; keep the raw text when it is not JSON
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(serde_json::Map::new());
    }

    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!("Tool arguments are not valid JSON ({}): {}", e, raw);
        serde_json::Value::String(raw.to_string())
    })
}

// Internal API types
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,

    /// Custom tool definitions (OpenAI function calling format)
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<Message> for ApiMessage {
    fn from(message: Message) -> Self {
        let tool_calls = message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|call| ApiToolCall {
                    id: call.id,
                    call_type: "function".to_string(),
                    function: ApiFunctionCall {
                        name: call.name,
                        arguments: match call.arguments {
                            serde_json::Value::String(raw) => raw,
                            other => other.to_string(),
                        },
                    },
                })
                .collect::<Vec<_>>()
        });

        // Assistant turns that only carry tool calls are sent with a null content
        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content)
        };

        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ApiFunctionCall,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn adapter() -> OpenAiCompatAdapter {
        OpenAiCompatAdapter::new(
            LlmProvider::Gemini,
            Some("test-key".to_string()),
            "gemini-2.0-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_uses_provider_base() {
        let adapter = adapter();
        assert_eq!(
            adapter.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );

        let adapter = adapter.with_api_base("http://localhost:8080/v1/".to_string());
        assert_eq!(adapter.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_blank_api_key_is_not_sent() {
        let adapter = OpenAiCompatAdapter::new(
            LlmProvider::Ollama,
            Some("  ".to_string()),
            "llama3.1".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(adapter.api_key.is_none());
    }

    #[test]
    fn test_request_serializes_tool_turns() {
        let adapter = adapter();
        let call = ToolCall::new(
            "call_0",
            "youtube_search",
            serde_json::json!({"query": "Dune"}),
        );
        let request = LlmRequest::new(vec![
            Message::user("Find the Dune trailer"),
            Message::assistant_tool_calls("", vec![call]),
            Message::tool("call_0", "🎬 Found trailer: https://www.youtube.com/watch?v=abc"),
        ]);

        let body = serde_json::to_value(adapter.build_api_request(request)).unwrap();

        assert_eq!(body["model"], "gemini-2.0-flash");
        assert_eq!(body["stream"], false);
        assert!(body.get("tools").is_none());

        let assistant = &body["messages"][1];
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["type"], "function");
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "youtube_search");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"Dune"}"#
        );

        let tool = &body["messages"][2];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_0");
    }

    #[test]
    fn test_parse_completion_with_tool_calls() {
        let completion: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "",
                        "type": "function",
                        "function": {
                            "name": "duckduckgo_search",
                            "arguments": "{\"query\":\"Inception imdb rating\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let response = parse_completion(completion).unwrap();
        assert_eq!(response.content, "");
        let calls = response.tool_calls.unwrap();
        assert_eq!(calls[0].id, "call_0");
        assert_eq!(calls[0].name, "duckduckgo_search");
        assert_eq!(calls[0].arguments["query"], "Inception imdb rating");
    }

    #[test]
    fn test_parse_completion_text_only() {
        let completion: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Inception is rated 8.8."},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let response = parse_completion(completion).unwrap();
        assert_eq!(response.content, "Inception is rated 8.8.");
        assert!(response.tool_calls.is_none());
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let completion = CompletionResponse { choices: vec![] };
        assert!(parse_completion(completion).is_err());
    }

    #[test]
    fn test_parse_arguments_keeps_raw_text() {
        assert_eq!(
            parse_arguments("Inception"),
            serde_json::Value::String("Inception".to_string())
        );
        assert_eq!(parse_arguments(""), serde_json::json!({}));
    }

    /// Read one HTTP request (headers plus Content-Length body) off the socket
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    /// Answer a single request on a local port; returns the API base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/v1", addr)
    }

    fn hello() -> LlmRequest {
        LlmRequest::new(vec![Message::user("Who directed Heat?")])
    }

    #[tokio::test]
    async fn test_complete_chat_over_http() {
        let base = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Michael Mann."},"finish_reason":"stop"}]}"#,
        )
        .await;

        let response = adapter().with_api_base(base).complete_chat(hello()).await.unwrap();
        assert_eq!(response.content, "Michael Mann.");
        assert!(!response.has_tool_calls());
    }

    #[tokio::test]
    async fn test_error_status_reports_code_and_body() {
        let base = serve_once("429 Too Many Requests", r#"{"error":"quota exhausted"}"#).await;

        let err = adapter()
            .with_api_base(base)
            .complete_chat(hello())
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(
            message.starts_with("Gemini API error 429 Too Many Requests"),
            "{}",
            message
        );
        assert!(message.contains("quota exhausted"), "{}", message);
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_cause() {
        // Bind then release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = adapter()
            .with_api_base(format!("http://{}/v1", addr))
            .complete_chat(hello())
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(
            message.starts_with("Failed to send request to Gemini: "),
            "{}",
            message
        );
        assert!(message.to_lowercase().contains("connect"), "{}", message);
    }
}
