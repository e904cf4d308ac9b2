//! Core types for the tool agent SDK
//!
//! Conversation content ([`Message`], [`ContentBlock`]), agent configuration
//! ([`AgentOptions`]), the per-cycle [`AgentResponse`], and the Messages API
//! wire request/response bodies.

use crate::agent::Agent;
use crate::config::{self, Provider};
use crate::tools::Tool;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Options for configuring an agent
#[derive(Clone)]
pub struct AgentOptions {
    /// Provider whose wire format and endpoint are used
    pub provider: Provider,

    /// Model id (e.g., "claude-3-5-sonnet-20241022")
    pub model: String,

    /// Maximum tokens the model may generate per response
    pub max_tokens: u32,

    /// System instruction, sent as the top-level `system` field
    pub system_prompt: Option<String>,

    /// Credential override; when `None` the agent reads `ANTHROPIC_API_KEY`
    pub api_key: Option<String>,

    /// Messages API base URL (the agent posts to `{base_url}/messages`)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Tools available to the model
    pub tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for AgentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentOptions")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            provider: Provider::Anthropic,
            model: config::DEFAULT_MODEL.to_string(),
            max_tokens: config::DEFAULT_MAX_TOKENS,
            system_prompt: None,
            api_key: None,
            base_url: Provider::Anthropic.default_url().to_string(),
            timeout: 60,
            tools: Vec::new(),
        }
    }
}

impl AgentOptions {
    /// Create a new builder for AgentOptions
    pub fn builder() -> AgentOptionsBuilder {
        AgentOptionsBuilder::default()
    }
}

/// Builder for AgentOptions
#[derive(Default)]
pub struct AgentOptionsBuilder {
    provider: Option<Provider>,
    model: Option<String>,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<u64>,
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for AgentOptionsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentOptionsBuilder")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("tools", &format!("{} tools", self.tools.len()))
            .finish()
    }
}

impl AgentOptionsBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set provider and model together.
    pub fn with_model(self, provider: Provider, model: impl Into<String>) -> Self {
        self.provider(provider).model(model)
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Alias of [`system_prompt`](Self::system_prompt).
    pub fn with_system_message(self, message: impl Into<String>) -> Self {
        self.system_prompt(message)
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Register already-shared tools (e.g. the output of [`method_tools`](crate::method_tools)).
    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Alias of [`tools`](Self::tools).
    pub fn with_tools(self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools(tools)
    }

    pub fn build(self) -> crate::Result<AgentOptions> {
        let provider = self.provider.unwrap_or_default();
        let model = self
            .model
            .unwrap_or_else(|| config::DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(crate::Error::config("model must not be empty"));
        }

        let max_tokens = self.max_tokens.unwrap_or(config::DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(crate::Error::config("max_tokens must be greater than zero"));
        }

        Ok(AgentOptions {
            provider,
            model,
            max_tokens,
            system_prompt: self.system_prompt.filter(|s| !s.is_empty()),
            api_key: self.api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| provider.default_url().to_string()),
            timeout: self.timeout.unwrap_or(60),
            tools: self.tools,
        })
    }

    /// Build the options and construct an [`Agent`] with the HTTP transport.
    pub fn create(self) -> crate::Result<Agent> {
        Agent::new(self.build()?)
    }
}

/// Message role in the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Content block types that can appear in messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(TextBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
}

/// Text content block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Tool invocation requested by the model.
///
/// `input` always serializes as a JSON object: an absent, null, or empty
/// input goes out as `{}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    #[serde(default, serialize_with = "serialize_tool_input")]
    pub input: Value,
}

impl ToolUseBlock {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input: normalize_tool_input(input),
        }
    }

    /// Same block with `input` normalized to an object.
    pub fn normalized(mut self) -> Self {
        self.input = normalize_tool_input(self.input);
        self
    }
}

/// Normalize a tool-use input so it is never null or an empty array.
///
/// Non-empty arrays and scalars are left as they are.
pub fn normalize_tool_input(input: Value) -> Value {
    match input {
        Value::Null => Value::Object(Map::new()),
        Value::Array(items) if items.is_empty() => Value::Object(Map::new()),
        other => other,
    }
}

fn serialize_tool_input<S>(input: &Value, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match input {
        Value::Null => Map::new().serialize(serializer),
        Value::Array(items) if items.is_empty() => Map::new().serialize(serializer),
        other => other.serialize(serializer),
    }
}

/// Result of executing one tool, echoed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResultBlock {
    pub fn new(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error,
        }
    }

    pub fn success(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(tool_use_id, content, false)
    }

    /// Failed result; content is `"Error: " + message`.
    pub fn error(tool_use_id: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self::new(tool_use_id, format!("Error: {}", message.as_ref()), true)
    }
}

/// Message content: a plain string or an ordered list of blocks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Concatenated text of all text content, joined with newlines.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text(t) => Some(t.text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Blocks of this content (empty for plain text).
    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Blocks(blocks) => blocks,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        MessageContent::Blocks(blocks)
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text.into())
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text.into())
    }

    /// Create a user message with custom content blocks
    pub fn user_with_blocks(content: Vec<ContentBlock>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// What one `send()` produced.
///
/// `tool_calls` lists every tool invocation the model requested, in order.
/// `tool_results` lists the results of the calls that resolved to a
/// registered tool; calls naming an unknown tool produce no result, so the
/// two lists are index-aligned only while every name resolves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub role: Option<String>,
    pub stop_reason: Option<String>,
    /// Text blocks of the reply joined with newlines
    pub content: String,
    pub tool_calls: Vec<ToolUseBlock>,
    pub tool_results: Vec<ToolResultBlock>,
}

impl AgentResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// Result produced for the given tool use id, if any.
    pub fn result_for(&self, tool_use_id: &str) -> Option<&ToolResultBlock> {
        self.tool_results
            .iter()
            .find(|r| r.tool_use_id == tool_use_id)
    }
}

/// Tool descriptor as sent in the request's `tools` array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Messages API request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Messages API response body (fields the agent consumes)
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
}

/// Content block in a response; block types the agent does not handle are kept
/// as `Unsupported` and ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text(TextBlock),
    ToolUse(ToolUseBlock),
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_options_builder() {
        let options = AgentOptions::builder()
            .with_model(Provider::Anthropic, "claude-3-haiku-20240307")
            .system_prompt("Test prompt")
            .api_key("test-key")
            .base_url("http://localhost:8080/v1")
            .max_tokens(1000)
            .timeout(30)
            .build()
            .unwrap();

        assert_eq!(options.provider, Provider::Anthropic);
        assert_eq!(options.model, "claude-3-haiku-20240307");
        assert_eq!(options.system_prompt.as_deref(), Some("Test prompt"));
        assert_eq!(options.api_key.as_deref(), Some("test-key"));
        assert_eq!(options.base_url, "http://localhost:8080/v1");
        assert_eq!(options.max_tokens, 1000);
        assert_eq!(options.timeout, 30);
    }

    #[test]
    fn test_agent_options_builder_defaults() {
        let options = AgentOptions::builder().build().unwrap();

        assert_eq!(options.provider, Provider::Anthropic);
        assert_eq!(options.model, "claude-3-5-sonnet-20241022");
        assert_eq!(options.max_tokens, 4096);
        assert_eq!(options.system_prompt, None);
        assert_eq!(options.api_key, None);
        assert_eq!(options.base_url, "https://api.anthropic.com/v1");
        assert_eq!(options.timeout, 60);
        assert!(options.tools.is_empty());
    }

    #[test]
    fn test_agent_options_builder_rejects_invalid() {
        assert!(AgentOptions::builder().model("  ").build().is_err());
        assert!(AgentOptions::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn test_empty_system_prompt_is_dropped() {
        let options = AgentOptions::builder().system_prompt("").build().unwrap();
        assert_eq!(options.system_prompt, None);
    }

    #[test]
    fn test_debug_masks_api_key() {
        let options = AgentOptions::builder().api_key("sk-secret").build().unwrap();
        let debug = format!("{:?}", options);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_message_user_is_plain_string_on_wire() {
        let msg = Message::user("Hello");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "Hello"})
        );
    }

    #[test]
    fn test_message_role_serialization() {
        assert_eq!(
            serde_json::to_string(&MessageRole::User).unwrap(),
            "\"user\""
        );
        assert_eq!(
            serde_json::to_string(&MessageRole::System).unwrap(),
            "\"system\""
        );
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_tool_use_input_serializes_as_object() {
        for input in [Value::Null, json!([]), json!({})] {
            let block = ContentBlock::ToolUse(ToolUseBlock {
                id: "toolu_1".into(),
                name: "list".into(),
                input,
            });
            let json = serde_json::to_string(&block).unwrap();
            assert!(json.contains("\"input\":{}"), "got {json}");
        }
    }

    #[test]
    fn test_tool_use_new_normalizes() {
        let block = ToolUseBlock::new("toolu_1", "list", Value::Null);
        assert_eq!(block.input, json!({}));

        let block = ToolUseBlock::new("toolu_1", "list", json!({"a": 1}));
        assert_eq!(block.input, json!({"a": 1}));
    }

    #[test]
    fn test_tool_use_missing_input_deserializes() {
        let block: ToolUseBlock =
            serde_json::from_value(json!({"id": "toolu_1", "name": "list"})).unwrap();
        assert_eq!(block.normalized().input, json!({}));
    }

    #[test]
    fn test_tool_result_block_wire_shape() {
        let block = ContentBlock::ToolResult(ToolResultBlock::error("toolu_1", "boom"));
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "tool_result",
                "tool_use_id": "toolu_1",
                "content": "Error: boom",
                "is_error": true
            })
        );
    }

    #[test]
    fn test_message_content_text_joins_blocks() {
        let content = MessageContent::Blocks(vec![
            ContentBlock::Text(TextBlock::new("one")),
            ContentBlock::ToolUse(ToolUseBlock::new("t", "n", json!({}))),
            ContentBlock::Text(TextBlock::new("two")),
        ]);
        assert_eq!(content.text(), "one\ntwo");
        assert_eq!(content.blocks().len(), 3);
    }

    #[test]
    fn test_request_omits_empty_optionals() {
        let request = MessagesRequest {
            model: "m".into(),
            max_tokens: 10,
            messages: vec![Message::user("hi")],
            system: None,
            tools: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_response_deserialization_skips_unknown_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "model": "claude-3-5-sonnet-20241022",
            "role": "assistant",
            "stop_reason": "tool_use",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_1", "name": "read_file", "input": {"path": "a.txt"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.id.as_deref(), Some("msg_1"));
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(response.content.len(), 3);
        assert!(matches!(response.content[0], ResponseBlock::Unsupported));
        assert!(matches!(response.content[2], ResponseBlock::ToolUse(_)));
    }
}
