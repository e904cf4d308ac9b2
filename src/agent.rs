//! # Agent
//!
//! The [`Agent`] owns the configuration, the registered tools and the
//! conversation history of a single chat session, and drives the tool-use
//! cycle:
//!
//! ```text
//! Idle ──send()──▶ AwaitingResponse ──reply──▶ ToolUseCycle ──results──▶ Idle
//!                                      └──── no tool calls ─────────────▶ Idle
//! ```
//!
//! Each [`send`](Agent::send) serializes the history (system instruction as the
//! top-level `system` field, never inside `messages`), hands it to the
//! [`Transport`], and processes the reply:
//!
//! 1. Text blocks are joined with newlines into the reply text.
//! 2. Tool-use inputs are normalized to objects, and the full block sequence is
//!    appended as the assistant turn.
//! 3. Each requested tool runs in request order. Failures become `is_error`
//!    results; unknown tool names are skipped.
//! 4. The results, if any, are appended as one user turn.
//!
//! The caller then decides whether to call
//! [`continue_with_tool_results`](Agent::continue_with_tool_results) so the
//! model can see the results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tool_agent::{Agent, HandlerTool, Provider};
//! # use tool_agent::{async_trait, Arguments, ParameterDescriptor, Result, SelfDescribingTool};
//! # struct ReadFile;
//! # #[async_trait]
//! # impl SelfDescribingTool for ReadFile {
//! #     fn describe_parameters(&self) -> Vec<ParameterDescriptor> { vec![] }
//! #     async fn handle(&self, _args: Arguments) -> Result<serde_json::Value> { Ok(serde_json::Value::Null) }
//! # }
//!
//! # async fn example() -> Result<()> {
//! let mut agent = Agent::configure()
//!     .with_model(Provider::Anthropic, "claude-3-5-sonnet-20241022")
//!     .with_system_message("You are a helpful assistant.")
//!     .with_tools(vec![HandlerTool::shared(ReadFile)])
//!     .create()?;
//!
//! agent.add_user_message("What is in notes.txt?");
//! let mut response = agent.send().await?;
//! while response.has_tool_calls() {
//!     response = agent.continue_with_tool_results().await?;
//! }
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

use crate::conversation::ConversationState;
use crate::tools::{Tool, stringify_result};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    AgentOptions, AgentOptionsBuilder, AgentResponse, ContentBlock, Message, MessageContent,
    MessageRole, MessagesRequest, MessagesResponse, ResponseBlock, TextBlock, ToolResultBlock,
    ToolUseBlock,
};
use crate::{Error, Result};
use std::sync::Arc;

/// Where the agent is in the request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// No request in flight
    #[default]
    Idle,
    /// Request handed to the transport
    AwaitingResponse,
    /// Reply contained tool calls; results are being produced
    ToolUseCycle,
}

/// Conversation orchestrator for one chat session.
pub struct Agent {
    options: AgentOptions,
    conversation: ConversationState,
    transport: Box<dyn Transport>,
    state: AgentState,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("options", &self.options)
            .field("messages", &self.conversation.len())
            .field("state", &self.state)
            .finish()
    }
}

impl Agent {
    /// Create an agent that talks to the provider over HTTP.
    pub fn new(options: AgentOptions) -> Result<Self> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self::with_transport(options, transport))
    }

    /// Create an agent with a custom transport.
    pub fn with_transport(options: AgentOptions, transport: impl Transport + 'static) -> Self {
        Self {
            options,
            conversation: ConversationState::new(),
            transport: Box::new(transport),
            state: AgentState::Idle,
        }
    }

    /// Start the fluent configuration step; finish with
    /// [`create`](AgentOptionsBuilder::create).
    pub fn configure() -> AgentOptionsBuilder {
        AgentOptions::builder()
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> Result<()> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }
        self.options.model = model;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()> {
        if max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than zero"));
        }
        self.options.max_tokens = max_tokens;
        Ok(())
    }

    /// Replace the system instruction; `None` or an empty string removes it.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.options.system_prompt = prompt.filter(|p| !p.is_empty());
    }

    /// Replace the registered tool set.
    pub fn set_tools(&mut self, tools: Vec<Arc<dyn Tool>>) {
        self.options.tools = tools;
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.options.tools
    }

    /// First registered tool named `name`.
    pub fn get_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.options.tools.iter().find(|t| t.name() == name)
    }

    /// Append a message to the history.
    ///
    /// System-role messages are kept in the history but never sent; the
    /// configured system prompt is the only system instruction on the wire.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<MessageContent>) {
        self.conversation.push(Message::new(role, content));
    }

    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.add_message(MessageRole::User, text.into());
    }

    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.add_message(MessageRole::Assistant, text.into());
    }

    pub fn add_system_message(&mut self, text: impl Into<String>) {
        self.add_message(MessageRole::System, text.into());
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Empty the history. Configuration and tools are untouched.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.state = AgentState::Idle;
    }

    /// Alias of [`clear`](Agent::clear).
    pub fn clear_messages(&mut self) {
        self.clear();
    }

    /// Request body for the current history and configuration.
    pub fn build_request(&self) -> MessagesRequest {
        let tools = if self.options.tools.is_empty() {
            None
        } else {
            Some(self.options.tools.iter().map(|t| t.definition()).collect())
        };

        MessagesRequest {
            model: self.options.model.clone(),
            max_tokens: self.options.max_tokens,
            messages: self.conversation.wire_messages(),
            system: self.options.system_prompt.clone(),
            tools,
        }
    }

    /// Send the history to the provider and run any requested tools.
    ///
    /// Transport failures abort this call and leave the history as it was.
    /// Tool failures never do: they are reported to the model as `is_error`
    /// results.
    pub async fn send(&mut self) -> Result<AgentResponse> {
        let request = self.build_request();
        log::debug!(
            "Sending request: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len)
        );
        let body = serde_json::to_value(&request)?;

        self.state = AgentState::AwaitingResponse;
        let reply = match self.transport.send(&body).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Request failed: {}", e);
                self.state = AgentState::Idle;
                return Err(e);
            }
        };

        let parsed: MessagesResponse = match serde_json::from_value(reply) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.state = AgentState::Idle;
                return Err(Error::Json(e));
            }
        };

        let response = self.process_reply(parsed).await;
        self.state = AgentState::Idle;
        Ok(response)
    }

    /// Resubmit the history after a cycle appended tool results.
    ///
    /// Identical to [`send`](Agent::send).
    pub async fn continue_with_tool_results(&mut self) -> Result<AgentResponse> {
        self.send().await
    }

    async fn process_reply(&mut self, reply: MessagesResponse) -> AgentResponse {
        let mut blocks = Vec::with_capacity(reply.content.len());
        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in reply.content {
            match block {
                ResponseBlock::Text(TextBlock { text }) => {
                    texts.push(text.clone());
                    blocks.push(ContentBlock::Text(TextBlock { text }));
                }
                ResponseBlock::ToolUse(tool_use) => {
                    let tool_use = tool_use.normalized();
                    tool_calls.push(tool_use.clone());
                    blocks.push(ContentBlock::ToolUse(tool_use));
                }
                ResponseBlock::Unsupported => {}
            }
        }

        log::debug!(
            "Received reply: stop_reason={:?}, text_blocks={}, tool_calls={}",
            reply.stop_reason,
            texts.len(),
            tool_calls.len()
        );

        if !blocks.is_empty() {
            self.conversation.push(Message::assistant(blocks));
        }

        let tool_results = if tool_calls.is_empty() {
            Vec::new()
        } else {
            self.state = AgentState::ToolUseCycle;
            self.run_tools(&tool_calls).await
        };

        if !tool_results.is_empty() {
            self.conversation.push(Message::user_with_blocks(
                tool_results
                    .iter()
                    .cloned()
                    .map(ContentBlock::ToolResult)
                    .collect(),
            ));
        }

        AgentResponse {
            id: reply.id,
            model: reply.model,
            role: reply.role,
            stop_reason: reply.stop_reason,
            content: texts.join("\n"),
            tool_calls,
            tool_results,
        }
    }

    async fn run_tools(&self, calls: &[ToolUseBlock]) -> Vec<ToolResultBlock> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let Some(tool) = self.get_tool(&call.name) else {
                log::warn!("No registered tool named '{}'; skipping call {}", call.name, call.id);
                continue;
            };

            let result = match tool.execute(&call.input).await {
                Ok(value) => ToolResultBlock::success(&call.id, stringify_result(&value)),
                Err(e) => {
                    log::debug!("Tool '{}' failed: {}", call.name, e);
                    ToolResultBlock::error(&call.id, e.tool_message())
                }
            };
            results.push(result);
        }

        results
    }
}
