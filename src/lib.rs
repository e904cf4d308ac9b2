//! # Tool Agent SDK
//!
//! A Rust SDK for tool-using agents on the Anthropic Messages API.
//!
//! ## Overview
//!
//! The SDK has two tightly coupled halves:
//!
//! - **Schema derivation**: every tool declares its parameters as
//!   [`ParameterDescriptor`]s, and the SDK turns them into the JSON-Schema-like
//!   `input_schema` the model reasons about. Rust types map to JSON types at
//!   compile time through [`ParamType`].
//! - **Conversation orchestration**: the [`Agent`] keeps the message history,
//!   sends it, runs the tools the model asks for, and appends their results so
//!   the exchange can continue.
//!
//! ## Key Features
//!
//! - **Deterministic schemas**: same declarations, byte-identical schema
//! - **Three ways to define tools**: self-describing types, methods of a shared
//!   object, or async closures
//! - **Error isolation**: a failing tool becomes an `is_error` result fed back
//!   to the model, never an aborted session
//! - **Pluggable transport**: HTTP by default, anything implementing
//!   [`Transport`] in tests
//! - **Retry Logic**: opt-in exponential backoff with jitter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tool_agent::{async_trait, param, Agent, Arguments, HandlerTool, ParameterDescriptor,
//!     Provider, Result, SelfDescribingTool};
//! use serde_json::{json, Value};
//!
//! struct ReadFile;
//!
//! #[async_trait]
//! impl SelfDescribingTool for ReadFile {
//!     fn description(&self) -> Option<&str> {
//!         Some("Read a text file")
//!     }
//!
//!     fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
//!         vec![param::<String>("path").describe("Path of the file")]
//!     }
//!
//!     async fn handle(&self, mut args: Arguments) -> Result<Value> {
//!         let path: String = args.take()?;
//!         Ok(json!(tokio::fs::read_to_string(path).await?))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut agent = Agent::configure()
//!         .with_model(Provider::Anthropic, "claude-3-5-sonnet-20241022")
//!         .with_system_message("You are a helpful assistant.")
//!         .with_tools(vec![HandlerTool::shared(ReadFile)])
//!         .create()?;
//!
//!     agent.add_user_message("Summarize notes.txt");
//!     let mut response = agent.send().await?;
//!     while response.has_tool_calls() {
//!         response = agent.continue_with_tool_results().await?;
//!     }
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **schema**: parameter descriptors, type mapping and input schema derivation
//! - **tools**: the `Tool` contract and its self-describing, method-bound and
//!   closure variants
//! - **types**: messages, content blocks, configuration and wire bodies
//! - **conversation**: the in-memory message history
//! - **transport**: the request/response boundary and its HTTP implementation
//! - **agent**: the orchestrator and its tool-use cycle
//! - **config**: provider defaults and environment lookups
//! - **error**: the `Error` enum and `Result<T>` alias
//! - **retry**: exponential backoff retry helpers

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

/// Conversation orchestrator: history bookkeeping and the tool-use cycle.
mod agent;

/// Provider defaults and environment variable lookups.
mod config;

/// Ordered in-memory message history.
mod conversation;

/// Error types and the crate-wide `Result<T>` alias.
mod error;

/// Parameter descriptors and input schema derivation.
mod schema;

/// Tool contract and its implementations.
mod tools;

/// Request/response boundary to the provider.
mod transport;

/// Messages, content blocks, configuration and wire bodies.
mod types;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================

/// Retry utilities with exponential backoff and jitter.
/// Public as a module so callers can wrap `send()` themselves; the agent
/// never retries on its own.
pub mod retry;

// --- Orchestrator ---

pub use agent::{Agent, AgentState};
pub use conversation::ConversationState;

// --- Provider Configuration ---

pub use config::{
    ANTHROPIC_API_VERSION, API_KEY_ENV, BASE_URL_ENV, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    MODEL_ENV, Provider, get_api_key, get_base_url, get_model,
};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Schema Derivation ---

pub use schema::{
    JsonType, NO_DESCRIPTION, ParamType, ParameterDescriptor, camel_to_snake, input_schema, param,
    properties, required_parameters, short_type_name,
};

// --- Tool System ---

pub use tools::{
    Arguments, FnTool, HandlerTool, Method, MethodHandler, MethodTool, SelfDescribingTool, Tool,
    ToolBuilder, ToolSet, method_tools, stringify_result, tool,
};

// --- Transport ---

pub use transport::{HttpTransport, Transport};

// --- Core Types ---

pub use types::{
    AgentOptions, AgentOptionsBuilder, AgentResponse, ContentBlock, Message, MessageContent,
    MessageRole, MessagesRequest, MessagesResponse, ResponseBlock, TextBlock, ToolDefinition,
    ToolResultBlock, ToolUseBlock, normalize_tool_input,
};

/// Re-exported so tool implementations need no direct `async-trait` dependency.
pub use async_trait::async_trait;

// ============================================================================
// CONVENIENCE PRELUDE
// ============================================================================

/// The types most tool and agent code needs.
/// Import with `use tool_agent::prelude::*;`.
pub mod prelude {
    pub use crate::{
        Agent, AgentOptions, AgentResponse, Arguments, ContentBlock, Error, HandlerTool, Message,
        Method, ParameterDescriptor, Provider, Result, SelfDescribingTool, Tool, ToolSet,
        async_trait, method_tools, param, tool,
    };
}
