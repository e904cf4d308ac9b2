//! Tool-use cycle tests
//!
//! Drive the agent against a scripted transport and check the history and
//! results each cycle produces.

mod common;

use common::{ScriptedTransport, init_logging, text_reply, tool_use_reply};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tool_agent::{
    Agent, AgentOptions, Arguments, ContentBlock, Error, HandlerTool, MessageRole,
    ParameterDescriptor, Result, SelfDescribingTool, Tool, async_trait, param, tool,
};

struct ReadFile;

#[async_trait]
impl SelfDescribingTool for ReadFile {
    fn description(&self) -> Option<&str> {
        Some("Read the contents of a text file")
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        vec![param::<String>("path").describe("Path of the file to read")]
    }

    async fn handle(&self, mut args: Arguments) -> Result<Value> {
        let path: String = args.take()?;
        let contents = tokio::fs::read_to_string(&path).await?;
        Ok(Value::String(contents))
    }
}

fn agent_with(transport: ScriptedTransport, tools: Vec<Arc<dyn Tool>>) -> Agent {
    init_logging();
    let options = AgentOptions::builder()
        .system_prompt("You are a helpful assistant.")
        .tools(tools)
        .build()
        .unwrap();
    Agent::with_transport(options, transport)
}

fn read_file_call(id: &str, path: &str) -> Value {
    json!({"type": "tool_use", "id": id, "name": "read_file", "input": {"path": path}})
}

/// Test: existing file
///
/// GIVEN a registered read_file tool and an existing file
/// WHEN the model requests read_file for it
/// THEN one successful tool_result with the file contents is appended
#[tokio::test]
async fn test_read_file_success_appends_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "hello from a.txt").unwrap();
    let path = path.to_string_lossy().to_string();

    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "text", "text": "Let me read that."},
        read_file_call("toolu_01", &path)
    ])));
    let mut agent = agent_with(transport, vec![HandlerTool::shared(ReadFile)]);

    agent.add_user_message("What is in a.txt?");
    let response = agent.send().await.unwrap();

    assert_eq!(response.text(), "Let me read that.");
    assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_results.len(), 1);

    let result = &response.tool_results[0];
    assert_eq!(result.tool_use_id, "toolu_01");
    assert_eq!(result.content, "hello from a.txt");
    assert!(!result.is_error);

    let messages = agent.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content.blocks().len(), 2);
    assert_eq!(messages[2].role, MessageRole::User);
    match &messages[2].content.blocks()[0] {
        ContentBlock::ToolResult(block) => {
            assert_eq!(block.tool_use_id, "toolu_01");
            assert_eq!(block.content, "hello from a.txt");
        }
        other => panic!("Expected tool result, got {:?}", other),
    }
}

/// Test: missing file
///
/// GIVEN the read_file tool
/// WHEN the requested file does not exist
/// THEN the result is an error whose content starts with "Error: "
#[tokio::test]
async fn test_read_file_missing_is_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt").to_string_lossy().to_string();

    let transport =
        ScriptedTransport::new().reply(tool_use_reply(json!([read_file_call("toolu_02", &path)])));
    let mut agent = agent_with(transport, vec![HandlerTool::shared(ReadFile)]);

    agent.add_user_message("Read missing.txt");
    let response = agent.send().await.unwrap();

    assert_eq!(response.tool_results.len(), 1);
    let result = &response.tool_results[0];
    assert!(result.is_error);
    assert!(result.content.starts_with("Error: "));
    assert_eq!(agent.messages().len(), 3);
}

/// Test: unresolvable tool name
///
/// GIVEN no tool named "delete_everything"
/// WHEN the model requests it
/// THEN no result is produced and no user turn is appended
#[tokio::test]
async fn test_unknown_tool_is_skipped() {
    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "tool_use", "id": "toolu_03", "name": "delete_everything", "input": {}}
    ])));
    let mut agent = agent_with(transport, vec![HandlerTool::shared(ReadFile)]);

    agent.add_user_message("Clean up");
    let response = agent.send().await.unwrap();

    assert!(response.has_tool_calls());
    assert!(response.tool_results.is_empty());

    let messages = agent.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, MessageRole::Assistant);
}

/// Test: missing required argument
///
/// GIVEN read_file requested without a path
/// THEN binding fails and becomes an error result naming the parameter
#[tokio::test]
async fn test_missing_argument_becomes_error_result() {
    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "tool_use", "id": "toolu_04", "name": "read_file", "input": {}}
    ])));
    let mut agent = agent_with(transport, vec![HandlerTool::shared(ReadFile)]);

    agent.add_user_message("Read something");
    let response = agent.send().await.unwrap();

    let result = &response.tool_results[0];
    assert!(result.is_error);
    assert_eq!(result.content, "Error: Required parameter 'path' is missing");
}

/// Test: one failing tool does not stop the others
#[tokio::test]
async fn test_failure_is_isolated_and_order_preserved() {
    let failing = tool("explode", "Always fails")
        .build(|_args| async move { Err::<Value, _>(Error::tool("kaboom")) });
    let lookup = tool("lookup", "Structured lookup")
        .param(param::<String>("key"))
        .build(|mut args| async move {
            let key: String = args.take()?;
            Ok(json!({"key": key, "found": true}))
        });

    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "tool_use", "id": "toolu_a", "name": "explode", "input": {}},
        {"type": "tool_use", "id": "toolu_b", "name": "lookup", "input": {"key": "k1"}}
    ])));
    let mut agent = agent_with(transport, vec![Arc::new(failing), Arc::new(lookup)]);

    agent.add_user_message("Do both");
    let response = agent.send().await.unwrap();

    assert_eq!(response.tool_results.len(), 2);
    assert_eq!(response.tool_results[0].tool_use_id, "toolu_a");
    assert!(response.tool_results[0].is_error);
    assert_eq!(response.tool_results[0].content, "Error: kaboom");

    assert_eq!(response.tool_results[1].tool_use_id, "toolu_b");
    assert!(!response.tool_results[1].is_error);
    assert_eq!(
        response.tool_results[1].content,
        r#"{"key":"k1","found":true}"#
    );
}

/// Test: tools run sequentially in request order
#[tokio::test]
async fn test_tools_run_in_request_order() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = counter.clone();
    let ticket = tool("ticket", "Hands out increasing numbers").build(move |_args| {
        let seen = seen.clone();
        async move { Ok(json!(seen.fetch_add(1, Ordering::SeqCst))) }
    });

    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "tool_use", "id": "t1", "name": "ticket", "input": {}},
        {"type": "tool_use", "id": "t2", "name": "ticket", "input": null},
        {"type": "tool_use", "id": "t3", "name": "ticket"}
    ])));
    let mut agent = agent_with(transport, vec![Arc::new(ticket)]);

    agent.add_user_message("Three tickets please");
    let response = agent.send().await.unwrap();

    let contents: Vec<_> = response
        .tool_results
        .iter()
        .map(|r| (r.tool_use_id.as_str(), r.content.as_str()))
        .collect();
    assert_eq!(contents, vec![("t1", "0"), ("t2", "1"), ("t3", "2")]);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

/// Test: duplicate names resolve to the first registered tool
#[tokio::test]
async fn test_duplicate_names_first_match_wins() {
    let first = tool("echo", "First").build(|_args| async move { Ok(json!("first")) });
    let second = tool("echo", "Second").build(|_args| async move { Ok(json!("second")) });

    let transport = ScriptedTransport::new().reply(tool_use_reply(json!([
        {"type": "tool_use", "id": "t1", "name": "echo", "input": {}}
    ])));
    let mut agent = agent_with(transport, vec![Arc::new(first), Arc::new(second)]);

    agent.add_user_message("Echo");
    let response = agent.send().await.unwrap();
    assert_eq!(response.tool_results[0].content, "first");
    assert_eq!(agent.get_tool("echo").unwrap().description(), "First");
}

/// Test: continuing after a tool cycle
///
/// GIVEN a cycle that appended a tool result
/// WHEN continue_with_tool_results is called
/// THEN the request carries the full cycle and the final text comes back
#[tokio::test]
async fn test_continue_with_tool_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "buy milk").unwrap();
    let path = path.to_string_lossy().to_string();

    let transport = ScriptedTransport::new()
        .reply(tool_use_reply(json!([read_file_call("toolu_05", &path)])))
        .reply(text_reply("Your note says: buy milk"));
    let mut agent = agent_with(transport.clone(), vec![HandlerTool::shared(ReadFile)]);

    agent.add_user_message("What do my notes say?");
    let first = agent.send().await.unwrap();
    assert!(first.has_tool_calls());

    let second = agent.continue_with_tool_results().await.unwrap();
    assert!(!second.has_tool_calls());
    assert_eq!(second.text(), "Your note says: buy milk");

    let request = transport.last_request();
    assert_eq!(request["system"], "You are a helpful assistant.");
    let messages = request["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["content"][0]["type"], "tool_use");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"][0]["type"], "tool_result");
    assert_eq!(messages[2]["content"][0]["tool_use_id"], "toolu_05");
    assert_eq!(messages[2]["content"][0]["content"], "buy milk");
    assert_eq!(messages[2]["content"][0]["is_error"], false);

    assert_eq!(agent.messages().len(), 4);
}

/// Test: clear between sends
///
/// GIVEN a completed exchange
/// WHEN clear() is called and a new message is sent
/// THEN only the second exchange remains in the history and on the wire
#[tokio::test]
async fn test_clear_then_send_keeps_only_second_exchange() {
    let transport = ScriptedTransport::new()
        .reply(text_reply("first answer"))
        .reply(text_reply("second answer"));
    let mut agent = agent_with(transport.clone(), vec![]);

    agent.add_user_message("first question");
    agent.send().await.unwrap();
    assert_eq!(agent.messages().len(), 2);

    agent.clear();
    agent.add_user_message("second question");
    let response = agent.send().await.unwrap();
    assert_eq!(response.text(), "second answer");

    let messages = agent.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content.text(), "second question");
    assert_eq!(messages[1].content.text(), "second answer");

    let request = transport.last_request();
    assert_eq!(request["messages"].as_array().unwrap().len(), 1);
    assert_eq!(request["system"], "You are a helpful assistant.");
}

/// Test: transport failure
///
/// GIVEN a provider error
/// THEN send() fails with the raw body, history is unchanged and the
///      session keeps working
#[tokio::test]
async fn test_transport_failure_is_not_fatal_to_session() {
    let raw = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
    let transport = ScriptedTransport::new()
        .fail(Error::api(529, raw))
        .reply(text_reply("back online"));
    let mut agent = agent_with(transport, vec![]);

    agent.add_user_message("hello");
    match agent.send().await {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 529);
            assert_eq!(body, raw);
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(agent.messages().len(), 1);

    let response = agent.send().await.unwrap();
    assert_eq!(response.text(), "back online");
    assert_eq!(agent.messages().len(), 2);
}

/// Test: unsupported response blocks are ignored
#[tokio::test]
async fn test_unsupported_blocks_are_ignored() {
    let transport = ScriptedTransport::new().reply(common::assistant_reply(json!([
        {"type": "thinking", "thinking": "..."},
        {"type": "text", "text": "done"}
    ])));
    let mut agent = agent_with(transport, vec![]);

    agent.add_user_message("hi");
    let response = agent.send().await.unwrap();
    assert_eq!(response.text(), "done");
    assert_eq!(agent.messages()[1].content.blocks().len(), 1);
}
