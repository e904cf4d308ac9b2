//! Interactive Chat Example
//!
//! A terminal chat session with a `read_file` tool. Type "exit" to quit and
//! "clear" to reset the conversation.
//!
//! Requires `ANTHROPIC_API_KEY`. Set `RUST_LOG=tool_agent=debug` to see the
//! request/response cycle.

use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tool_agent::{
    Agent, AgentResponse, Arguments, Error, HandlerTool, ParameterDescriptor, Provider,
    SelfDescribingTool, async_trait, get_api_key, param,
};

const MAX_OUTPUT: usize = 500;

struct ReadFile;

#[async_trait]
impl SelfDescribingTool for ReadFile {
    fn description(&self) -> Option<&str> {
        Some("Read the contents of a file at the given path")
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        vec![
            param::<String>("path")
                .describe(r#"The path to the file to read (e.g., "Cargo.toml", "README.md")"#),
        ]
    }

    async fn handle(&self, mut args: Arguments) -> tool_agent::Result<Value> {
        let path: String = args.take()?;
        if !Path::new(&path).exists() {
            return Err(Error::tool(format!("File not found: {}", path)));
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| Error::tool(format!("File is not readable: {}", path)))?;
        Ok(Value::String(contents))
    }
}

fn truncate(output: &str) -> String {
    match output.char_indices().nth(MAX_OUTPUT) {
        Some((end, _)) => format!("{}... (truncated)", &output[..end]),
        None => output.to_string(),
    }
}

fn print_tool_results(response: &AgentResponse) {
    println!();
    println!("🔧 Using tools...");
    for result in &response.tool_results {
        let name = response
            .tool_calls
            .iter()
            .find(|call| call.id == result.tool_use_id)
            .map_or("?", |call| call.name.as_str());
        println!("Tool: {}", name);
        if result.is_error {
            println!("❌ {}", result.content);
        } else {
            println!("✅ Result: {}", truncate(&result.content));
        }
    }
}

async fn process_message(agent: &mut Agent, prompt: &str) -> tool_agent::Result<()> {
    agent.add_user_message(prompt);

    println!();
    println!("Assistant:");
    let response = agent.send().await?;
    if !response.text().is_empty() {
        println!("{}", response.text());
    }

    if response.has_tool_calls() {
        print_tool_results(&response);

        println!();
        println!("⏳ Continuing with tool results...");
        let continued = agent.continue_with_tool_results().await?;
        if !continued.text().is_empty() {
            println!();
            println!("Assistant (continued):");
            println!("{}", continued.text());
        }
    }

    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    if get_api_key().is_none() {
        eprintln!("💡 Set ANTHROPIC_API_KEY before starting the chat.");
    }

    let mut agent = Agent::configure()
        .with_model(Provider::Anthropic, "claude-3-5-sonnet-20241022")
        .with_system_message("You are a helpful assistant that can read files and answer questions.")
        .with_tools(vec![HandlerTool::shared(ReadFile)])
        .create()
        .context("failed to create agent")?;

    println!("🔮 Tool Agent");
    println!("Type \"exit\" to quit, \"clear\" to reset conversation");
    let names: Vec<_> = agent.tools().iter().map(|t| t.name().to_string()).collect();
    println!("Loaded tools: {}", names.join(", "));
    println!("{}", "─".repeat(48));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        match prompt.to_lowercase().as_str() {
            "exit" => {
                println!("👋 Goodbye!");
                break;
            }
            "clear" => {
                agent.clear_messages();
                println!("🗑️  Conversation cleared");
                continue;
            }
            _ => {}
        }

        if let Err(e) = process_message(&mut agent, prompt).await {
            println!("❌ Error: {}", e);
            if matches!(e, Error::Auth(_)) {
                println!("💡 Make sure ANTHROPIC_API_KEY is set");
            }
            println!();
        }
    }

    Ok(())
}
