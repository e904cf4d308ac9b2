//! Calculator with Tools Example
//!
//! One object exposing several methods as tools. Each described method becomes
//! a tool named `calculator_<method>`; the undescribed `reset` stays private.

use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tool_agent::{Agent, Error, Method, Provider, ToolSet, method_tools, param};

/// Calculator that counts how many operations it performed.
#[derive(Default)]
struct Calculator {
    operations: AtomicU64,
}

impl Calculator {
    fn record(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }
}

fn binary(
    name: &'static str,
    description: &'static str,
    op: fn(f64, f64) -> tool_agent::Result<f64>,
) -> Method<Calculator> {
    Method::new(name, move |calc: Arc<Calculator>, mut args| async move {
        let a: f64 = args.take()?;
        let b: f64 = args.take()?;
        calc.record();
        Ok(json!({"result": op(a, b)?}))
    })
    .describe(description)
    .param(param::<f64>("a").describe("First operand"))
    .param(param::<f64>("b").describe("Second operand"))
}

impl ToolSet for Calculator {
    fn methods() -> Vec<Method<Self>> {
        vec![
            binary("add", "Add two numbers", |a, b| Ok(a + b)),
            binary("subtract", "Subtract b from a", |a, b| Ok(a - b)),
            binary("multiply", "Multiply two numbers", |a, b| Ok(a * b)),
            binary("divide", "Divide a by b", |a, b| {
                if b == 0.0 {
                    Err(Error::tool("Cannot divide by zero"))
                } else {
                    Ok(a / b)
                }
            }),
            Method::new("reset", |calc: Arc<Calculator>, _args| async move {
                calc.operations.store(0, Ordering::Relaxed);
                Ok(json!(null))
            }),
        ]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let calculator = Arc::new(Calculator::default());
    let tools = method_tools(Arc::clone(&calculator));

    let mut agent = Agent::configure()
        .with_model(Provider::Anthropic, "claude-3-5-sonnet-20241022")
        .with_system_message(
            "You are a helpful calculator assistant. \
             Use the provided tools to perform calculations. \
             Always show your work and explain the result.",
        )
        .max_tokens(1024)
        .with_tools(tools)
        .create()?;

    let queries = [
        "What is 25 plus 17?",
        "Calculate 144 divided by 12",
        "What's 7 times 8, then add 5?",
    ];

    println!("{}", "=".repeat(70));
    println!("CALCULATOR TOOLS EXAMPLE");
    println!("{}", "=".repeat(70));

    for query in queries {
        println!();
        println!("User: {}", query);
        println!("{}", "-".repeat(50));

        agent.clear();
        agent.add_user_message(query);

        let mut response = agent.send().await?;
        loop {
            if !response.text().trim().is_empty() {
                println!("Assistant: {}", response.text());
            }
            if !response.has_tool_calls() {
                break;
            }
            for (call, result) in response.tool_calls.iter().zip(&response.tool_results) {
                println!("🔧 {}({}) -> {}", call.name, call.input, result.content);
            }
            response = agent.continue_with_tool_results().await?;
        }
    }

    println!();
    println!("{}", "=".repeat(70));
    println!(
        "Example complete! {} operations performed.",
        calculator.operations.load(Ordering::Relaxed)
    );

    Ok(())
}
