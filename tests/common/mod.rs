//! Shared helpers for the integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tool_agent::{Error, Result, Transport, async_trait};

/// Transport that replays scripted replies and records every request body.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<Value>>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, body: Value) -> Self {
        self.replies.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn fail(self, error: Error) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Request bodies seen so far, oldest first.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Value {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(body.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::other("no scripted reply left")))
    }
}

/// Assistant reply with the given content blocks.
pub fn assistant_reply(content: Value) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "stop_reason": "end_turn",
        "content": content
    })
}

/// Assistant reply requesting tools.
pub fn tool_use_reply(content: Value) -> Value {
    let mut reply = assistant_reply(content);
    reply["stop_reason"] = json!("tool_use");
    reply
}

pub fn text_reply(text: &str) -> Value {
    assistant_reply(json!([{"type": "text", "text": text}]))
}

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
