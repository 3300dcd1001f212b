//! Scripted LLM 客户端（用于测试，无需 API）
//!
//! 按预置顺序逐轮吐出 ChatResponse；脚本耗尽后再请求即返回错误，
//! 便于断言循环恰好在预期轮次终止。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{ChatClient, ChatMessage, ChatResponse};

/// Scripted 客户端：每次 chat 弹出下一条预置响应
pub struct ScriptedClient {
    turns: Mutex<VecDeque<ChatResponse>>,
    model: String,
}

impl ScriptedClient {
    pub fn new(turns: Vec<ChatResponse>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            model: "scripted".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 剩余未消费的脚本轮数
    pub fn remaining(&self) -> usize {
        self.turns.lock().expect("script lock poisoned").len()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _messages: &[ChatMessage], _tools: &[Value]) -> Result<ChatResponse, String> {
        self.turns
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .ok_or_else(|| "script exhausted: no response left for this turn".to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
