//! LLM 客户端层：抽象 trait、OpenAI 兼容实现与测试用 Scripted 实现

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::ScriptedClient;
pub use openai::OpenAiClient;
pub use traits::{ChatClient, ChatMessage, ChatResponse, Role, ToolCallRequest};
