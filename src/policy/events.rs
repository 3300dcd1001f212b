//! 运行事件
//!
//! 一次运行产生的可观测事件序列：状态、计划、助手发言、上下文快照、工具调用与结果。
//! 事件是观测侧产物，与模型可见的对话 transcript 相互独立。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Status { message: String },
    Context { message: String },
    Plan { content: String },
    Assistant { content: String },
    ToolCall { function: String, arguments: String },
    ToolResponse { function: String, result: String },
}
