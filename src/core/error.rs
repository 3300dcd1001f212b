//! 错误类型
//!
//! 两层错误：AgentError 为致命错误（传输、配置、持久化 IO），沿调用链用 `?` 上抛终止运行；
//! DomainError 为业务函数内部的可恢复错误，最终以 error payload 回馈给模型，绝不中断循环。

use thiserror::Error;

/// 运行过程中的致命错误（模型调用失败不做自动重试，直接终止本次运行）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 模型请求失败：消息中携带模型名与轮次，便于不重试即可定位
    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 硬性轮次上限：模型既不发收尾信号也不停止发 tool_calls 时的安全网
    #[error("Turn limit reached after {0} turns without completion")]
    TurnLimitReached(usize),
}

/// 业务函数的领域错误：只携带可直接回馈给模型的消息文本
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DomainError(pub String);

impl DomainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
