//! 核心类型：错误与领域错误

pub mod error;

pub use error::{AgentError, DomainError};
