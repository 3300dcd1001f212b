//! Porter - Rust 订单履约智能体
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）与 prompt 模板
//! - **core**: 错误类型（致命 AgentError 与可恢复 DomainError）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Scripted）
//! - **output**: 事件格式化与控制台 + 文件输出
//! - **plans**: 计划值对象、生成与 JSON 持久化
//! - **policy**: 策略执行循环（多轮 tool-calling 状态机）与运行事件
//! - **scenarios**: 内置场景文本
//! - **state**: 业务状态（库存、订单、供应商、仓库容量）
//! - **tools**: 函数注册表（声明式参数 Schema、ToolSpec 生成、按名派发）

pub mod config;
pub mod core;
pub mod llm;
pub mod output;
pub mod plans;
pub mod policy;
pub mod scenarios;
pub mod state;
pub mod tools;
