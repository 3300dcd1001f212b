//! 策略执行层：运行事件与多轮 tool-calling 执行状态机

pub mod events;
pub mod executor;

pub use events::Event;
pub use executor::PolicyExecutor;
