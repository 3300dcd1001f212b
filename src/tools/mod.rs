//! 工具箱：声明式函数注册表与订单履约业务函数

pub mod business;
pub mod registry;

pub use business::{build_registry, COMPLETION_FUNCTION};
pub use registry::{BusinessFn, DispatchOutcome, FunctionRegistry, FunctionSpec, JsonType, ParamSpec};
