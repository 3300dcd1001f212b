//! 函数注册表
//!
//! 每个业务函数注册时携带显式的参数描述（声明式 Schema，不做运行期反射或文档解析），
//! 注册表据此生成 function calling 的 ToolSpec 列表与规划 prompt 的功能描述清单，
//! 并按名派发调用：解析参数、查找处理器、捕获领域错误，折叠为带标签的 DispatchOutcome。

use serde_json::{json, Map, Value};

use crate::core::DomainError;
use crate::state::BusinessState;

/// JSON Schema 基础类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
        }
    }
}

/// 单个参数的声明式描述
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    json_type: JsonType,
    description: Option<String>,
    enum_values: Option<Vec<String>>,
    required: bool,
}

impl ParamSpec {
    /// 无默认值的必填参数
    pub fn required(name: &str, json_type: JsonType) -> Self {
        Self {
            name: name.to_string(),
            json_type,
            description: None,
            enum_values: None,
            required: true,
        }
    }

    /// 有默认值的可选参数
    pub fn optional(name: &str, json_type: JsonType) -> Self {
        Self {
            required: false,
            ..Self::required(name, json_type)
        }
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// 允许的取值集合，生成 enum 约束；注册表不校验取值与领域常量的一致性
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 未显式给出描述时的兜底文案：参数名下划线转空格
    fn effective_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("The {}.", self.name.replace('_', " ")))
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String(self.json_type.as_str().to_string()));
        schema.insert("description".to_string(), Value::String(self.effective_description()));
        if let Some(values) = &self.enum_values {
            schema.insert(
                "enum".to_string(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(schema)
    }
}

/// 函数的声明式描述：唯一名称、一行说明、按声明顺序排列的参数
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
}

impl FunctionSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// 组装 wire 层 ToolSpec：{type: function, function: {name, description, parameters}}
    pub fn tool_spec(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.params {
            properties.insert(p.name.clone(), p.schema());
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                }
            }
        })
    }
}

/// 业务函数签名：借用可变状态与已解析的参数对象
pub type BusinessFn = fn(&mut BusinessState, &Map<String, Value>) -> Result<Value, DomainError>;

/// 派发结果：成功 / 领域错误 / 未注册函数 / 参数解析失败。
/// 三类失败全部本地恢复，以 error payload 回馈模型，不中断运行。
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Success(Value),
    Domain(String),
    UnknownFunction(String),
    InvalidArguments(String),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success(_))
    }

    /// 序列化为回馈给模型的 tool result 文本；失败类统一为 {"error": ...}，
    /// 成功值序列化失败时退化为字符串强转
    pub fn into_payload(self) -> String {
        match self {
            DispatchOutcome::Success(value) => {
                serde_json::to_string(&value).unwrap_or_else(|_| value.to_string())
            }
            DispatchOutcome::Domain(message)
            | DispatchOutcome::UnknownFunction(message)
            | DispatchOutcome::InvalidArguments(message) => {
                json!({ "error": message }).to_string()
            }
        }
    }
}

/// 函数注册表：按注册顺序保存 (spec, handler)，顺序决定 ToolSpec 与描述清单的排列
#[derive(Default)]
pub struct FunctionRegistry {
    entries: Vec<(FunctionSpec, BusinessFn)>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: FunctionSpec, handler: BusinessFn) {
        self.entries.push((spec, handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(spec, _)| spec.name() == name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.entries.iter().map(|(spec, _)| spec)
    }

    /// ToolSpec 列表（注册顺序），随每轮执行请求下发
    pub fn tool_specs(&self) -> Vec<Value> {
        self.entries.iter().map(|(spec, _)| spec.tool_spec()).collect()
    }

    /// 规划 prompt 的功能描述清单，每行 "    - name(): 一行说明"
    pub fn functions_description(&self) -> String {
        self.entries
            .iter()
            .map(|(spec, _)| format!("    - {}(): {}", spec.name(), spec.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 解析参数并派发；解析失败、名称未注册、领域错误均折叠为 DispatchOutcome
    pub fn dispatch(&self, name: &str, raw_args: &str, state: &mut BusinessState) -> DispatchOutcome {
        let parsed: Value = match serde_json::from_str(raw_args) {
            Ok(value) => value,
            Err(e) => return DispatchOutcome::InvalidArguments(format!("malformed arguments: {e}")),
        };
        let args = match parsed {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return DispatchOutcome::InvalidArguments(format!(
                    "arguments must be a JSON object, got: {other}"
                ))
            }
        };

        let handler = match self.entries.iter().find(|(spec, _)| spec.name() == name) {
            Some((_, handler)) => *handler,
            None => {
                return DispatchOutcome::UnknownFunction(format!("function {name} not implemented"))
            }
        };

        match handler(state, &args) {
            Ok(value) => DispatchOutcome::Success(value),
            Err(DomainError(message)) => DispatchOutcome::Domain(message),
        }
    }
}
