//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `PORTER__*` 覆盖
//! （双下划线表示嵌套，如 `PORTER__LLM__EXECUTOR_MODEL=gpt-4o`）。
//! 规划与执行模型各自独立配置；prompt 模板接受命名占位符替换。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::AgentError;

const DEFAULT_PLANNER_PROMPT: &str = r#"
You are an order fulfillment assistant. Your task is to create a detailed plan for processing orders,
managing inventory, and coordinating with suppliers.

The available functions and their descriptions are:
{functions_description}

Please create a detailed plan for the following scenario:
{scenario}

Format your plan with numbered steps and lettered sub-steps.
*** Ensure that 'instructions_complete' is the last step. Don't run indefinitely, even if an error occurs. ***
"#;

const DEFAULT_EXECUTOR_PROMPT: &str = r#"
You are a policy execution assistant responsible for implementing the given plan. Do not analyze the plan, just execute it.
Follow each step carefully, calling the appropriate provided functions to complete the tasks.
Explain and justify each step you take.

PLAN:
{plan}
"#;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub prompts: PromptsSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// [llm] 段：规划与执行模型各自独立，base_url 用于 OpenAI 兼容端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub planner_model: String,
    pub executor_model: String,
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            planner_model: "o1-mini".to_string(),
            executor_model: "gpt-4o-mini".to_string(),
            base_url: None,
        }
    }
}

/// [prompts] 段：规划与执行的 prompt 模板，命名占位符见 render_* 方法
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsSection {
    pub planner: String,
    pub executor: String,
}

impl Default for PromptsSection {
    fn default() -> Self {
        Self {
            planner: DEFAULT_PLANNER_PROMPT.to_string(),
            executor: DEFAULT_EXECUTOR_PROMPT.to_string(),
        }
    }
}

impl PromptsSection {
    /// 渲染规划 prompt：{functions_description} 与 {scenario}
    pub fn render_planner(&self, functions_description: &str, scenario: &str) -> String {
        self.planner
            .replace("{functions_description}", functions_description)
            .replace("{scenario}", scenario)
    }

    /// 渲染执行 system prompt：{plan}
    pub fn render_executor(&self, plan: &str) -> String {
        self.executor.replace("{plan}", plan)
    }
}

/// [runtime] 段：轮次上限与输出目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// 单次执行最大轮次（安全网，防止模型行为异常导致的无界循环）
    pub max_turns: usize,
    pub plans_dir: PathBuf,
    pub runs_dir: PathBuf,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            max_turns: 20,
            plans_dir: PathBuf::from("run_results/plans"),
            runs_dir: PathBuf::from("run_results/fulfillment"),
        }
    }
}

/// 从 config 目录加载配置，环境变量 PORTER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 PORTER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, AgentError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("PORTER")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| AgentError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_are_independent() {
        let config = AppConfig::default();
        assert_eq!(config.llm.planner_model, "o1-mini");
        assert_eq!(config.llm.executor_model, "gpt-4o-mini");
        assert_eq!(config.runtime.max_turns, 20);
    }

    #[test]
    fn test_prompt_placeholder_substitution() {
        let prompts = PromptsSection::default();

        let planner = prompts.render_planner("    - check_inventory(): Check.", "Ship everything.");
        assert!(planner.contains("    - check_inventory(): Check."));
        assert!(planner.contains("Ship everything."));
        assert!(!planner.contains("{functions_description}"));
        assert!(!planner.contains("{scenario}"));

        let executor = prompts.render_executor("1. Do the thing");
        assert!(executor.contains("PLAN:\n1. Do the thing"));
        assert!(!executor.contains("{plan}"));
    }
}
