//! 计划生成与持久化
//!
//! Plan 为不可变值对象；PlanGenerator 对规划模型发起单次请求（不带 tools、无重试，
//! 传输失败即致命）；PlanStore 在固定目录下以 JSON 记录落盘，未命名时生成带时间戳的文件名。

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::PromptsSection;
use crate::core::AgentError;
use crate::llm::{ChatClient, ChatMessage};
use crate::tools::FunctionRegistry;

/// 履约计划：一次规划调用的不可变产物
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub scenario: String,
    pub plan_text: String,
    pub model_used: String,
    pub created_at: String,
}

/// 计划生成器：持有规划模型客户端与 prompt 模板
pub struct PlanGenerator {
    client: Arc<dyn ChatClient>,
    prompts: PromptsSection,
}

impl PlanGenerator {
    pub fn new(client: Arc<dyn ChatClient>, prompts: PromptsSection) -> Self {
        Self { client, prompts }
    }

    /// 生成计划：嵌入功能描述清单与场景文本，恰好一次请求
    pub async fn generate(&self, scenario: &str, registry: &FunctionRegistry) -> Result<Plan, AgentError> {
        let prompt = self
            .prompts
            .render_planner(&registry.functions_description(), scenario);

        let response = self
            .client
            .chat(&[ChatMessage::user(prompt)], &[])
            .await
            .map_err(|e| AgentError::Llm(format!("model={}, planning: {}", self.client.model(), e)))?;

        Ok(Plan {
            scenario: scenario.to_string(),
            plan_text: response.content.unwrap_or_default(),
            model_used: self.client.model().to_string(),
            created_at: Utc::now().to_rfc3339(),
        })
    }
}

/// 计划存储：固定目录下的 JSON 记录，load 重建与 save 相等的值
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 落盘；未指定文件名则生成 plan_{时间戳}.json，返回实际路径
    pub fn save(&self, plan: &Plan, filename: Option<&str>) -> Result<PathBuf, AgentError> {
        fs::create_dir_all(&self.dir)?;
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| format!("plan_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));
        let path = self.dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(plan)?)?;
        Ok(path)
    }

    pub fn load(&self, filename: &str) -> Result<Plan, AgentError> {
        let data = fs::read_to_string(self.dir.join(filename))?;
        Ok(serde_json::from_str(&data)?)
    }
}
