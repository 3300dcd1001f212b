//! Porter - 订单履约智能体
//!
//! 入口：初始化日志、加载配置，为各内置场景生成计划并落盘，
//! 再将每份计划在多份业务状态预设上执行（状态绝不跨运行共享）。

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use porter::config::load_config;
use porter::llm::OpenAiClient;
use porter::output::OutputManager;
use porter::plans::{PlanGenerator, PlanStore};
use porter::policy::PolicyExecutor;
use porter::scenarios;
use porter::state::BusinessState;
use porter::tools::build_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let config = load_config(None).context("Failed to load config")?;

    let planner_client = Arc::new(OpenAiClient::new(
        config.llm.base_url.as_deref(),
        &config.llm.planner_model,
        None,
    ));
    let executor_client = Arc::new(OpenAiClient::new(
        config.llm.base_url.as_deref(),
        &config.llm.executor_model,
        None,
    ));

    let store = PlanStore::new(&config.runtime.plans_dir);
    let generator = PlanGenerator::new(planner_client, config.prompts.clone());
    let registry = build_registry();

    // 为每个场景生成计划并落盘
    let mut plans = Vec::new();
    for name in scenarios::ALL {
        tracing::info!(scenario = name, "generating plan");
        let plan = generator
            .generate(scenarios::get(name), &registry)
            .await
            .with_context(|| format!("Plan generation failed for scenario {name}"))?;
        store
            .save(&plan, Some(&format!("{name}_plan.json")))
            .with_context(|| format!("Failed to save plan for scenario {name}"))?;
        plans.push(plan);
    }

    // 每份计划在多份业务状态预设上执行
    let presets: [(&str, fn() -> BusinessState); 3] = [
        ("default", BusinessState::default),
        ("low_inventory", BusinessState::low_inventory),
        ("high_capacity", BusinessState::high_capacity),
    ];
    for plan in &plans {
        for (preset_name, make_state) in presets {
            tracing::info!(preset = preset_name, "executing plan");
            let mut executor =
                PolicyExecutor::new(executor_client.clone(), config.clone(), make_state());
            let mut output = OutputManager::create(&config.runtime.runs_dir)
                .context("Failed to create run log")?;
            if let Some(path) = output.path() {
                tracing::info!(path = %path.display(), "logging run output");
            }
            executor
                .process_scenario(&generator, &store, &plan.scenario, Some(plan.clone()), &mut output)
                .await?;
        }
    }

    Ok(())
}
