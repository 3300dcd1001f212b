//! 策略执行循环
//!
//! 系统的状态机：以计划文本为 system 消息，反复请求执行模型并携带全部 ToolSpec
//! （tool_choice=auto）；每轮按返回顺序单遍处理 tool_calls —— 同轮靠后的调用可能依赖
//! 靠前调用对业务状态的修改，严禁并行或重排。收尾函数出现即终止（不执行），
//! 无 tool_calls 也终止；硬性轮次上限兜底，防止模型行为异常导致的无界循环。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::llm::{ChatClient, ChatMessage};
use crate::output::OutputManager;
use crate::plans::{Plan, PlanGenerator, PlanStore};
use crate::policy::Event;
use crate::state::BusinessState;
use crate::tools::{build_registry, DispatchOutcome, FunctionRegistry, COMPLETION_FUNCTION};

/// 策略执行器：独占一份业务状态，驱动多轮 tool-calling 对话直至终止
pub struct PolicyExecutor {
    client: Arc<dyn ChatClient>,
    config: AppConfig,
    registry: FunctionRegistry,
    state: BusinessState,
    events: Vec<Event>,
}

impl PolicyExecutor {
    pub fn new(client: Arc<dyn ChatClient>, config: AppConfig, state: BusinessState) -> Self {
        Self {
            client,
            config,
            registry: build_registry(),
            state,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &BusinessState {
        &self.state
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    fn emit(&mut self, event: Event, output: &mut OutputManager) {
        output.emit(&event);
        self.events.push(event);
    }

    /// 处理场景：无既有计划则生成并落盘，然后执行；返回本次运行的全部事件
    pub async fn process_scenario(
        &mut self,
        generator: &PlanGenerator,
        store: &PlanStore,
        scenario: &str,
        existing_plan: Option<Plan>,
        output: &mut OutputManager,
    ) -> Result<Vec<Event>, AgentError> {
        let plan = match existing_plan {
            Some(plan) => {
                self.emit(
                    Event::Status {
                        message: format!("Using existing plan generated by {}", plan.model_used),
                    },
                    output,
                );
                plan
            }
            None => {
                self.emit(Event::Status { message: "Generating new plan...".to_string() }, output);
                let plan = generator.generate(scenario, &self.registry).await?;
                store.save(&plan, None)?;
                plan
            }
        };

        self.emit(Event::Plan { content: plan.plan_text.clone() }, output);
        self.emit(Event::Status { message: "Executing plan...".to_string() }, output);

        self.execute_plan(&plan, output).await?;

        self.emit(Event::Status { message: "Processing complete.".to_string() }, output);
        Ok(self.events.clone())
    }

    /// 执行既有计划；终止后返回累计事件列表，此后业务状态不再变化
    pub async fn execute_plan(
        &mut self,
        plan: &Plan,
        output: &mut OutputManager,
    ) -> Result<Vec<Event>, AgentError> {
        let system_prompt = self.config.prompts.render_executor(&plan.plan_text);
        let mut messages = vec![ChatMessage::system(system_prompt)];
        let tools = self.registry.tool_specs();

        // 上下文快照只进观测日志，不进入模型可见的 transcript
        let snapshot = serde_json::to_string_pretty(&self.state)?;
        self.emit(
            Event::Context {
                message: format!("Before the plan is executed, here is the current context:\n{snapshot}"),
            },
            output,
        );

        let max_turns = self.config.runtime.max_turns;
        for turn in 1..=max_turns {
            let response = self
                .client
                .chat(&messages, &tools)
                .await
                .map_err(|e| {
                    AgentError::Llm(format!("model={}, turn={}: {}", self.client.model(), turn, e))
                })?;

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            if let Some(content) = response.content.as_deref() {
                if !content.is_empty() {
                    self.emit(Event::Assistant { content: content.to_string() }, output);
                }
            }

            // 无 tool_calls 即终止
            if response.tool_calls.is_empty() {
                self.emit(
                    Event::Status { message: "Model returned no tool calls, execution finished.".to_string() },
                    output,
                );
                return Ok(self.events.clone());
            }

            // 单遍按返回顺序处理：收尾函数出现即终止，不执行，其后的调用跳过
            for call in &response.tool_calls {
                if call.name == COMPLETION_FUNCTION {
                    self.emit(
                        Event::Status {
                            message: format!("{COMPLETION_FUNCTION} signaled, execution finished."),
                        },
                        output,
                    );
                    return Ok(self.events.clone());
                }

                self.emit(
                    Event::ToolCall {
                        function: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                    output,
                );

                let outcome = self.registry.dispatch(&call.name, &call.arguments, &mut self.state);
                audit_dispatch(&call.name, &call.arguments, &outcome, turn);
                let payload = outcome.into_payload();

                self.emit(
                    Event::ToolResponse {
                        function: call.name.clone(),
                        result: payload.clone(),
                    },
                    output,
                );
                messages.push(ChatMessage::tool(call.id.clone(), payload));
            }
        }

        Err(AgentError::TurnLimitReached(max_turns))
    }
}

/// 每次派发输出一条结构化审计日志（JSON）
fn audit_dispatch(function: &str, arguments: &str, outcome: &DispatchOutcome, turn: usize) {
    let kind = match outcome {
        DispatchOutcome::Success(_) => "ok",
        DispatchOutcome::Domain(_) => "domain_error",
        DispatchOutcome::UnknownFunction(_) => "unknown_function",
        DispatchOutcome::InvalidArguments(_) => "invalid_arguments",
    };
    let audit = serde_json::json!({
        "event": "tool_audit",
        "function": function,
        "outcome": kind,
        "turn": turn,
        "args_preview": args_preview(arguments),
    });
    tracing::info!(audit = %audit.to_string(), "tool");
}

fn args_preview(args: &str) -> String {
    if args.len() > 200 {
        format!("{}...", args.chars().take(200).collect::<String>())
    } else {
        args.to_string()
    }
}
