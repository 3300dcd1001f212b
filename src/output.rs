//! 运行输出
//!
//! 事件的文本格式化（纯函数，同一事件两次格式化字节一致）与控制台 + 文件双写 sink；
//! 日志文件名带时间戳，落在 runtime.runs_dir 下。

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::policy::Event;

/// 块分隔线宽度（Plan / Assistant / Context 块上下各一条）
const RULE_WIDTH: usize = 80;

pub fn format_event(event: &Event) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    match event {
        Event::Status { message } => format!("\n[Status] {message}\n"),
        Event::Plan { content } => format!("\n[Plan]\n{rule}\n{content}\n{rule}"),
        Event::Assistant { content } => format!("\n[Assistant]\n{rule}\n{content}\n{rule}"),
        Event::Context { message } => format!("\n[Context]\n{rule}\n{message}\n{rule}"),
        Event::ToolCall { function, arguments } => {
            format!("\n[Function Call] {function}\nArguments: {arguments}")
        }
        Event::ToolResponse { function, result } => {
            format!("\n[Function Response] {function}\nResult: {result}")
        }
    }
}

/// 输出管理器：控制台必写，文件可选（测试与轻量场景用 console_only）
pub struct OutputManager {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl OutputManager {
    /// 在 runs_dir 下创建带时间戳的运行日志文件
    pub fn create(runs_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(runs_dir)?;
        let path = runs_dir.join(format!(
            "fulfillment_run_{}.log",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        let file = File::create(&path)?;
        Ok(Self {
            file: Some(file),
            path: Some(path),
        })
    }

    /// 仅控制台输出
    pub fn console_only() -> Self {
        Self { file: None, path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 写出一条事件；文件写失败不中断运行（控制台仍有输出）
    pub fn emit(&mut self, event: &Event) {
        let text = format_event(event);
        println!("{text}");
        if let Some(file) = &mut self.file {
            let _ = writeln!(file, "{text}");
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_is_idempotent() {
        let events = [
            Event::Status { message: "Executing plan...".to_string() },
            Event::Plan { content: "1. Check inventory".to_string() },
            Event::Assistant { content: "Allocating now.".to_string() },
            Event::Context { message: "{}".to_string() },
            Event::ToolCall {
                function: "check_inventory".to_string(),
                arguments: r#"{"sku": "SKU001"}"#.to_string(),
            },
            Event::ToolResponse {
                function: "check_inventory".to_string(),
                result: r#"{"quantity": 100}"#.to_string(),
            },
        ];
        for event in &events {
            assert_eq!(format_event(event), format_event(event));
        }
    }

    #[test]
    fn test_block_events_carry_separator_rule() {
        let rule = "-".repeat(80);
        let text = format_event(&Event::Plan { content: "steps".to_string() });
        assert_eq!(text.matches(&rule).count(), 2);
        assert!(text.starts_with("\n[Plan]\n"));
    }

    #[test]
    fn test_tool_call_format() {
        let text = format_event(&Event::ToolCall {
            function: "allocate_inventory".to_string(),
            arguments: r#"{"quantity": 30}"#.to_string(),
        });
        assert_eq!(text, "\n[Function Call] allocate_inventory\nArguments: {\"quantity\": 30}");
    }

    #[test]
    fn test_file_sink_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = OutputManager::create(dir.path()).unwrap();
        output.emit(&Event::Status { message: "hello".to_string() });

        let path = output.path().unwrap().to_path_buf();
        let logged = std::fs::read_to_string(path).unwrap();
        assert!(logged.contains("[Status] hello"));
    }
}
