//! 感知/操作网关 - 基础设施层
//!
//! 引擎只通过这两个能力 trait 接触页面：
//! - `PageGateway`: 导航、观察、操作、提取、等待页面稳定
//! - `AutonomousAgent`: 按自然语言指令自主完成少量步骤
//!
//! 不解析 DOM，不认识 Job / Profile

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 网关分配的不透明元素句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorHandle(String);

impl LocatorHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次观察返回的候选元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// 元素的可读描述（标签、文字、类型）
    pub description: String,
    pub handle: LocatorHandle,
}

impl Candidate {
    pub fn new(description: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            handle: LocatorHandle::new(handle),
        }
    }
}

/// 对页面执行的动作
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Click(Candidate),
    Fill { target: Candidate, value: String },
    Select { target: Candidate, option: String },
    Upload { target: Candidate, path: PathBuf },
    /// 由网关自行解释的自然语言指令
    Instruction(String),
}

impl PageAction {
    pub fn target(&self) -> Option<&Candidate> {
        match self {
            PageAction::Click(target)
            | PageAction::Fill { target, .. }
            | PageAction::Select { target, .. }
            | PageAction::Upload { target, .. } => Some(target),
            PageAction::Instruction(_) => None,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            PageAction::Click(_) => "click",
            PageAction::Fill { .. } => "fill",
            PageAction::Select { .. } => "select",
            PageAction::Upload { .. } => "upload",
            PageAction::Instruction(_) => "instruction",
        }
    }
}

/// 动作结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ActOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// 交给自主代理的任务
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTask {
    pub instruction: String,
    pub max_steps: usize,
    /// 申请人上下文，作为代理的系统提示
    pub context: Option<String>,
}

impl AgentTask {
    pub fn new(instruction: impl Into<String>, max_steps: usize) -> Self {
        Self {
            instruction: instruction.into(),
            max_steps,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// 代理执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentOutcome {
    pub success: bool,
}

/// 页面感知/操作网关
#[async_trait]
pub trait PageGateway: Send + Sync {
    /// 打开指定 URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 按自然语言查询返回候选元素，按相关度排序，可能为空
    async fn observe(&self, query: &str, timeout: Option<Duration>) -> Result<Vec<Candidate>>;

    /// 执行一个动作
    async fn act(&self, action: &PageAction) -> Result<ActOutcome>;

    /// 按查询从页面提取结构化数据，`shape` 描述期望的 JSON 结构
    async fn extract(&self, query: &str, shape: &JsonValue) -> Result<JsonValue>;

    /// 等待页面网络与渲染稳定
    async fn wait_for_settle(&self) -> Result<()>;
}

/// 自主代理
#[async_trait]
pub trait AutonomousAgent: Send + Sync {
    async fn execute(&self, task: &AgentTask) -> Result<AgentOutcome>;
}
