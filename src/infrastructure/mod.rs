//! 基础设施层（Infrastructure Layer）
//!
//! 持有浏览器页面，对上层只暴露观察 / 操作 / 提取 / 代理四种能力

pub mod cdp_gateway;
pub mod gateway;
pub mod js_executor;
pub mod session;

pub use cdp_gateway::CdpGateway;
pub use gateway::{
    ActOutcome, AgentOutcome, AgentTask, AutonomousAgent, Candidate, LocatorHandle, PageAction,
    PageGateway,
};
pub use js_executor::JsExecutor;
pub use session::{looks_like_submit, Session};
