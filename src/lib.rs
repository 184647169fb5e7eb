//! # Auto Apply
//!
//! 一个自动填写职位申请表的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageGateway` / `AutonomousAgent` - 观察、操作、提取、多步代理
//! - `Session` - 显式传递的会话句柄，拒绝点击最终提交按钮
//! - `CdpGateway` - 基于 chromiumoxide + LLM 的具体实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `JobLocator` - 在来源页上翻页定位职位
//! - `PatternFiller` - 按标签同义词直接填写常见字段
//! - `format_applicant_context` - 代理使用的申请人上下文
//! - `ReportWriter` - 写报告和警告文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个表单"的完整处理流程
//! - `ApplicationCtx` - 上下文封装（职位序号 + 标识）
//! - `FormFlow` - 表单页循环（校验 → 登录 → 验证码 → 填写 → 翻页）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量职位处理器，管理资源和节奏
//! - `orchestrator/job_processor` - 单个职位处理器
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AutonomousAgent, PageGateway, Session};
pub use models::{ApplicantProfile, ApplicationOutcome, BatchSummary, Job, JobResult, JobStatus};
pub use orchestrator::{apply_to_jobs, App, JobProcessor};
pub use workflow::{ApplicationCtx, FormFlow};
