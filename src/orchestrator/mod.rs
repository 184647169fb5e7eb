//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量职位处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载申请人资料和职位列表（文件或搜索服务）
//! - 顺序处理职位，职位之间随机等待
//! - 捕获单个职位的错误和 panic
//! - 输出全局统计、报告和警告文件
//!
//! ### `job_processor` - 单个职位处理器
//! - 打开来源页并关闭弹窗
//! - 定位职位、点击申请按钮
//! - 委托 FormFlow 遍历表单
//! - 将表单终态折算为职位结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Job>)
//!     ↓
//! job_processor (处理单个 Job)
//!     ↓
//! workflow::FormFlow (处理表单页循环)
//!     ↓
//! services (能力层：locator / pattern fill / context / report)
//!     ↓
//! infrastructure (基础设施：Session → PageGateway / AutonomousAgent)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，job_processor 管单个
//! 2. **资源隔离**：只有编排层持有 Browser 和 Session
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体表单判断

pub mod batch_processor;
pub mod job_processor;

// 重新导出主要类型
pub use batch_processor::{apply_to_jobs, apply_with_processor, App};
pub use job_processor::JobProcessor;
