//! 单个职位处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责把一个职位从列表页带到表单终态，是职位级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **打开来源页**：导航到职位入口并关闭弹窗
//! 2. **定位职位**：委托 `JobLocator` 翻页查找
//! 3. **进入申请**：查找并点击申请按钮
//! 4. **表单遍历**：委托 `FormFlow` 跑完表单
//! 5. **结果折算**：把表单终态折算成批次状态

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::Session;
use crate::models::{ApplicantProfile, Job, JobResult};
use crate::services::JobLocator;
use crate::workflow::{ApplicationCtx, FormFlow};

/// 单个职位处理器
///
/// 持有定位器和表单流程，整个批次复用同一个实例
pub struct JobProcessor {
    locator: JobLocator,
    flow: FormFlow,
}

impl JobProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            locator: JobLocator::new(config.limits.max_listing_pages),
            flow: FormFlow::new(config),
        }
    }

    /// 替换表单流程（例如换一个必填判断）
    pub fn with_flow(mut self, flow: FormFlow) -> Self {
        self.flow = flow;
        self
    }

    /// 处理单个职位
    ///
    /// # 参数
    /// - `session`: 浏览器会话
    /// - `job`: 职位
    /// - `entry_url`: 职位入口（来源页）
    /// - `profile`: 申请人资料
    /// - `ctx`: 职位上下文
    ///
    /// # 返回
    /// 职位结果；网关错误向上传递，由批量处理器记为失败
    pub async fn process(
        &self,
        session: &Session,
        job: &Job,
        entry_url: &str,
        profile: &ApplicantProfile,
        ctx: &ApplicationCtx,
    ) -> Result<JobResult> {
        // ========== 1. 打开来源页 ==========
        info!("{} 🌐 打开 {}", ctx, entry_url);
        session
            .navigate(entry_url)
            .await
            .with_context(|| format!("无法打开职位来源页 {}", entry_url))?;
        session.settle().await;
        self.locator.dismiss_popups(session).await;

        // ========== 2. 定位职位 ==========
        if !self.locator.locate(session, job).await? {
            warn!("{} ⏭️ 来源页上没有找到该职位", ctx);
            return Ok(JobResult::skipped(job.clone(), "job not found on source page"));
        }

        // ========== 3. 申请按钮 ==========
        let Some(apply) = self.locator.find_apply_control(session).await? else {
            warn!("{} ⏭️ 没有找到申请按钮", ctx);
            return Ok(JobResult::skipped(job.clone(), "no apply control found"));
        };
        info!("{} 🖱️ 点击申请按钮: {}", ctx, apply.description);
        session.click(&apply).await?;
        session.settle().await;

        // ========== 4. 表单遍历 ==========
        let outcome = self
            .flow
            .run(session, profile, ctx)
            .await
            .context("表单遍历中断")?;
        Ok(JobResult::from_outcome(job.clone(), outcome))
    }
}
