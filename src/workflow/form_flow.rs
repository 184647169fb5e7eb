//! 表单遍历流程 - 流程层
//!
//! 核心职责：把一个申请表单推进到终态
//!
//! 状态：
//! `Entering → PageCycle(n) → {Submitted, Failed, Partial}`
//!
//! 每轮顺序：
//! 1. 校验错误 → 代理修正
//! 2. 强制登录 → 找访客入口，没有就失败
//! 3. 验证码 → 按策略直接结束
//! 4. 同意条款复选框
//! 5. 常见字段模式填写
//! 6. 剩余字段逐个交给代理（必填优先）
//! 7. 进展统计
//! 8. 探测提交/下一步（提交按钮只检测，从不点击）

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::{Config, EngineLimits};
use crate::infrastructure::{looks_like_submit, AgentTask, Session};
use crate::models::{
    default_required_predicate, ApplicantProfile, ApplicationOutcome, CaptchaPolicy,
    FieldDescriptor, FieldKind, RequiredPredicate,
};
use crate::services::{format_applicant_context, PatternFiller};
use crate::workflow::application_ctx::ApplicationCtx;
use crate::workflow::page_cycle::{PageCycleState, Progress};
use crate::workflow::queries;

/// 按类型枚举未填字段的查询，顺序即处理顺序
const FIELD_QUERIES: &[(FieldKind, &str)] = &[
    (FieldKind::Text, queries::TEXT_FIELDS),
    (FieldKind::Textarea, queries::TEXTAREA_FIELDS),
    (FieldKind::Dropdown, queries::DROPDOWN_FIELDS),
    (FieldKind::Radio, queries::RADIO_GROUPS),
    (FieldKind::Checkbox, queries::CHECKBOX_FIELDS),
];

/// 单轮的去向
enum CycleStep {
    Continue,
    Done(ApplicationOutcome),
}

/// 交给代理的单字段指令，措辞随字段类型变化
pub fn field_instruction(field: &FieldDescriptor) -> String {
    let d = &field.description;
    match field.kind {
        FieldKind::Text => format!(
            "Fill the text field \"{}\" with the matching value from the applicant information",
            d
        ),
        FieldKind::Textarea => format!(
            "Write a concise, professional answer in the field \"{}\" based on the applicant information",
            d
        ),
        FieldKind::Dropdown => format!(
            "Open the dropdown \"{}\" and select the option that best matches the applicant information",
            d
        ),
        FieldKind::Radio => format!(
            "Select the option of the question \"{}\" that matches the applicant information",
            d
        ),
        FieldKind::Checkbox => format!(
            "Check the checkbox \"{}\" if it is required or applies to the applicant",
            d
        ),
        FieldKind::File => format!("Upload the applicant's resume to \"{}\"", d),
    }
}

/// 表单遍历流程
///
/// - 编排单个表单的完整遍历
/// - 不持有任何资源（session 由调用方传入）
/// - 只依赖业务能力（services）
pub struct FormFlow {
    limits: EngineLimits,
    captcha_policy: CaptchaPolicy,
    filler: PatternFiller,
    is_required: RequiredPredicate,
}

impl FormFlow {
    /// 创建新的表单流程
    pub fn new(config: &Config) -> Self {
        Self {
            limits: config.limits.clone(),
            captcha_policy: config.captcha_policy,
            filler: PatternFiller::new(),
            is_required: default_required_predicate,
        }
    }

    /// 替换必填判断
    pub fn with_required_predicate(mut self, predicate: RequiredPredicate) -> Self {
        self.is_required = predicate;
        self
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// 运行表单遍历
    ///
    /// # 参数
    /// - `session`: 浏览器会话（已停在职位申请页）
    /// - `profile`: 申请人资料
    /// - `ctx`: 职位上下文（仅用于日志）
    ///
    /// # 返回
    /// 表单终态；网关错误向上传递
    pub async fn run(
        &self,
        session: &Session,
        profile: &ApplicantProfile,
        ctx: &ApplicationCtx,
    ) -> Result<ApplicationOutcome> {
        let context = format_applicant_context(profile);

        self.enter_form(session, ctx).await?;

        let mut state = PageCycleState::new();
        let mut iterations = 0;

        while iterations < self.limits.max_iterations
            && state.current_page_index <= self.limits.max_form_pages
        {
            iterations += 1;
            state.begin_cycle();
            log_cycle_start(ctx, &state, iterations);

            if let CycleStep::Done(outcome) = self
                .run_cycle(session, profile, &context, &mut state, ctx)
                .await?
            {
                log_outcome(ctx, &outcome);
                return Ok(outcome);
            }
        }

        let outcome = ApplicationOutcome::partial(format!(
            "traversal limit reached after {} cycles (form page {})",
            iterations, state.current_page_index
        ));
        log_outcome(ctx, &outcome);
        Ok(outcome)
    }

    /// 点击打开表单的 "Apply" 按钮（如果有）
    async fn enter_form(&self, session: &Session, ctx: &ApplicationCtx) -> Result<()> {
        session.settle().await;

        match session.observe_first(queries::APPLY_ENTRY).await? {
            Some(button) if !looks_like_submit(&button.description) => {
                info!("{} 🖱️ 点击 \"{}\" 打开申请表单", ctx, button.description);
                session.click(&button).await?;
                session.settle().await;
                session.pause(session.timings().form_render_delay).await;
            }
            Some(button) => {
                debug!("{} 忽略像提交按钮的入口: {}", ctx, button.description);
            }
            None => info!("{} 表单已可见，开始填写", ctx),
        }
        Ok(())
    }

    async fn run_cycle(
        &self,
        session: &Session,
        profile: &ApplicantProfile,
        context: &str,
        state: &mut PageCycleState,
        ctx: &ApplicationCtx,
    ) -> Result<CycleStep> {
        let timings = session.timings();
        session.settle().await;
        session.pause(timings.cycle_delay).await;

        // ========== 1. 校验错误 ==========
        let errors = session.observe(queries::VALIDATION_ERRORS).await?;
        if !errors.is_empty() {
            let failures = state.record_failure();
            warn!(
                "{} ⚠️ 发现 {} 条校验错误 (连续第 {} 次): {}",
                ctx,
                errors.len(),
                failures,
                errors
                    .iter()
                    .map(|e| e.description.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ")
            );
            if state.failures_exceeded(self.limits.max_validation_failures) {
                return Ok(CycleStep::Done(ApplicationOutcome::failed(format!(
                    "validation errors persisted after {} correction attempts",
                    self.limits.max_validation_failures
                ))));
            }

            let task = AgentTask::new(queries::FIX_VALIDATION, self.limits.error_fix_agent_steps)
                .with_context(context);
            self.delegate(session, &task, ctx).await;
            session.pause(timings.action_delay).await;
            return Ok(CycleStep::Continue);
        }
        state.clear_failures();

        // ========== 2. 强制登录 ==========
        if !session.observe(queries::SIGN_IN_WALL).await?.is_empty() {
            match session.observe_first(queries::GUEST_BYPASS).await? {
                Some(bypass) => {
                    info!("{} 🔓 跳过登录: {}", ctx, bypass.description);
                    session.click(&bypass).await?;
                    session.settle().await;
                    session.pause(timings.action_delay).await;
                }
                None => {
                    return Ok(CycleStep::Done(ApplicationOutcome::failed(
                        "mandatory sign-in required",
                    )));
                }
            }
        }

        // ========== 3. 验证码 ==========
        if !session.observe(queries::CAPTCHA).await?.is_empty() {
            return Ok(CycleStep::Done(
                self.captcha_policy.outcome("CAPTCHA challenge detected"),
            ));
        }

        // ========== 4. 同意条款 ==========
        let consents = session.observe(queries::CONSENT_CHECKBOXES).await?;
        if !consents.is_empty() {
            info!("{} ☑️ 勾选 {} 个同意条款", ctx, consents.len());
        }
        for consent in &consents {
            if let Err(e) = session.click(consent).await {
                warn!("{} 勾选 \"{}\" 失败: {}", ctx, consent.description, e);
            }
            session.pause(timings.action_delay).await;
        }

        // ========== 5-6. 模式填写与枚举 ==========
        let filled = self.filler.smart_fill(session, profile).await;
        debug!("{} 模式填写 {} 个字段", ctx, filled);
        session.pause(timings.action_delay).await;

        let fields = self.enumerate_unfilled(session, ctx).await;
        let unfilled = fields.len();

        // ========== 7. 进展统计与委派 ==========
        log_progress(ctx, state.record_unfilled_count(unfilled), unfilled);
        if state.is_stuck(self.limits.max_no_progress) {
            warn!("{} 🔁 连续无进展，跳过委派直接尝试翻页", ctx);
        } else {
            self.delegate_fields(session, fields, context, ctx).await;
        }

        // ========== 8. 提交/下一步 ==========
        self.probe_transition(session, state, ctx).await
    }

    /// 枚举所有未填字段；单个类型的查询失败只记录
    async fn enumerate_unfilled(&self, session: &Session, ctx: &ApplicationCtx) -> Vec<FieldDescriptor> {
        let mut fields = Vec::new();
        for &(kind, query) in FIELD_QUERIES {
            match session.observe(query).await {
                Ok(candidates) => fields.extend(
                    candidates
                        .into_iter()
                        .map(|c| FieldDescriptor::from_candidate(c, kind, self.is_required)),
                ),
                Err(e) => warn!("{} 枚举 {} 字段失败: {}", ctx, kind, e),
            }
        }
        fields
    }

    /// 必填优先，逐个字段交给代理，每轮有上限
    async fn delegate_fields(
        &self,
        session: &Session,
        fields: Vec<FieldDescriptor>,
        context: &str,
        ctx: &ApplicationCtx,
    ) {
        if fields.is_empty() {
            return;
        }

        let (required, optional): (Vec<_>, Vec<_>) = fields.into_iter().partition(|f| f.required);
        info!(
            "{} 📝 剩余 {} 个必填、{} 个选填字段",
            ctx,
            required.len(),
            optional.len()
        );

        let batch: Vec<FieldDescriptor> = required
            .into_iter()
            .chain(optional)
            .take(self.limits.max_fields_per_cycle)
            .collect();
        let total = batch.len();

        for (i, field) in batch.iter().enumerate() {
            debug!("{} [{}/{}] 处理 {} 字段 \"{}\"", ctx, i + 1, total, field.kind, field.description);
            let task = AgentTask::new(field_instruction(field), self.limits.field_agent_steps)
                .with_context(context);
            self.delegate(session, &task, ctx).await;
            session.pause(session.timings().action_delay).await;
        }
    }

    /// 执行代理任务，失败只记录
    async fn delegate(&self, session: &Session, task: &AgentTask, ctx: &ApplicationCtx) {
        match session.run_agent(task).await {
            Ok(outcome) if outcome.success => debug!("{} ✓ 代理完成: {}", ctx, task.instruction),
            Ok(_) => debug!("{} 代理未完成: {}", ctx, task.instruction),
            Err(e) => warn!("{} 代理执行出错: {}", ctx, e),
        }
    }

    /// 探测提交按钮或下一步按钮
    async fn probe_transition(
        &self,
        session: &Session,
        state: &mut PageCycleState,
        ctx: &ApplicationCtx,
    ) -> Result<CycleStep> {
        if let Some(submit) = session.observe_first(queries::SUBMIT_CONTROL).await? {
            info!("{} 🏁 已到达提交按钮 \"{}\"（不点击）", ctx, submit.description);
            return Ok(CycleStep::Done(ApplicationOutcome::Submitted));
        }

        if let Some(next) = session.observe_first(queries::NEXT_CONTROL).await? {
            if looks_like_submit(&next.description) {
                info!("{} 🏁 下一步按钮实为提交 \"{}\"（不点击）", ctx, next.description);
                return Ok(CycleStep::Done(ApplicationOutcome::Submitted));
            }
            info!("{} ➡️ 点击 \"{}\" 进入下一页", ctx, next.description);
            session.click(&next).await?;
            session.settle().await;
            session.pause(session.timings().action_delay).await;
            state.advance_page();
            return Ok(CycleStep::Continue);
        }

        debug!("{} 未找到提交或下一步按钮，稍后重试", ctx);
        session.pause(session.timings().retry_probe_delay).await;
        if session.observe_first(queries::SUBMIT_RETRY).await?.is_some() {
            info!("{} 🏁 重试时找到提交按钮（不点击）", ctx);
            return Ok(CycleStep::Done(ApplicationOutcome::Submitted));
        }

        if state.is_stuck(self.limits.max_no_progress)
            || state.cycles_on_page > self.limits.max_cycles_without_navigation
        {
            return Ok(CycleStep::Done(ApplicationOutcome::partial(format!(
                "no submit or next control found on form page {} after {} cycles",
                state.current_page_index, state.cycles_on_page
            ))));
        }

        Ok(CycleStep::Continue)
    }
}

// ========== 日志辅助函数 ==========

fn log_cycle_start(ctx: &ApplicationCtx, state: &PageCycleState, iteration: usize) {
    info!(
        "{} 📄 表单第 {} 页 · 第 {} 轮 (累计 {} 轮)",
        ctx, state.current_page_index, state.cycles_on_page, iteration
    );
}

fn log_progress(ctx: &ApplicationCtx, progress: Progress, unfilled: usize) {
    match progress {
        Progress::First => debug!("{} 本页剩余 {} 个未填字段", ctx, unfilled),
        Progress::Changed { from, to } => info!("{} 📈 未填字段 {} → {}", ctx, from, to),
        Progress::Stalled(n) => warn!("{} ⏸️ 未填字段仍为 {} (连续 {} 次无进展)", ctx, unfilled, n),
    }
}

fn log_outcome(ctx: &ApplicationCtx, outcome: &ApplicationOutcome) {
    match outcome {
        ApplicationOutcome::Submitted => info!("{} ✅ 表单已填完，停在提交前", ctx),
        ApplicationOutcome::Partial(reason) => warn!("{} ⚠️ 表单部分完成: {}", ctx, reason),
        ApplicationOutcome::Failed(reason) => warn!("{} ❌ 表单失败: {}", ctx, reason),
    }
}
