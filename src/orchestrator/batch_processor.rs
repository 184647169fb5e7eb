//! 批量职位处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量职位的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、连接或启动浏览器、创建 Session
//! 2. **批量加载**：读取申请人资料，从文件或搜索服务加载职位
//! 3. **顺序处理**：一次只处理一个职位，职位之间随机等待
//! 4. **错误隔离**：单个职位的错误或 panic 只影响该职位
//! 5. **资源管理**：持有 Browser 和 Session，确保生命周期正确
//! 6. **全局统计**：汇总结果，写出报告和警告文件

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use futures::FutureExt;
use rand::Rng;
use tracing::{error, info, warn};

use crate::browser;
use crate::clients::JobSearchClient;
use crate::config::{BrowserMode, Config, Timings};
use crate::infrastructure::{CdpGateway, JsExecutor, Session};
use crate::models::{load_jobs, load_profile, ApplicantProfile, BatchSummary, Job, JobResult};
use crate::orchestrator::job_processor::JobProcessor;
use crate::services::{LlmService, ReportWriter};
use crate::utils::logging;
use crate::workflow::ApplicationCtx;

/// 顺序处理一批职位
///
/// # 参数
/// - `session`: 浏览器会话
/// - `jobs`: 职位列表
/// - `profile`: 申请人资料
/// - `config`: 配置（上限与节奏）
///
/// # 返回
/// 批量汇总，每个职位恰好一条结果
pub async fn apply_to_jobs(
    session: &Session,
    jobs: &[Job],
    profile: &ApplicantProfile,
    config: &Config,
) -> BatchSummary {
    let processor = JobProcessor::new(config);
    apply_with_processor(session, jobs, profile, &processor).await
}

/// 使用给定的处理器顺序处理一批职位
pub async fn apply_with_processor(
    session: &Session,
    jobs: &[Job],
    profile: &ApplicantProfile,
    processor: &JobProcessor,
) -> BatchSummary {
    let total = jobs.len();
    let mut summary = BatchSummary::default();

    for (index, job) in jobs.iter().enumerate() {
        let ctx = ApplicationCtx::new(job, index + 1, total);
        log_job_start(&ctx, job);

        let Some(entry_url) = job.entry_url() else {
            warn!("{} ⏭️ 没有入口 URL，跳过", ctx);
            summary.record(JobResult::skipped(
                job.clone(),
                "no entry URL (career page unknown)",
            ));
            continue;
        };

        let attempt = AssertUnwindSafe(processor.process(session, job, entry_url, profile, &ctx))
            .catch_unwind()
            .await;
        let result = match attempt {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!("{} ❌ 处理过程中发生错误: {:#}", ctx, e);
                JobResult::failed(job.clone(), format!("{:#}", e))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("{} 💥 处理过程中发生 panic: {}", ctx, message);
                JobResult::failed(job.clone(), format!("panic: {}", message))
            }
        };
        log_job_result(&ctx, &result);
        summary.record(result);

        if index + 1 < total {
            let delay = inter_job_delay(session.timings());
            if !delay.is_zero() {
                info!("{} ⏳ 等待 {}ms 后处理下一个职位", ctx, delay.as_millis());
            }
            session.pause(delay).await;
        }
    }

    summary
}

/// 职位之间的随机间隔
fn inter_job_delay(timings: &Timings) -> Duration {
    let min = timings.inter_job_delay_min.as_millis() as u64;
    let max = timings.inter_job_delay_max.as_millis() as u64;
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    session: Session,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        let (browser, page) = match config.browser_mode {
            BrowserMode::Connect => {
                browser::connect_to_browser_and_page(config.browser_debug_port).await?
            }
            BrowserMode::Headless => {
                browser::launch_headless_browser(config.chrome_executable.as_deref()).await?
            }
        };

        // JsExecutor 持有 page，网关同时充当页面操作和自主代理
        let executor = Arc::new(JsExecutor::new(page));
        let llm = Arc::new(LlmService::new(&config));
        let gateway = Arc::new(CdpGateway::new(executor, llm));
        let session = Session::new(gateway.clone(), gateway, config.timings.clone());

        let writer = ReportWriter::new(config.warn_file.clone(), config.report_file.clone());

        Ok(Self {
            config,
            _browser: browser,
            session,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchSummary> {
        let profile = load_profile(Path::new(&self.config.profile_path))
            .await
            .with_context(|| format!("无法加载申请人资料: {}", self.config.profile_path))?;
        info!("👤 申请人: {}", profile.full_name());

        let jobs = self.load_jobs().await?;
        if jobs.is_empty() {
            warn!("⚠️ 没有待处理的职位，程序结束");
            return Ok(BatchSummary::default());
        }

        let summary = apply_to_jobs(&self.session, &jobs, &profile, &self.config).await;

        for result in &summary.results {
            if let Err(e) = self.writer.append_warning(result) {
                warn!("写入警告文件失败: {}", e);
            }
        }
        self.writer
            .write_summary(&summary)
            .with_context(|| format!("写入报告失败: {}", self.config.report_file))?;

        logging::print_final_stats(&summary, &self.config.output_log_file);
        Ok(summary)
    }

    /// 加载职位：配置了搜索服务时从服务查询，否则读取本地文件
    async fn load_jobs(&self) -> Result<Vec<Job>> {
        if let Some((client, request)) = JobSearchClient::request_from_config(&self.config)? {
            info!("\n🔎 正在通过搜索服务查询职位: {}", request.search);
            let jobs = client
                .search_jobs(&request)
                .await
                .context("职位搜索服务请求失败")?;
            logging::log_jobs_loaded(jobs.len(), "搜索服务");
            return Ok(jobs);
        }

        info!("\n📁 正在读取职位文件...");
        let jobs = load_jobs(Path::new(&self.config.jobs_path)).await?;
        logging::log_jobs_loaded(jobs.len(), &self.config.jobs_path);
        Ok(jobs)
    }
}

// ========== 日志辅助函数 ==========

fn log_job_start(ctx: &ApplicationCtx, job: &Job) {
    info!("\n{}", "=".repeat(60));
    info!("{} 📄 开始处理: {}", ctx, job);
    info!("{}", "=".repeat(60));
}

fn log_job_result(ctx: &ApplicationCtx, result: &JobResult) {
    info!("\n{}", "─".repeat(60));
    match &result.reason {
        Some(reason) => info!("{} 结果: {:?} ({})", ctx, result.status, reason),
        None => info!("{} ✅ 结果: {:?}", ctx, result.status),
    }
    info!("{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_within_bounds() {
        let timings = Timings::default();
        for _ in 0..20 {
            let delay = inter_job_delay(&timings);
            assert!(delay >= timings.inter_job_delay_min);
            assert!(delay <= timings.inter_job_delay_max);
        }
    }

    #[test]
    fn instant_timings_have_no_delay() {
        assert!(inter_job_delay(&Timings::instant()).is_zero());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
