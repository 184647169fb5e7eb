/// 日志工具模块
///
/// 提供订阅器初始化、日志文件和统计输出的辅助函数
use std::fs;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{BatchSummary, JobStatus};

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},chromiumoxide=warn,hyper=warn,reqwest=warn"))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n自动投递日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动投递模式");
    info!("🌐 浏览器模式: {:?}", config.browser_mode);
    info!("🤖 模型: {}", config.llm_model_name);
    info!(
        "📐 上限: 表单页 {} / 迭代 {} / 列表页 {}",
        config.limits.max_form_pages, config.limits.max_iterations, config.limits.max_listing_pages
    );
    info!("{}", "=".repeat(60));
}

/// 记录职位加载信息
///
/// # 参数
/// - `total`: 职位总数
/// - `source`: 职位来源（文件路径或搜索服务）
pub fn log_jobs_loaded(total: usize, source: &str) {
    info!("✓ 从 {} 加载了 {} 个职位", source, total);
    info!("💡 职位将按顺序逐个处理\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 批量汇总
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(summary: &BatchSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已投递: {}/{}", summary.applied, summary.total());
    info!("❌ 失败: {}", summary.failed);
    info!("⏭️ 跳过: {}", summary.skipped);
    for result in summary.results.iter().filter(|r| r.status != JobStatus::Applied) {
        info!(
            "   - {} [{:?}]: {}",
            result.job,
            result.status,
            result.reason.as_deref().unwrap_or("-")
        );
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
