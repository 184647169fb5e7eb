//! 结果写入服务 - 业务能力层
//!
//! 只负责"写报告文件"能力，不关心流程

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::debug;

use crate::error::AppError;
use crate::models::{BatchSummary, JobResult, JobStatus};

/// 结果写入服务
///
/// 职责：
/// - 把未成功申请的职位追加写入 warn 文件
/// - 把整个批次的结果写成 JSON 报告
pub struct ReportWriter {
    warn_file_path: String,
    report_file_path: String,
}

impl ReportWriter {
    pub fn new(warn_file_path: impl Into<String>, report_file_path: impl Into<String>) -> Self {
        Self {
            warn_file_path: warn_file_path.into(),
            report_file_path: report_file_path.into(),
        }
    }

    /// 追加一条警告，已申请的职位不写
    ///
    /// # 返回
    /// 返回是否写入了内容
    pub fn append_warning(&self, result: &JobResult) -> Result<bool> {
        if result.status == JobStatus::Applied {
            return Ok(false);
        }

        debug!("写入警告: {} | {:?}", result.job.identity(), result.status);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        let warn_msg = format!(
            "{} | {:?} | {} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            result.status,
            result.job,
            result.job.entry_url().unwrap_or("-"),
            result.reason.as_deref().unwrap_or("-")
        );

        file.write_all(warn_msg.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        Ok(true)
    }

    /// 写出整个批次的 JSON 报告（覆盖旧文件）
    pub fn write_summary(&self, summary: &BatchSummary) -> Result<()> {
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&self.report_file_path, json)
            .map_err(|e| AppError::file_write_failed(&self.report_file_path, e))?;
        debug!("已写入报告: {}", self.report_file_path);
        Ok(())
    }
}
