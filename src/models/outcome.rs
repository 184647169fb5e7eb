//! 申请结果
//!
//! 单个表单的终态 `ApplicationOutcome`，以及批次级别的 `JobResult` / `BatchSummary`

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Job;

/// 单个表单遍历的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationOutcome {
    /// 表单已填完，停在最终提交按钮前
    Submitted,
    Failed(String),
    Partial(String),
}

impl ApplicationOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn partial(reason: impl Into<String>) -> Self {
        Self::Partial(reason.into())
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl Display for ApplicationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
            Self::Partial(reason) => write!(f, "partial ({})", reason),
        }
    }
}

/// 检测到验证码时的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptchaPolicy {
    #[default]
    Failed,
    Partial,
}

impl CaptchaPolicy {
    pub fn outcome(self, reason: impl Into<String>) -> ApplicationOutcome {
        match self {
            Self::Failed => ApplicationOutcome::failed(reason),
            Self::Partial => ApplicationOutcome::partial(reason),
        }
    }
}

impl FromStr for CaptchaPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "failed" | "fail" => Ok(Self::Failed),
            "partial" => Ok(Self::Partial),
            other => Err(ConfigError::InvalidValue {
                name: "CAPTCHA_OUTCOME".to_string(),
                value: other.to_string(),
                allowed: "failed, partial".to_string(),
            }),
        }
    }
}

/// 批次中单个职位的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Applied,
    Failed,
    Skipped,
}

/// 单个职位的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub job: Job,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JobResult {
    pub fn applied(job: Job) -> Self {
        Self {
            job,
            status: JobStatus::Applied,
            reason: None,
        }
    }

    pub fn failed(job: Job, reason: impl Into<String>) -> Self {
        Self {
            job,
            status: JobStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn skipped(job: Job, reason: impl Into<String>) -> Self {
        Self {
            job,
            status: JobStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    /// 将表单终态折算为批次状态
    pub fn from_outcome(job: Job, outcome: ApplicationOutcome) -> Self {
        match outcome {
            ApplicationOutcome::Submitted => Self::applied(job),
            ApplicationOutcome::Partial(reason) => {
                Self::failed(job, format!("form partially completed: {}", reason))
            }
            ApplicationOutcome::Failed(reason) => {
                Self::failed(job, format!("form traversal failed: {}", reason))
            }
        }
    }
}

/// 批次汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    /// 记录一个结果并更新计数
    pub fn record(&mut self, result: JobResult) {
        match result.status {
            JobStatus::Applied => self.applied += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Skipped => self.skipped += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}
