//! 职位申请上下文
//!
//! 封装"我正在处理批次中的第几个职位"这一信息

use std::fmt::Display;

use crate::models::Job;

/// 职位申请上下文
#[derive(Debug, Clone)]
pub struct ApplicationCtx {
    /// 职位标识
    pub job_id: String,

    /// 职位在批次中的索引（从1开始，仅用于日志显示）
    pub job_index: usize,

    /// 批次中的职位总数
    pub total_jobs: usize,

    pub title: String,
    pub company: String,
}

impl ApplicationCtx {
    pub fn new(job: &Job, job_index: usize, total_jobs: usize) -> Self {
        Self {
            job_id: job.identity(),
            job_index,
            total_jobs,
            title: job.title.clone(),
            company: job.company.clone(),
        }
    }
}

impl Display for ApplicationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[职位 {}/{}]", self.job_index, self.total_jobs)
    }
}
