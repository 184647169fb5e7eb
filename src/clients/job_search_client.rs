/// 职位搜索代理客户端
///
/// 封装对职位搜索代理 `POST {base}/api/job/search` 的调用
use crate::config::Config;
use crate::error::{ApiError, AppError};
use crate::models::{Job, JobSearchRequest, JobSearchResult, JobType};
use anyhow::{Context, Result};
use tracing::{debug, info};

const SEARCH_ENDPOINT: &str = "/api/job/search";

/// 职位搜索代理客户端
pub struct JobSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl JobSearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 按配置构造搜索请求
    ///
    /// # 返回
    /// 未配置代理地址时返回 None
    pub fn request_from_config(config: &Config) -> Result<Option<(Self, JobSearchRequest)>> {
        let Some(base_url) = &config.job_search_url else {
            return Ok(None);
        };
        let job_type = config
            .job_search_type
            .as_deref()
            .map(str::parse::<JobType>)
            .transpose()?;

        let request = JobSearchRequest {
            search: config.job_search_query.clone(),
            location: config.job_search_location.clone(),
            job_type,
            start: None,
        };
        Ok(Some((Self::new(base_url.clone()), request)))
    }

    /// 搜索职位
    ///
    /// # 返回
    /// 代理返回的原始记录
    pub async fn search(&self, request: &JobSearchRequest) -> Result<Vec<JobSearchResult>> {
        let endpoint = format!("{}{}", self.base_url, SEARCH_ENDPOINT);
        debug!("请求职位搜索: {} ({:?})", endpoint, request);

        let response = self
            .http
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }
            .into());
        }

        let results: Vec<JobSearchResult> = response
            .json()
            .await
            .with_context(|| format!("无法解析职位搜索结果: {}", endpoint))?;

        info!("✓ 职位搜索返回 {} 条记录", results.len());
        Ok(results)
    }

    /// 搜索并转换为待申请的职位
    pub async fn search_jobs(&self, request: &JobSearchRequest) -> Result<Vec<Job>> {
        let jobs: Vec<Job> = self.search(request).await?.into_iter().map(Job::from).collect();
        let direct = jobs.iter().filter(|job| job.entry_url().is_some()).count();
        info!("📋 其中 {} 个职位有直接申请入口", direct);
        Ok(jobs)
    }
}
