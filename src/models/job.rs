//! 职位数据模型
//!
//! 包括待申请的 `Job`，以及职位搜索代理的请求与返回记录

use std::fmt::Display;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// 已知的职位聚合站点，申请链接落在这些站点上时不作为入口
const AGGREGATOR_HOSTS: &[&str] = &[
    "linkedin.",
    "indeed.",
    "ziprecruiter.",
    "glassdoor.",
    "simplyhired.",
    "monster.",
    "bebee.",
    "talentify.",
    "jobrapido.",
    "eluta.",
    "builtin.",
    "jooble.",
    "google.",
];

/// 待申请的职位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// 职位所在的招聘页入口
    #[serde(default, alias = "apply_url", skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Job {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            company: company.into(),
            source: None,
            location: None,
            apply_url: None,
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_apply_url(mut self, url: impl Into<String>) -> Self {
        self.apply_url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 职位标识：优先使用 id，否则为 "标题@公司"
    pub fn identity(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("{}@{}", self.title, self.company),
        }
    }

    /// 可用的入口链接，空字符串视为缺失
    pub fn entry_url(&self) -> Option<&str> {
        self.apply_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" @ {}", self.title, self.company)
    }
}

/// 职位类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    Internship,
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Volunteer,
}

impl std::str::FromStr for JobType {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internship" => Ok(Self::Internship),
            "full-time" => Ok(Self::FullTime),
            "part-time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            "freelance" => Ok(Self::Freelance),
            "volunteer" => Ok(Self::Volunteer),
            other => Err(crate::error::ConfigError::InvalidValue {
                name: "JOB_SEARCH_TYPE".to_string(),
                value: other.to_string(),
                allowed: "internship, full-time, part-time, contract, freelance, volunteer"
                    .to_string(),
            }),
        }
    }
}

/// 职位搜索请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchRequest {
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
}

/// 搜索结果中的一个申请入口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOption {
    pub title: String,
    pub link: String,
}

/// 职位搜索代理返回的单条记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchResult {
    pub title: String,
    pub company_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub via: Option<String>,
    #[serde(default)]
    pub share_link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apply_options: Vec<ApplyOption>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// 选出第一个不在聚合站点上的申请链接
pub fn resolve_apply_url(options: &[ApplyOption]) -> Option<String> {
    options
        .iter()
        .find(|option| !is_aggregator_link(&option.link))
        .map(|option| option.link.clone())
}

fn is_aggregator_link(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().to_lowercase();
            AGGREGATOR_HOSTS.iter().any(|agg| {
                host.starts_with(agg) || host.contains(&format!(".{}", agg))
            })
        }
        // 无法解析的链接不能作为入口
        Err(_) => true,
    }
}

impl From<JobSearchResult> for Job {
    fn from(result: JobSearchResult) -> Self {
        let apply_url = resolve_apply_url(&result.apply_options);
        let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };
        Self {
            id: result.job_id,
            title: result.title,
            company: result.company_name,
            source: result.via,
            location: non_empty(result.location),
            apply_url,
            description: non_empty(result.description),
        }
    }
}
