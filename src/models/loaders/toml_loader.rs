use crate::error::{AppError, FileError};
use crate::models::{ApplicantProfile, Job};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 职位文件的顶层结构：`[[jobs]]`
#[derive(Debug, Deserialize)]
struct JobsFile {
    #[serde(default)]
    jobs: Vec<Job>,
}

async fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    Ok(content)
}

/// 从 TOML 文件加载申请人资料
pub async fn load_profile(path: &Path) -> Result<ApplicantProfile> {
    let content = read_existing(path).await?;
    let profile: ApplicantProfile = toml::from_str(&content)
        .map_err(|e| AppError::file_parse_failed(path.display().to_string(), e))
        .with_context(|| format!("无法解析申请人资料: {}", path.display()))?;

    if !profile.resume_path.exists() {
        tracing::warn!("⚠️ 简历文件不存在: {}", profile.resume_path.display());
    }

    Ok(profile)
}

/// 加载职位列表
///
/// 支持 `.toml`（`[[jobs]]` 数组）和 `.json`（职位对象数组）
pub async fn load_jobs(path: &Path) -> Result<Vec<Job>> {
    let content = read_existing(path).await?;
    let display = path.display().to_string();

    let jobs = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => {
            let file: JobsFile = toml::from_str(&content)
                .map_err(|e| AppError::file_parse_failed(display.clone(), e))?;
            file.jobs
        }
        Some("json") => serde_json::from_str::<Vec<Job>>(&content)
            .map_err(|e| AppError::file_parse_failed(display.clone(), e))?,
        _ => return Err(FileError::UnsupportedFormat { path: display }.into()),
    };

    let without_url = jobs.iter().filter(|job| job.entry_url().is_none()).count();
    tracing::info!(
        "成功加载 {} 个职位 ({} 个缺少入口链接)",
        jobs.len(),
        without_url
    );

    Ok(jobs)
}
