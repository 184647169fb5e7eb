//! 浏览器会话 - 基础设施层
//!
//! 把网关和代理包成一个显式传递的句柄
//!
//! 职责：
//! - 观察/操作/提取的统一入口
//! - 页面稳定等待有上限，超时或出错只记录警告并固定等待
//! - 拒绝任何点击最终提交按钮的动作

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Timings;
use crate::error::GatewayError;
use crate::infrastructure::gateway::{
    ActOutcome, AgentOutcome, AgentTask, AutonomousAgent, Candidate, PageAction, PageGateway,
};
use crate::services::field_classifier::{contains_phrase, normalize_label};

/// 看起来像最终提交按钮的文字
const SUBMIT_MARKERS: &[&str] = &[
    "submit",
    "soumettre",
    "send application",
    "send my application",
    "complete application",
    "finish application",
    "envoyer ma candidature",
    "envoyer la candidature",
];

/// 描述是否读起来像最终提交控件
///
/// 按整词匹配，`Submittal` 之类的词不算
pub fn looks_like_submit(description: &str) -> bool {
    let normalized = normalize_label(description);
    SUBMIT_MARKERS
        .iter()
        .any(|marker| contains_phrase(&normalized, marker))
}

/// 浏览器会话
pub struct Session {
    gateway: Arc<dyn PageGateway>,
    agent: Arc<dyn AutonomousAgent>,
    timings: Timings,
}

impl Session {
    pub fn new(
        gateway: Arc<dyn PageGateway>,
        agent: Arc<dyn AutonomousAgent>,
        timings: Timings,
    ) -> Self {
        Self {
            gateway,
            agent,
            timings,
        }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.gateway.navigate(url).await
    }

    /// 观察页面，不设超时
    pub async fn observe(&self, query: &str) -> Result<Vec<Candidate>> {
        self.gateway.observe(query, None).await
    }

    /// 带超时的观察
    pub async fn observe_within(&self, query: &str, timeout: Duration) -> Result<Vec<Candidate>> {
        self.gateway.observe(query, Some(timeout)).await
    }

    /// 只取相关度最高的候选
    pub async fn observe_first(&self, query: &str) -> Result<Option<Candidate>> {
        Ok(self.observe(query).await?.into_iter().next())
    }

    /// 执行动作
    ///
    /// # 返回
    /// 点击目标像最终提交按钮时返回 `GatewayError::SubmitBlocked`
    pub async fn act(&self, action: PageAction) -> Result<ActOutcome> {
        if let PageAction::Click(target) = &action {
            if looks_like_submit(&target.description) {
                warn!("🛑 拒绝点击提交控件: {}", target.description);
                return Err(GatewayError::SubmitBlocked {
                    description: target.description.clone(),
                }
                .into());
            }
        }
        debug!(
            "执行 {} -> {}",
            action.verb(),
            action.target().map(|t| t.description.as_str()).unwrap_or("-")
        );
        self.gateway.act(&action).await
    }

    pub async fn click(&self, target: &Candidate) -> Result<ActOutcome> {
        self.act(PageAction::Click(target.clone())).await
    }

    pub async fn extract(&self, query: &str, shape: &JsonValue) -> Result<JsonValue> {
        self.gateway.extract(query, shape).await
    }

    /// 提取并反序列化为指定类型
    pub async fn extract_as<T: DeserializeOwned>(&self, query: &str, shape: &JsonValue) -> Result<T> {
        let value = self.extract(query, shape).await?;
        let typed = serde_json::from_value(value).map_err(|source| GatewayError::ShapeMismatch {
            query: query.to_string(),
            source,
        })?;
        Ok(typed)
    }

    pub async fn run_agent(&self, task: &AgentTask) -> Result<AgentOutcome> {
        debug!("代理任务 ({} 步): {}", task.max_steps, task.instruction);
        self.agent.execute(task).await
    }

    /// 等待页面稳定
    ///
    /// # 返回
    /// 返回是否在时限内稳定；超时或出错不视为失败
    pub async fn settle(&self) -> bool {
        match tokio::time::timeout(self.timings.settle_timeout, self.gateway.wait_for_settle()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("⚠️ 等待页面稳定出错: {}，继续", e);
                self.pause(self.timings.settle_grace).await;
                false
            }
            Err(_) => {
                warn!(
                    "⚠️ 页面 {}ms 内未稳定，继续",
                    self.timings.settle_timeout.as_millis()
                );
                self.pause(self.timings.settle_grace).await;
                false
            }
        }
    }

    pub async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
