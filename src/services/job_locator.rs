//! 招聘页职位定位 - 业务能力层
//!
//! 在职位列表页上找到指定职位并打开，找不到就翻页。
//! 只处理单个职位，不关心批次流程

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::infrastructure::{Candidate, Session};
use crate::models::Job;

pub const COOKIE_BANNER_QUERY: &str = "Find and click the \"Accept All\", \"Allow All\", \"Accept All Cookies\" or similar button to accept cookies. Look for cookie consent banners at the top or bottom of the page.";

pub const BLOCKING_POPUP_QUERY: &str = "Find and click the close button (X, ✕, Close or similar) on any ad, popup or modal dialog that is blocking the page content.";

pub const PAGINATION_QUERY: &str = "Find and click the \"Next\" button, \"Next Page\", arrow (→, ›) or the next page number to navigate to the next page of job listings.";

pub const APPLY_CONTROL_QUERY: &str = "Find and click the \"Apply\" button for this job. Look for buttons with text like \"Apply\", \"Apply Now\", \"Easy Apply\" or \"Postuler\".";

/// 描述前缀最多取的字符数
const DESCRIPTION_PREFIX_CHARS: usize = 100;

/// 查找职位卡片的查询语句
pub fn listing_query(job: &Job) -> String {
    let description = job
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            let prefix: String = d.chars().take(DESCRIPTION_PREFIX_CHARS).collect();
            format!(" with description containing \"{}\"", prefix)
        })
        .unwrap_or_default();

    format!(
        "Find and click on the job listing for the position \"{}\"{}. Look for job cards, job titles or job links that match this position.",
        job.title, description
    )
}

/// 职位定位器
#[derive(Debug, Clone)]
pub struct JobLocator {
    max_pages: usize,
}

impl JobLocator {
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// 关闭 Cookie 横幅和一个遮挡页面的弹窗，出错一律忽略
    pub async fn dismiss_popups(&self, session: &Session) {
        debug!("检查弹窗...");
        let timeout = session.timings().popup_timeout;

        for (label, query) in [("Cookie", COOKIE_BANNER_QUERY), ("弹窗", BLOCKING_POPUP_QUERY)] {
            match session.observe_within(query, timeout).await {
                Ok(found) => {
                    if let Some(target) = found.into_iter().next() {
                        info!("   ✓ 关闭{}: {}", label, target.description);
                        if let Err(e) = session.click(&target).await {
                            debug!("关闭{}失败: {}", label, e);
                        }
                        session.pause(session.timings().action_delay).await;
                    }
                }
                Err(e) => debug!("未检测到{}: {}", label, e),
            }
        }
    }

    /// 在当前列表页上定位职位并打开详情
    ///
    /// # 返回
    /// 找到并打开返回 true；所有页都没有返回 false。网关错误向上传递
    pub async fn locate(&self, session: &Session, job: &Job) -> Result<bool> {
        let query = listing_query(job);
        let mut page = 0;

        while page < self.max_pages {
            page += 1;
            debug!("   扫描第 {}/{} 页...", page, self.max_pages);

            if let Some(listing) = session.observe_first(&query).await? {
                info!("   ✓ 在第 {} 页找到职位: {}", page, listing.description);
                session.click(&listing).await?;
                session.settle().await;
                return Ok(true);
            }

            if page >= self.max_pages {
                break;
            }

            match session.observe_first(PAGINATION_QUERY).await? {
                Some(next) => {
                    debug!("   → 翻到下一页");
                    session.click(&next).await?;
                    session.settle().await;
                }
                None => {
                    debug!("   ℹ️ 没有更多页面");
                    break;
                }
            }
        }

        warn!("   ⚠️ 搜索 {} 页后仍未找到职位 {}", page, job);
        Ok(false)
    }

    /// 查找职位详情页上的申请按钮
    pub async fn find_apply_control(&self, session: &Session) -> Result<Option<Candidate>> {
        session.observe_first(APPLY_CONTROL_QUERY).await
    }
}
