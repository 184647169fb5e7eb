//! 常见字段的确定性填写 - 业务能力层
//!
//! 对每个常见字段单独观察一次，找到空的输入就直接填写资料中的原值。
//! 每个字段的尝试互相独立，失败只记录日志

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::infrastructure::{Candidate, PageAction, Session};
use crate::models::ApplicantProfile;
use crate::services::field_classifier::{classify_label, ProfileField};

/// 直接填写的文本字段
pub const COMMON_TEXT_FIELDS: &[ProfileField] = &[
    ProfileField::FirstName,
    ProfileField::LastName,
    ProfileField::Email,
    ProfileField::Phone,
    ProfileField::City,
    ProfileField::PostalCode,
    ProfileField::LinkedIn,
];

/// 先点开再选择的下拉字段
pub const COMMON_DROPDOWNS: &[ProfileField] = &[ProfileField::Country, ProfileField::State];

/// Yes/No 单选题
pub const COMMON_RADIOS: &[ProfileField] = &[
    ProfileField::WorkAuthorization,
    ProfileField::Sponsorship,
    ProfileField::Relocation,
];

/// 需要上传的文件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
    Transcript,
}

pub const DOCUMENTS: &[DocumentKind] = &[
    DocumentKind::Resume,
    DocumentKind::CoverLetter,
    DocumentKind::Transcript,
];

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume or CV",
            DocumentKind::CoverLetter => "cover letter",
            DocumentKind::Transcript => "transcript",
        }
    }

    pub fn path(self, profile: &ApplicantProfile) -> Option<&Path> {
        match self {
            DocumentKind::Resume => Some(profile.resume_path.as_path()),
            DocumentKind::CoverLetter => profile.cover_letter_path.as_deref(),
            DocumentKind::Transcript => profile.transcript_path.as_deref(),
        }
        .filter(|p| !p.as_os_str().is_empty())
    }
}

// ========== 查询语句 ==========

pub fn text_field_query(field: ProfileField) -> String {
    format!("Find the empty {} input field", field.label())
}

pub fn dropdown_query(field: ProfileField) -> String {
    format!("Find the {} dropdown that has no option selected yet", field.label())
}

pub fn radio_query(field: ProfileField) -> String {
    format!("Find the unanswered yes/no radio question about {}", field.label())
}

pub fn upload_query(document: DocumentKind) -> String {
    format!("Find the file upload input for the {}", document.label())
}

pub fn attachment_query(document: DocumentKind) -> String {
    format!("Is a file already attached to the {} upload field?", document.label())
}

#[derive(Debug, Deserialize)]
struct AttachmentState {
    attached: bool,
}

/// 常见字段填写器
///
/// 每次动作之后停顿 `Timings::action_delay`
#[derive(Debug, Clone, Default)]
pub struct PatternFiller;

impl PatternFiller {
    pub fn new() -> Self {
        Self
    }

    /// 填写所有能识别的常见字段
    ///
    /// # 返回
    /// 本次实际填写的字段数
    pub async fn smart_fill(&self, session: &Session, profile: &ApplicantProfile) -> usize {
        let mut filled = 0;

        for &field in COMMON_TEXT_FIELDS {
            let Some(value) = field.value(profile) else {
                continue;
            };
            filled += self.attempt(field.label(), self.fill_text(session, field, &value)).await;
        }

        for &field in COMMON_DROPDOWNS {
            let Some(value) = field.value(profile) else {
                continue;
            };
            filled += self
                .attempt(field.label(), self.fill_dropdown(session, field, &value))
                .await;
        }

        for &field in COMMON_RADIOS {
            let Some(value) = field.value(profile) else {
                continue;
            };
            filled += self.attempt(field.label(), self.answer_radio(session, field, &value)).await;
        }

        for &document in DOCUMENTS {
            let Some(path) = document.path(profile) else {
                continue;
            };
            filled += self
                .attempt(document.label(), self.upload_document(session, document, path))
                .await;
        }

        if filled > 0 {
            info!("✓ 模式填写完成 {} 个字段", filled);
        } else {
            debug!("模式填写未找到可填写的字段");
        }
        filled
    }

    /// 单个字段的尝试，错误只记录
    async fn attempt(&self, label: &str, fut: impl std::future::Future<Output = Result<bool>>) -> usize {
        match fut.await {
            Ok(true) => {
                debug!("✓ 已填写 {}", label);
                1
            }
            Ok(false) => 0,
            Err(e) => {
                warn!("填写 {} 失败，跳过: {}", label, e);
                0
            }
        }
    }

    /// 候选的描述被识别为其他字段时不填写
    fn is_mismatch(field: ProfileField, candidate: &Candidate) -> bool {
        match classify_label(&candidate.description) {
            Some(other) if other != field => {
                debug!(
                    "候选 \"{}\" 看起来是 {:?}，不是 {:?}，跳过",
                    candidate.description, other, field
                );
                true
            }
            _ => false,
        }
    }

    async fn fill_text(&self, session: &Session, field: ProfileField, value: &str) -> Result<bool> {
        let Some(target) = session.observe_first(&text_field_query(field)).await? else {
            return Ok(false);
        };
        if Self::is_mismatch(field, &target) {
            return Ok(false);
        }

        let outcome = session
            .act(PageAction::Fill {
                target,
                value: value.to_string(),
            })
            .await?;
        session.pause(session.timings().action_delay).await;
        Ok(outcome.success)
    }

    async fn fill_dropdown(&self, session: &Session, field: ProfileField, value: &str) -> Result<bool> {
        let Some(target) = session.observe_first(&dropdown_query(field)).await? else {
            return Ok(false);
        };
        if Self::is_mismatch(field, &target) {
            return Ok(false);
        }

        // 先展开，再选择
        session.click(&target).await?;
        session.pause(session.timings().action_delay).await;
        let outcome = session
            .act(PageAction::Select {
                target,
                option: value.to_string(),
            })
            .await?;
        session.pause(session.timings().action_delay).await;
        Ok(outcome.success)
    }

    async fn answer_radio(&self, session: &Session, field: ProfileField, answer: &str) -> Result<bool> {
        let Some(question) = session.observe_first(&radio_query(field)).await? else {
            return Ok(false);
        };
        if Self::is_mismatch(field, &question) {
            return Ok(false);
        }

        let instruction = format!(
            "Click the \"{}\" option of the question \"{}\"",
            answer, question.description
        );
        let outcome = session.act(PageAction::Instruction(instruction)).await?;
        session.pause(session.timings().action_delay).await;
        Ok(outcome.success)
    }

    async fn upload_document(&self, session: &Session, document: DocumentKind, path: &Path) -> Result<bool> {
        let Some(target) = session.observe_first(&upload_query(document)).await? else {
            return Ok(false);
        };

        let state: AttachmentState = session
            .extract_as(
                &attachment_query(document),
                &serde_json::json!({ "attached": "boolean" }),
            )
            .await?;
        if state.attached {
            debug!("{} 已上传，跳过", document.label());
            return Ok(false);
        }

        let outcome = session
            .act(PageAction::Upload {
                target,
                path: path.to_path_buf(),
            })
            .await?;
        session.pause(session.timings().action_delay).await;
        Ok(outcome.success)
    }
}
