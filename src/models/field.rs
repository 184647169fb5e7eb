//! 表单字段描述
//!
//! 每轮循环从网关的候选元素构造，只在本轮内有效

use std::fmt::Display;

use crate::infrastructure::{Candidate, LocatorHandle};

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Textarea,
    Dropdown,
    Radio,
    Checkbox,
    File,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::File => "file",
        };
        f.write_str(name)
    }
}

/// 判断字段是否必填
pub type RequiredPredicate = fn(&str) -> bool;

/// 默认判断：描述中包含 `*` 或 "required"（不区分大小写）
pub fn default_required_predicate(description: &str) -> bool {
    description.contains('*') || description.to_lowercase().contains("required")
}

/// 表单字段
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub description: String,
    pub kind: FieldKind,
    pub required: bool,
    pub handle: LocatorHandle,
}

impl FieldDescriptor {
    pub fn from_candidate(candidate: Candidate, kind: FieldKind, is_required: RequiredPredicate) -> Self {
        let required = is_required(&candidate.description);
        Self {
            description: candidate.description,
            kind,
            required,
            handle: candidate.handle,
        }
    }
}
