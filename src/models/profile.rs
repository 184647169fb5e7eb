//! 申请人资料
//!
//! 一次运行中只读，从 TOML 文件加载

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 工作经历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub role: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

/// 教育经历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub graduation_date: String,
    #[serde(default)]
    pub gpa: Option<String>,
}

/// 项目经历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// 申请人资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// 完整的所在地描述，例如 "Montreal, QC, Canada"
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub work_authorization: Option<String>,
    #[serde(default)]
    pub requires_sponsorship: bool,
    #[serde(default)]
    pub willing_to_relocate: bool,
    #[serde(default)]
    pub expected_salary: Option<String>,
    #[serde(default)]
    pub notice_period: Option<String>,

    pub resume_path: PathBuf,
    #[serde(default)]
    pub cover_letter_path: Option<PathBuf>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
}

impl ApplicantProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// 最近一段工作经历（列表中的第一项）
    pub fn current_job(&self) -> Option<&WorkExperience> {
        self.work_experience.first()
    }

    /// 最高/最近的教育经历（列表中的第一项）
    pub fn primary_education(&self) -> Option<&Education> {
        self.education.first()
    }

    /// 是否拥有工作许可
    pub fn is_work_authorized(&self) -> bool {
        self.work_authorization
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}

/// 布尔值转换为表单上的 Yes/No
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> ApplicantProfile {
    ApplicantProfile {
        first_name: "Alex".to_string(),
        last_name: "Tremblay".to_string(),
        email: "alex.tremblay@example.com".to_string(),
        phone: "+1 514 555 0134".to_string(),
        location: "Montreal, QC, Canada".to_string(),
        city: "Montreal".to_string(),
        state: Some("Quebec".to_string()),
        country: "Canada".to_string(),
        postal_code: Some("H3A 0G4".to_string()),
        linkedin: Some("https://linkedin.com/in/alextremblay".to_string()),
        github: Some("https://github.com/alextremblay".to_string()),
        portfolio: None,
        website: None,
        work_experience: vec![WorkExperience {
            company: "Northwind".to_string(),
            role: "Software Developer Intern".to_string(),
            start_date: "2024-05".to_string(),
            end_date: None,
            responsibilities: vec![
                "Built REST services".to_string(),
                "Wrote integration tests".to_string(),
            ],
        }],
        education: vec![Education {
            institution: "McGill University".to_string(),
            degree: "B.Eng.".to_string(),
            field: "Software Engineering".to_string(),
            graduation_date: "2026-05".to_string(),
            gpa: Some("3.8".to_string()),
        }],
        technical_skills: vec!["Rust".to_string(), "TypeScript".to_string()],
        soft_skills: vec!["Communication".to_string()],
        projects: vec![Project {
            name: "Transit Tracker".to_string(),
            description: "Real-time bus arrival predictions".to_string(),
            technologies: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            link: None,
            start_date: None,
            end_date: None,
        }],
        cover_letter: None,
        availability: Some("May 2026".to_string()),
        work_authorization: Some("Canadian citizen".to_string()),
        requires_sponsorship: false,
        willing_to_relocate: true,
        expected_salary: None,
        notice_period: None,
        resume_path: PathBuf::from("/tmp/resume.pdf"),
        cover_letter_path: None,
        transcript_path: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_parts() {
        assert_eq!(sample_profile().full_name(), "Alex Tremblay");
    }

    #[test]
    fn blank_authorization_is_not_authorized() {
        let mut profile = sample_profile();
        assert!(profile.is_work_authorized());
        profile.work_authorization = Some("  ".to_string());
        assert!(!profile.is_work_authorized());
    }

    #[test]
    fn minimal_toml_profile_parses() {
        let raw = r#"
            first_name = "Sam"
            last_name = "Lee"
            email = "sam@example.com"
            phone = "555-0100"
            resume_path = "resume.pdf"
        "#;
        let profile: ApplicantProfile = toml::from_str(raw).unwrap();
        assert_eq!(profile.full_name(), "Sam Lee");
        assert!(profile.work_experience.is_empty());
        assert!(!profile.requires_sponsorship);
    }
}
