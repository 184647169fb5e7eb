//! 申请人上下文格式化 - 业务能力层
//!
//! 把 `ApplicantProfile` 渲染为一段纯文本，作为代理的系统上下文。
//! 纯函数，不访问页面

use crate::models::{yes_no, ApplicantProfile};

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

fn text_or_na(value: &str) -> &str {
    or_na(Some(value))
}

/// 渲染申请人上下文
///
/// # 参数
/// - `profile`: 申请人资料
///
/// # 返回
/// 多段落文本，缺失的可选项显示为 `N/A`
pub fn format_applicant_context(profile: &ApplicantProfile) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("APPLICANT INFORMATION".to_string());
    lines.push(format!("Name: {}", profile.full_name()));
    lines.push(format!("Email: {}", text_or_na(&profile.email)));
    lines.push(format!("Phone: {}", text_or_na(&profile.phone)));
    lines.push(format!("Location: {}", text_or_na(&profile.location)));
    lines.push(format!("City: {}", text_or_na(&profile.city)));
    lines.push(format!("State/Province: {}", or_na(profile.state.as_deref())));
    lines.push(format!("Country: {}", text_or_na(&profile.country)));
    lines.push(format!("Postal Code: {}", or_na(profile.postal_code.as_deref())));

    section(&mut lines, "LINKS");
    lines.push(format!("LinkedIn: {}", or_na(profile.linkedin.as_deref())));
    lines.push(format!("GitHub: {}", or_na(profile.github.as_deref())));
    lines.push(format!("Portfolio: {}", or_na(profile.portfolio.as_deref())));
    lines.push(format!("Website: {}", or_na(profile.website.as_deref())));

    section(&mut lines, "WORK EXPERIENCE");
    entries_or_na(
        &mut lines,
        profile.work_experience.iter().map(|work| {
            format!(
                "- {} at {} ({}–{}): {}",
                work.role,
                work.company,
                work.start_date,
                work.end_date.as_deref().unwrap_or("Present"),
                work.responsibilities.join("; ")
            )
        }),
    );

    section(&mut lines, "EDUCATION");
    entries_or_na(
        &mut lines,
        profile.education.iter().map(|edu| {
            format!(
                "- {} in {} from {} (graduation: {}, GPA: {})",
                edu.degree,
                edu.field,
                edu.institution,
                edu.graduation_date,
                or_na(edu.gpa.as_deref())
            )
        }),
    );

    section(&mut lines, "SKILLS");
    lines.push(format!("Technical: {}", list_or_na(&profile.technical_skills)));
    lines.push(format!("Soft: {}", list_or_na(&profile.soft_skills)));

    section(&mut lines, "PROJECTS");
    entries_or_na(
        &mut lines,
        profile.projects.iter().map(|project| {
            format!(
                "- {}: {} [{}] ({})",
                project.name,
                project.description,
                project.technologies.join(", "),
                or_na(project.link.as_deref())
            )
        }),
    );

    section(&mut lines, "ADDITIONAL INFORMATION");
    lines.push(format!("Cover Letter: {}", or_na(profile.cover_letter.as_deref())));
    lines.push(format!("Availability: {}", or_na(profile.availability.as_deref())));
    lines.push(format!(
        "Work Authorization: {}",
        or_na(profile.work_authorization.as_deref())
    ));
    lines.push(format!(
        "Requires Sponsorship: {}",
        yes_no(profile.requires_sponsorship)
    ));
    lines.push(format!(
        "Willing to Relocate: {}",
        yes_no(profile.willing_to_relocate)
    ));
    lines.push(format!(
        "Expected Salary: {}",
        or_na(profile.expected_salary.as_deref())
    ));
    lines.push(format!("Notice Period: {}", or_na(profile.notice_period.as_deref())));
    lines.push(format!("Resume: {}", profile.resume_path.display()));

    lines.join("\n")
}

/// 段落之间空一行
fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
}

/// 逐条追加，没有条目时写 `N/A`
fn entries_or_na(lines: &mut Vec<String>, entries: impl Iterator<Item = String>) {
    let before = lines.len();
    lines.extend(entries);
    if lines.len() == before {
        lines.push(NOT_AVAILABLE.to_string());
    }
}

fn list_or_na(items: &[String]) -> String {
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::sample_profile;

    #[test]
    fn work_entry_uses_present_for_open_end() {
        let context = format_applicant_context(&sample_profile());
        assert!(context.contains(
            "- Software Developer Intern at Northwind (2024-05–Present): Built REST services; Wrote integration tests"
        ));
    }

    #[test]
    fn skills_are_comma_joined() {
        let context = format_applicant_context(&sample_profile());
        assert!(context.contains("Technical: Rust, TypeScript"));
        assert!(context.contains("Soft: Communication"));
    }

    #[test]
    fn absent_optionals_render_na() {
        let context = format_applicant_context(&sample_profile());
        assert!(context.contains("Portfolio: N/A"));
        assert!(context.contains("Expected Salary: N/A"));
        assert!(context.contains("Requires Sponsorship: No"));
        assert!(context.contains("Willing to Relocate: Yes"));
        assert!(context.ends_with("Resume: /tmp/resume.pdf"));
    }

    #[test]
    fn empty_sections_render_na() {
        let mut profile = sample_profile();
        profile.work_experience.clear();
        profile.technical_skills.clear();
        let context = format_applicant_context(&profile);
        assert!(context.contains("WORK EXPERIENCE\nN/A"));
        assert!(context.contains("Technical: N/A"));
    }

    #[test]
    fn sections_are_separated_by_a_blank_line() {
        let mut profile = sample_profile();
        profile.projects.clear();
        let context = format_applicant_context(&profile);
        assert!(context.starts_with("APPLICANT INFORMATION\nName: "));
        assert!(context.contains("\n\nLINKS\nLinkedIn: "));
        assert!(context.contains("\n\nPROJECTS\nN/A\n\nADDITIONAL INFORMATION\n"));
        assert!(!context.ends_with('\n'));
    }
}
