//! 表单字段分类 - 业务能力层
//!
//! 静态同义词表把多语言的字段标签映射到资料中的字段。
//! 每个字段知道自己期望的输入类型，以及如何从资料中取值

use phf::phf_map;

use crate::models::{yes_no, ApplicantProfile, FieldKind};

/// 资料中可用于自动填写的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Street,
    City,
    State,
    Country,
    PostalCode,
    LinkedIn,
    GitHub,
    Portfolio,
    Institution,
    Degree,
    Major,
    Gpa,
    GraduationDate,
    CurrentCompany,
    CurrentTitle,
    YearsOfExperience,
    Availability,
    NoticePeriod,
    WorkAuthorization,
    Sponsorship,
    Relocation,
    ExpectedSalary,
    CoverLetter,
}

/// 规范化标签（小写、合并空白）中的同义词 -> 字段
static LABEL_SYNONYMS: phf::Map<&'static str, ProfileField> = phf_map! {
    "first name" => ProfileField::FirstName,
    "firstname" => ProfileField::FirstName,
    "given name" => ProfileField::FirstName,
    "forename" => ProfileField::FirstName,
    "prénom" => ProfileField::FirstName,

    "last name" => ProfileField::LastName,
    "lastname" => ProfileField::LastName,
    "surname" => ProfileField::LastName,
    "family name" => ProfileField::LastName,
    "nom" => ProfileField::LastName,
    "nom de famille" => ProfileField::LastName,

    "full name" => ProfileField::FullName,
    "name" => ProfileField::FullName,
    "nom complet" => ProfileField::FullName,

    "email" => ProfileField::Email,
    "e-mail" => ProfileField::Email,
    "email address" => ProfileField::Email,
    "mail" => ProfileField::Email,
    "courriel" => ProfileField::Email,

    "phone" => ProfileField::Phone,
    "phone number" => ProfileField::Phone,
    "telephone" => ProfileField::Phone,
    "téléphone" => ProfileField::Phone,
    "mobile" => ProfileField::Phone,
    "cell" => ProfileField::Phone,
    "contact number" => ProfileField::Phone,

    "street" => ProfileField::Street,
    "address" => ProfileField::Street,
    "address line" => ProfileField::Street,
    "rue" => ProfileField::Street,
    "adresse" => ProfileField::Street,

    "city" => ProfileField::City,
    "town" => ProfileField::City,
    "suburb" => ProfileField::City,
    "ville" => ProfileField::City,

    "state" => ProfileField::State,
    "province" => ProfileField::State,
    "state/province" => ProfileField::State,
    "region" => ProfileField::State,
    "région" => ProfileField::State,
    "territory" => ProfileField::State,
    "état" => ProfileField::State,

    "country" => ProfileField::Country,
    "nation" => ProfileField::Country,
    "pays" => ProfileField::Country,

    "postal code" => ProfileField::PostalCode,
    "zip code" => ProfileField::PostalCode,
    "zip" => ProfileField::PostalCode,
    "postcode" => ProfileField::PostalCode,
    "code postal" => ProfileField::PostalCode,

    "linkedin" => ProfileField::LinkedIn,
    "linkedin url" => ProfileField::LinkedIn,
    "linkedin profile" => ProfileField::LinkedIn,

    "github" => ProfileField::GitHub,
    "github url" => ProfileField::GitHub,
    "github profile" => ProfileField::GitHub,

    "portfolio" => ProfileField::Portfolio,
    "website" => ProfileField::Portfolio,
    "personal website" => ProfileField::Portfolio,
    "site web" => ProfileField::Portfolio,

    "university" => ProfileField::Institution,
    "college" => ProfileField::Institution,
    "school" => ProfileField::Institution,
    "institution" => ProfileField::Institution,
    "université" => ProfileField::Institution,
    "école" => ProfileField::Institution,

    "degree" => ProfileField::Degree,
    "qualification" => ProfileField::Degree,
    "diplôme" => ProfileField::Degree,

    "major" => ProfileField::Major,
    "field of study" => ProfileField::Major,
    "program" => ProfileField::Major,
    "programme" => ProfileField::Major,

    "gpa" => ProfileField::Gpa,
    "grade point average" => ProfileField::Gpa,

    "graduation date" => ProfileField::GraduationDate,
    "graduation year" => ProfileField::GraduationDate,
    "expected graduation" => ProfileField::GraduationDate,

    "current company" => ProfileField::CurrentCompany,
    "current employer" => ProfileField::CurrentCompany,
    "company name" => ProfileField::CurrentCompany,

    "current title" => ProfileField::CurrentTitle,
    "job title" => ProfileField::CurrentTitle,
    "position" => ProfileField::CurrentTitle,
    "role" => ProfileField::CurrentTitle,
    "poste" => ProfileField::CurrentTitle,

    "years of experience" => ProfileField::YearsOfExperience,
    "work experience" => ProfileField::YearsOfExperience,

    "start date" => ProfileField::Availability,
    "available to start" => ProfileField::Availability,
    "availability" => ProfileField::Availability,
    "when can you start" => ProfileField::Availability,
    "date de début" => ProfileField::Availability,
    "disponibilité" => ProfileField::Availability,

    "notice period" => ProfileField::NoticePeriod,
    "délai de préavis" => ProfileField::NoticePeriod,

    "work authorization" => ProfileField::WorkAuthorization,
    "authorized to work" => ProfileField::WorkAuthorization,
    "legal to work" => ProfileField::WorkAuthorization,
    "right to work" => ProfileField::WorkAuthorization,
    "autorisation de travail" => ProfileField::WorkAuthorization,

    "sponsorship" => ProfileField::Sponsorship,
    "require sponsorship" => ProfileField::Sponsorship,
    "need sponsorship" => ProfileField::Sponsorship,
    "visa sponsorship" => ProfileField::Sponsorship,
    "sponsorship required" => ProfileField::Sponsorship,

    "relocate" => ProfileField::Relocation,
    "relocation" => ProfileField::Relocation,
    "willing to relocate" => ProfileField::Relocation,
    "can you relocate" => ProfileField::Relocation,

    "salary" => ProfileField::ExpectedSalary,
    "salary expectation" => ProfileField::ExpectedSalary,
    "expected salary" => ProfileField::ExpectedSalary,
    "desired salary" => ProfileField::ExpectedSalary,
    "salary requirement" => ProfileField::ExpectedSalary,
    "salaire" => ProfileField::ExpectedSalary,

    "cover letter" => ProfileField::CoverLetter,
    "why you" => ProfileField::CoverLetter,
    "why are you interested" => ProfileField::CoverLetter,
    "why do you want" => ProfileField::CoverLetter,
    "tell us about yourself" => ProfileField::CoverLetter,
    "describe yourself" => ProfileField::CoverLetter,
    "lettre de motivation" => ProfileField::CoverLetter,
};

impl ProfileField {
    /// 用于查询语句的可读名称
    pub fn label(self) -> &'static str {
        match self {
            ProfileField::FirstName => "first name",
            ProfileField::LastName => "last name",
            ProfileField::FullName => "full name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone number",
            ProfileField::Street => "street address",
            ProfileField::City => "city",
            ProfileField::State => "state or province",
            ProfileField::Country => "country",
            ProfileField::PostalCode => "postal code or zip code",
            ProfileField::LinkedIn => "LinkedIn URL",
            ProfileField::GitHub => "GitHub URL",
            ProfileField::Portfolio => "portfolio or website",
            ProfileField::Institution => "university or school",
            ProfileField::Degree => "degree",
            ProfileField::Major => "field of study",
            ProfileField::Gpa => "GPA",
            ProfileField::GraduationDate => "graduation date",
            ProfileField::CurrentCompany => "current company",
            ProfileField::CurrentTitle => "current job title",
            ProfileField::YearsOfExperience => "years of experience",
            ProfileField::Availability => "availability or start date",
            ProfileField::NoticePeriod => "notice period",
            ProfileField::WorkAuthorization => "work authorization",
            ProfileField::Sponsorship => "visa sponsorship",
            ProfileField::Relocation => "willingness to relocate",
            ProfileField::ExpectedSalary => "expected salary",
            ProfileField::CoverLetter => "cover letter or motivation",
        }
    }

    /// 期望的输入类型
    pub fn kind(self) -> FieldKind {
        match self {
            ProfileField::WorkAuthorization
            | ProfileField::Sponsorship
            | ProfileField::Relocation => FieldKind::Radio,
            ProfileField::Country | ProfileField::State => FieldKind::Dropdown,
            ProfileField::CoverLetter => FieldKind::Textarea,
            _ => FieldKind::Text,
        }
    }

    /// 从资料中取值；空值返回 None，不做占位
    pub fn value(self, profile: &ApplicantProfile) -> Option<String> {
        let work = profile.current_job();
        let edu = profile.primary_education();
        let raw: Option<String> = match self {
            ProfileField::FirstName => Some(profile.first_name.clone()),
            ProfileField::LastName => Some(profile.last_name.clone()),
            ProfileField::FullName => Some(profile.full_name()),
            ProfileField::Email => Some(profile.email.clone()),
            ProfileField::Phone => Some(profile.phone.clone()),
            ProfileField::Street => Some(profile.location.clone()),
            ProfileField::City => Some(profile.city.clone()),
            ProfileField::State => profile.state.clone(),
            ProfileField::Country => Some(profile.country.clone()),
            ProfileField::PostalCode => profile.postal_code.clone(),
            ProfileField::LinkedIn => profile.linkedin.clone(),
            ProfileField::GitHub => profile.github.clone(),
            ProfileField::Portfolio => profile
                .portfolio
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| profile.website.clone()),
            ProfileField::Institution => edu.map(|e| e.institution.clone()),
            ProfileField::Degree => edu.map(|e| e.degree.clone()),
            ProfileField::Major => edu.map(|e| e.field.clone()),
            ProfileField::Gpa => edu.and_then(|e| e.gpa.clone()),
            ProfileField::GraduationDate => edu.map(|e| e.graduation_date.clone()),
            ProfileField::CurrentCompany => work.map(|w| w.company.clone()),
            ProfileField::CurrentTitle => work.map(|w| w.role.clone()),
            ProfileField::YearsOfExperience => match profile.work_experience.len() {
                0 => None,
                n => Some(n.to_string()),
            },
            ProfileField::Availability => profile.availability.clone(),
            ProfileField::NoticePeriod => profile.notice_period.clone(),
            ProfileField::WorkAuthorization => {
                Some(yes_no(profile.is_work_authorized()).to_string())
            }
            ProfileField::Sponsorship => Some(yes_no(profile.requires_sponsorship).to_string()),
            ProfileField::Relocation => Some(yes_no(profile.willing_to_relocate).to_string()),
            ProfileField::ExpectedSalary => profile.expected_salary.clone(),
            ProfileField::CoverLetter => profile.cover_letter.clone(),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
}

/// 规范化标签：小写，去掉标点（保留 `-` 和 `/`），合并空白
pub fn normalize_label(label: &str) -> String {
    let cleaned: String = label
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '/' || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `needle` 是否作为完整词组出现在 `haystack` 中
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// 分类字段标签：取规范化标签中包含的最长同义词
///
/// # 返回
/// 没有任何同义词匹配时返回 None
pub fn classify_label(label: &str) -> Option<ProfileField> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }
    LABEL_SYNONYMS
        .entries()
        .filter(|(synonym, _)| contains_phrase(&normalized, synonym))
        .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
        .map(|(_, field)| *field)
}
