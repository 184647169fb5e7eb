//! 集成测试共用的脚本化浏览器
//!
//! 用内存状态模拟职位列表页和多页申请表，按查询语句路由观察结果，
//! 并记录所有动作，便于断言"从不点击提交"等性质

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use auto_apply::config::{Config, Timings};
use auto_apply::infrastructure::{
    looks_like_submit, ActOutcome, AgentOutcome, AgentTask, AutonomousAgent, Candidate,
    PageAction, PageGateway, Session,
};
use auto_apply::models::{ApplicantProfile, FieldKind, Job};
use auto_apply::services::field_classifier::ProfileField;
use auto_apply::services::job_locator::{
    APPLY_CONTROL_QUERY, BLOCKING_POPUP_QUERY, COOKIE_BANNER_QUERY,
    PAGINATION_QUERY,
};
use auto_apply::services::pattern_filler::{
    attachment_query, dropdown_query, radio_query, text_field_query, upload_query, DocumentKind,
    COMMON_DROPDOWNS, COMMON_RADIOS, COMMON_TEXT_FIELDS, DOCUMENTS,
};
use auto_apply::workflow::queries;

// ========== 测试数据 ==========

pub const PROFILE_TOML: &str = r#"
first_name = "Alex"
last_name = "Tremblay"
email = "a@b.com"
phone = "+1 514 555 0100"
location = "Montreal, QC, Canada"
city = "Montreal"
state = "Quebec"
country = "Canada"
postal_code = "H3A 0G4"
linkedin = "https://linkedin.com/in/alex-tremblay"
technical_skills = ["Rust", "TypeScript"]
soft_skills = ["Communication"]
work_authorization = "Canadian citizen"
requires_sponsorship = false
willing_to_relocate = true
resume_path = "/tmp/resume.pdf"

[[work_experience]]
company = "Northwind"
role = "Software Developer Intern"
start_date = "2024-05"
responsibilities = ["Built REST services"]

[[education]]
institution = "McGill University"
degree = "B.Eng."
field = "Software Engineering"
graduation_date = "2026-05"
"#;

pub fn profile() -> ApplicantProfile {
    toml::from_str(PROFILE_TOML).expect("测试资料应能解析")
}

/// 所有等待为零的配置
pub fn instant_config() -> Config {
    Config {
        timings: Timings::instant(),
        ..Config::default()
    }
}

pub fn job(title: &str, url: Option<&str>) -> Job {
    let job = Job::new(title, "Acme");
    match url {
        Some(url) => job.with_apply_url(url),
        None => job,
    }
}

// ========== 脚本化页面 ==========

#[derive(Debug, Clone)]
pub struct FakeField {
    pub description: String,
    pub kind: FieldKind,
    /// 模式填写会用哪个查询找到它
    pub pattern: Option<ProfileField>,
    /// 代理能否填好
    pub agent_fillable: bool,
    pub value: Option<String>,
}

impl FakeField {
    pub fn new(description: &str, kind: FieldKind) -> Self {
        Self {
            description: description.to_string(),
            kind,
            pattern: None,
            agent_fillable: true,
            value: None,
        }
    }

    pub fn pattern(mut self, field: ProfileField) -> Self {
        self.pattern = Some(field);
        self
    }

    pub fn stubborn(mut self) -> Self {
        self.agent_fillable = false;
        self
    }

    pub fn filled(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FakeUpload {
    pub document: DocumentKind,
    pub attached: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FormPage {
    pub fields: Vec<FakeField>,
    pub uploads: Vec<FakeUpload>,
    pub has_submit: bool,
    pub has_next: bool,
    /// 还会报告校验错误的轮数
    pub validation_error_cycles: usize,
    pub sign_in_wall: bool,
    pub guest_bypass: bool,
    pub captcha: bool,
    pub unchecked_consents: usize,
}

impl FormPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FakeField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn upload(mut self, document: DocumentKind) -> Self {
        self.uploads.push(FakeUpload {
            document,
            attached: None,
        });
        self
    }

    pub fn submit(mut self) -> Self {
        self.has_submit = true;
        self
    }

    pub fn next(mut self) -> Self {
        self.has_next = true;
        self
    }
}

/// 一个职位来源站点
#[derive(Debug, Clone)]
pub struct Site {
    pub listing_pages: usize,
    /// 职位出现在第几页（从1开始）；None 表示不存在
    pub job_on_page: Option<usize>,
    pub has_apply_control: bool,
    /// 点击申请后还要再点一次 "Apply" 才出现表单
    pub needs_form_entry: bool,
    pub form: Vec<FormPage>,
    pub fail_on_locate: bool,
    pub panic_on_locate: bool,
}

impl Site {
    pub fn with_form(form: Vec<FormPage>) -> Self {
        Self {
            listing_pages: 1,
            job_on_page: Some(1),
            has_apply_control: true,
            needs_form_entry: false,
            form,
            fail_on_locate: false,
            panic_on_locate: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub sites: HashMap<String, Site>,
    pub current_url: Option<String>,
    pub listing_page: usize,
    pub in_form: bool,
    pub form_page: usize,
    /// 没有站点时直接使用的表单（FormFlow 单独测试）
    pub standalone_form: Vec<FormPage>,
    pub actions: Vec<String>,
    pub observations: Vec<String>,
    pub agent_tasks: Vec<String>,
    pub submit_clicks: usize,
    pub unknown_queries: HashSet<String>,
}

impl FakeState {
    fn form(&mut self) -> &mut Vec<FormPage> {
        match self.current_url.clone() {
            Some(url) if self.sites.contains_key(&url) => {
                &mut self.sites.get_mut(&url).expect("站点存在").form
            }
            _ => &mut self.standalone_form,
        }
    }

    fn page(&mut self) -> Option<&mut FormPage> {
        if !self.in_form {
            return None;
        }
        let index = self.form_page;
        let form = self.form();
        let last = form.len().checked_sub(1)?;
        form.get_mut(index.min(last))
    }

    fn site(&self) -> Option<&Site> {
        self.current_url.as_ref().and_then(|url| self.sites.get(url))
    }

    fn field_candidates(&mut self, kind: FieldKind) -> Vec<Candidate> {
        match self.page() {
            Some(page) => page
                .fields
                .iter()
                .enumerate()
                .filter(|(_, f)| f.kind == kind && !f.filled())
                .map(|(i, f)| Candidate::new(f.description.clone(), format!("field:{}", i)))
                .collect(),
            None => vec![],
        }
    }

    fn pattern_candidate(&mut self, kind: FieldKind, field: ProfileField) -> Vec<Candidate> {
        match self.page() {
            Some(page) => page
                .fields
                .iter()
                .enumerate()
                .find(|(_, f)| f.kind == kind && f.pattern == Some(field) && !f.filled())
                .map(|(i, f)| Candidate::new(f.description.clone(), format!("field:{}", i)))
                .into_iter()
                .collect(),
            None => vec![],
        }
    }

    fn set_field(&mut self, handle: &str, value: &str) -> bool {
        let Some(index) = handle
            .strip_prefix("field:")
            .and_then(|i| i.parse::<usize>().ok())
        else {
            return false;
        };
        match self.page().and_then(|p| p.fields.get_mut(index)) {
            Some(field) => {
                field.value = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    fn flag(&mut self, f: impl Fn(&FormPage) -> bool) -> bool {
        self.page().map(|p| f(&*p)).unwrap_or(false)
    }

    fn route(&mut self, query: &str) -> Result<Vec<Candidate>> {
        let one = |desc: &str, handle: &str| vec![Candidate::new(desc, handle)];

        if query == COOKIE_BANNER_QUERY || query == BLOCKING_POPUP_QUERY {
            return Ok(vec![]);
        }
        if query.starts_with("Find and click on the job listing") {
            let site = self.site().cloned().ok_or_else(|| anyhow!("没有打开站点"))?;
            if site.panic_on_locate {
                panic!("listing widget crashed");
            }
            if site.fail_on_locate {
                return Err(anyhow!("listing page failed to render"));
            }
            return Ok(if site.job_on_page == Some(self.listing_page) {
                one("Job card: Backend Intern", "listing")
            } else {
                vec![]
            });
        }
        if query == PAGINATION_QUERY {
            let pages = self.site().map(|s| s.listing_pages).unwrap_or(0);
            return Ok(if self.listing_page < pages {
                one("Next page ›", "pagination")
            } else {
                vec![]
            });
        }
        if query == APPLY_CONTROL_QUERY {
            let has = self.site().map(|s| s.has_apply_control).unwrap_or(false);
            return Ok(if has { one("Apply Now", "apply") } else { vec![] });
        }
        if query == queries::APPLY_ENTRY {
            return Ok(if self.in_form {
                vec![]
            } else {
                one("Apply for this job", "entry")
            });
        }
        if query == queries::VALIDATION_ERRORS {
            return Ok(match self.page() {
                Some(page) if page.validation_error_cycles > 0 => {
                    page.validation_error_cycles -= 1;
                    one("Please enter a valid email", "error")
                }
                _ => vec![],
            });
        }
        if query == queries::SIGN_IN_WALL {
            return Ok(if self.flag(|p| p.sign_in_wall) {
                one("Sign in to continue", "wall")
            } else {
                vec![]
            });
        }
        if query == queries::GUEST_BYPASS {
            return Ok(if self.flag(|p| p.guest_bypass) {
                one("Continue as guest", "guest")
            } else {
                vec![]
            });
        }
        if query == queries::CAPTCHA {
            return Ok(if self.flag(|p| p.captcha) {
                one("reCAPTCHA", "captcha")
            } else {
                vec![]
            });
        }
        if query == queries::CONSENT_CHECKBOXES {
            let n = self.page().map(|p| p.unchecked_consents).unwrap_or(0);
            return Ok((0..n)
                .map(|i| Candidate::new("I accept the privacy policy", format!("consent:{}", i)))
                .collect());
        }
        for (kind, q) in [
            (FieldKind::Text, queries::TEXT_FIELDS),
            (FieldKind::Textarea, queries::TEXTAREA_FIELDS),
            (FieldKind::Dropdown, queries::DROPDOWN_FIELDS),
            (FieldKind::Radio, queries::RADIO_GROUPS),
            (FieldKind::Checkbox, queries::CHECKBOX_FIELDS),
        ] {
            if query == q {
                return Ok(self.field_candidates(kind));
            }
        }
        for &field in COMMON_TEXT_FIELDS {
            if query == text_field_query(field) {
                return Ok(self.pattern_candidate(FieldKind::Text, field));
            }
        }
        for &field in COMMON_DROPDOWNS {
            if query == dropdown_query(field) {
                return Ok(self.pattern_candidate(FieldKind::Dropdown, field));
            }
        }
        for &field in COMMON_RADIOS {
            if query == radio_query(field) {
                return Ok(self.pattern_candidate(FieldKind::Radio, field));
            }
        }
        for &document in DOCUMENTS {
            if query == upload_query(document) {
                return Ok(match self.page() {
                    Some(page) => page
                        .uploads
                        .iter()
                        .enumerate()
                        .find(|(_, u)| u.document == document)
                        .map(|(i, _)| Candidate::new(document.label(), format!("upload:{}", i)))
                        .into_iter()
                        .collect(),
                    None => vec![],
                });
            }
        }
        if query == queries::SUBMIT_CONTROL || query == queries::SUBMIT_RETRY {
            return Ok(if self.flag(|p| p.has_submit) {
                one("Submit Application", "submit")
            } else {
                vec![]
            });
        }
        if query == queries::NEXT_CONTROL {
            return Ok(if self.flag(|p| p.has_next) {
                one("Next", "next")
            } else {
                vec![]
            });
        }

        self.unknown_queries.insert(query.to_string());
        Ok(vec![])
    }

    fn click(&mut self, target: &Candidate) {
        if looks_like_submit(&target.description) || target.handle.as_str() == "submit" {
            self.submit_clicks += 1;
        }
        let needs_entry = self.site().map(|s| s.needs_form_entry).unwrap_or(false);
        match target.handle.as_str() {
            "listing" => {}
            "pagination" => self.listing_page += 1,
            "apply" => self.in_form = !needs_entry,
            "entry" => self.in_form = true,
            "next" => self.form_page += 1,
            "guest" => {
                if let Some(page) = self.page() {
                    page.sign_in_wall = false;
                }
            }
            handle if handle.starts_with("consent:") => {
                if let Some(page) = self.page() {
                    page.unchecked_consents = page.unchecked_consents.saturating_sub(1);
                }
            }
            handle if handle.starts_with("field:") => {
                // 下拉框展开；复选框直接勾上
                let checkbox = handle
                    .strip_prefix("field:")
                    .and_then(|i| i.parse::<usize>().ok())
                    .and_then(|i| self.page().and_then(|p| p.fields.get(i).map(|f| f.kind)))
                    == Some(FieldKind::Checkbox);
                if checkbox {
                    self.set_field(handle, "checked");
                }
            }
            _ => {}
        }
    }
}

/// 脚本化浏览器：同时实现网关和代理
#[derive(Default)]
pub struct FakeBrowser {
    state: Mutex<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 直接停在表单上的浏览器
    pub fn on_form(form: Vec<FormPage>) -> Arc<Self> {
        let browser = Self::default();
        {
            let mut state = browser.state();
            state.standalone_form = form;
            state.in_form = true;
        }
        Arc::new(browser)
    }

    pub fn add_site(&self, url: &str, site: Site) {
        self.state().sites.insert(url.to_string(), site);
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn session(self: &Arc<Self>, timings: Timings) -> Session {
        Session::new(self.clone(), self.clone(), timings)
    }

    pub fn count_observations(&self, query: &str) -> usize {
        self.state().observations.iter().filter(|q| *q == query).count()
    }

    pub fn count_actions(&self, prefix: &str) -> usize {
        self.state().actions.iter().filter(|a| a.starts_with(prefix)).count()
    }

    /// 某个表单页上字段的当前值
    pub fn field_value(&self, page: usize, description: &str) -> Option<String> {
        let mut state = self.state();
        let form = state.form();
        form.get(page)?
            .fields
            .iter()
            .find(|f| f.description == description)?
            .value
            .clone()
    }
}

#[async_trait]
impl PageGateway for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        state.actions.push(format!("navigate:{}", url));
        if !state.sites.contains_key(url) {
            return Err(anyhow!("unreachable: {}", url));
        }
        state.current_url = Some(url.to_string());
        state.listing_page = 1;
        state.in_form = false;
        state.form_page = 0;
        Ok(())
    }

    async fn observe(&self, query: &str, _timeout: Option<std::time::Duration>) -> Result<Vec<Candidate>> {
        let mut state = self.state();
        state.observations.push(query.to_string());
        state.route(query)
    }

    async fn act(&self, action: &PageAction) -> Result<ActOutcome> {
        let mut state = self.state();
        match action {
            PageAction::Click(target) => {
                state.actions.push(format!("click:{}", target.handle));
                state.click(target);
                Ok(ActOutcome::ok())
            }
            PageAction::Fill { target, value } => {
                state.actions.push(format!("fill:{}={}", target.description, value));
                Ok(if state.set_field(target.handle.as_str(), value) {
                    ActOutcome::ok()
                } else {
                    ActOutcome::rejected("no such field")
                })
            }
            PageAction::Select { target, option } => {
                state.actions.push(format!("select:{}={}", target.description, option));
                Ok(if state.set_field(target.handle.as_str(), option) {
                    ActOutcome::ok()
                } else {
                    ActOutcome::rejected("no such field")
                })
            }
            PageAction::Upload { target, path } => {
                state.actions.push(format!("upload:{}", target.description));
                let index = target
                    .handle
                    .as_str()
                    .strip_prefix("upload:")
                    .and_then(|i| i.parse::<usize>().ok());
                match (index, state.page()) {
                    (Some(i), Some(page)) if i < page.uploads.len() => {
                        page.uploads[i].attached = Some(path.display().to_string());
                        Ok(ActOutcome::ok())
                    }
                    _ => Ok(ActOutcome::rejected("no such upload")),
                }
            }
            PageAction::Instruction(text) => {
                state.actions.push(format!("instruction:{}", text));
                let target = state.page().and_then(|p| {
                    p.fields
                        .iter()
                        .position(|f| !f.filled() && text.contains(&format!("\"{}\"", f.description)))
                });
                Ok(match target {
                    Some(i) => {
                        let answer = if text.contains("\"Yes\"") { "Yes" } else { "No" };
                        state.set_field(&format!("field:{}", i), answer);
                        ActOutcome::ok()
                    }
                    None => ActOutcome::rejected("nothing to do"),
                })
            }
        }
    }

    async fn extract(&self, query: &str, _shape: &JsonValue) -> Result<JsonValue> {
        let mut state = self.state();
        state.observations.push(query.to_string());
        for &document in DOCUMENTS {
            if query == attachment_query(document) {
                let attached = state
                    .page()
                    .and_then(|p| p.uploads.iter().find(|u| u.document == document))
                    .map(|u| u.attached.is_some())
                    .unwrap_or(false);
                return Ok(json!({ "attached": attached }));
            }
        }
        Err(anyhow!("unexpected extract: {}", query))
    }

    async fn wait_for_settle(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl AutonomousAgent for FakeBrowser {
    async fn execute(&self, task: &AgentTask) -> Result<AgentOutcome> {
        let mut state = self.state();
        state.agent_tasks.push(task.instruction.clone());

        let Some(page) = state.page() else {
            return Ok(AgentOutcome { success: false });
        };
        let target = page.fields.iter_mut().find(|f| {
            !f.filled() && f.agent_fillable && task.instruction.contains(&format!("\"{}\"", f.description))
        });
        Ok(match target {
            Some(field) => {
                field.value = Some("agent".to_string());
                AgentOutcome { success: true }
            }
            None => AgentOutcome {
                success: task.instruction == queries::FIX_VALIDATION,
            },
        })
    }
}
