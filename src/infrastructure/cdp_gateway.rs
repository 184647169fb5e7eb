//! CDP + LLM 网关 - 基础设施层
//!
//! `PageGateway` / `AutonomousAgent` 的一个具体实现：
//! - 页面内脚本给可交互元素打上句柄并生成快照
//! - LLM 按自然语言查询在快照中挑选元素
//! - 动作通过脚本（点击/填写/选择）或 CDP 命令（上传文件）完成

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::error::{AppError, GatewayError};
use crate::infrastructure::gateway::{
    ActOutcome, AgentOutcome, AgentTask, AutonomousAgent, Candidate, PageAction, PageGateway,
};
use crate::infrastructure::js_executor::{element_selector, JsExecutor, HANDLE_ATTRIBUTE};
use crate::infrastructure::session::looks_like_submit;
use crate::services::LlmService;

/// 发给 LLM 的页面正文最多字符数
const PAGE_TEXT_LIMIT: usize = 12_000;

/// 快照最多包含的元素数
const SNAPSHOT_LIMIT: usize = 300;

const OBSERVE_SYSTEM: &str = "You locate elements on a web page. You receive a numbered list of interactive elements and a request. Reply with JSON only: {\"ids\": [\"<id>\", ...]} ordered by relevance. Reply {\"ids\": []} when nothing on the page matches the request.";

const EXTRACT_SYSTEM: &str = "You answer questions about a web page. Reply with JSON only, matching the requested shape exactly.";

const AGENT_SYSTEM: &str = "You fill job application forms one action at a time. Never click a button that submits the application. Reply with JSON only: {\"done\": bool, \"success\": bool, \"action\": \"click\" | \"fill\" | \"select\", \"id\": \"<element id>\", \"value\": \"<text or option>\"}. Set done=true when the instruction is complete or impossible.";

/// 元素快照脚本
const SNAPSHOT_JS: &str = r#"
(() => {
    const ATTR = '__ATTR__';
    const LIMIT = __LIMIT__;
    const selector = 'input:not([type=hidden]), textarea, select, button, a[href], [role=button], [role=link], [role=radio], [role=checkbox], [role=combobox], [role=option], [role=alert], [aria-invalid=true], iframe';
    let seq = Number(document.body ? (document.body.getAttribute(ATTR + '-seq') || 0) : 0);
    const out = [];
    for (const el of document.querySelectorAll(selector)) {
        const rect = el.getBoundingClientRect();
        const isFile = el.tagName === 'INPUT' && el.type === 'file';
        if (!isFile && rect.width === 0 && rect.height === 0) continue;
        if (!el.getAttribute(ATTR)) el.setAttribute(ATTR, String(++seq));
        let label = '';
        if (el.id) {
            const l = document.querySelector('label[for="' + CSS.escape(el.id) + '"]');
            if (l) label = l.innerText;
        }
        if (!label && el.closest('label')) label = el.closest('label').innerText;
        if (!label && el.closest('fieldset') && el.closest('fieldset').querySelector('legend')) {
            label = el.closest('fieldset').querySelector('legend').innerText;
        }
        label = label || el.getAttribute('aria-label') || el.placeholder || el.innerText || el.title || el.name || el.src || '';
        out.push({
            id: el.getAttribute(ATTR),
            tag: el.tagName.toLowerCase(),
            type: (el.type || el.getAttribute('role') || '').toString(),
            label: label.replace(/\s+/g, ' ').trim().slice(0, 160),
            value: (el.value === undefined || el.value === null ? '' : String(el.value)).slice(0, 80),
            checked: !!el.checked,
            required: !!el.required || el.getAttribute('aria-required') === 'true',
        });
        if (out.length >= LIMIT) break;
    }
    if (document.body) document.body.setAttribute(ATTR + '-seq', String(seq));
    return out;
})()
"#;

const CLICK_BODY: &str = "el.click(); return true;";

const FILL_BODY: &str = r#"
    el.focus();
    const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
    const setter = Object.getOwnPropertyDescriptor(proto, 'value');
    if (setter && setter.set) { setter.set.call(el, arg); } else { el.value = arg; }
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    el.blur();
    return true;
"#;

const SELECT_BODY: &str = r#"
    const wanted = String(arg).toLowerCase();
    if (el.tagName === 'SELECT') {
        const opt = Array.from(el.options).find(o => o.text.toLowerCase().includes(wanted) || o.value.toLowerCase() === wanted);
        if (!opt) return false;
        el.value = opt.value;
        el.dispatchEvent(new Event('change', { bubbles: true }));
        return true;
    }
    const options = Array.from(document.querySelectorAll('[role=option], li, [role=menuitem]'))
        .filter(o => o.getBoundingClientRect().height > 0);
    const match = options.find(o => o.innerText.trim().toLowerCase() === wanted)
        || options.find(o => o.innerText.toLowerCase().includes(wanted));
    if (!match) return false;
    match.click();
    return true;
"#;

/// 快照中的一个元素
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ElementSnapshot {
    id: String,
    tag: String,
    #[serde(rename = "type", default)]
    input_type: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    required: bool,
}

impl ElementSnapshot {
    /// 候选元素的可读描述
    ///
    /// 只含可见标签和标签名，不含 `type` 属性
    fn describe(&self) -> String {
        let mut description = format!("{} [{}]", self.label, self.tag).trim().to_string();
        if self.required {
            description.push_str(" (required)");
        }
        description
    }

    fn prompt_line(&self) -> String {
        format!(
            "{} | {} {} | {} | value={} | checked={} | required={}",
            self.id, self.tag, self.input_type, self.label, self.value, self.checked, self.required
        )
    }
}

#[derive(Debug, Deserialize)]
struct ObserveReply {
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AgentStep {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    action: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

/// CDP + LLM 网关
pub struct CdpGateway {
    executor: Arc<JsExecutor>,
    llm: Arc<LlmService>,
}

impl CdpGateway {
    pub fn new(executor: Arc<JsExecutor>, llm: Arc<LlmService>) -> Self {
        Self { executor, llm }
    }

    async fn snapshot(&self) -> Result<Vec<ElementSnapshot>> {
        let js = SNAPSHOT_JS
            .replace("__ATTR__", HANDLE_ATTRIBUTE)
            .replace("__LIMIT__", &SNAPSHOT_LIMIT.to_string());
        self.executor.eval_as(js).await
    }

    async fn page_text(&self) -> Result<String> {
        let js = format!(
            "document.body ? document.body.innerText.slice(0, {}) : ''",
            PAGE_TEXT_LIMIT
        );
        self.executor.eval_as(js).await
    }

    async fn observe_elements(&self, query: &str) -> Result<Vec<Candidate>> {
        let elements = self.snapshot().await?;
        if elements.is_empty() {
            return Ok(vec![]);
        }

        let listing = elements
            .iter()
            .map(ElementSnapshot::prompt_line)
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Request: {}\n\nElements (id | tag type | label | state):\n{}",
            query, listing
        );

        let reply: ObserveReply = self.llm.ask_json(&prompt, Some(OBSERVE_SYSTEM)).await?;
        let candidates: Vec<Candidate> = reply
            .ids
            .iter()
            .filter_map(|id| elements.iter().find(|e| &e.id == id))
            .map(|e| Candidate::new(e.describe(), e.id.clone()))
            .collect();

        debug!("观察 \"{}\" -> {} 个候选", query, candidates.len());
        Ok(candidates)
    }

    /// 执行动作；自然语言指令交给单步代理
    async fn perform(&self, action: &PageAction) -> Result<ActOutcome> {
        match action {
            PageAction::Upload { target, path } => self.upload(target, path).await,
            PageAction::Instruction(text) => {
                let outcome = self.run_steps(&AgentTask::new(text.clone(), 1)).await?;
                Ok(ActOutcome {
                    success: outcome.success,
                    message: None,
                })
            }
            _ => self.perform_on_element(action).await,
        }
    }

    /// 通过页面脚本执行点击/填写/选择
    async fn perform_on_element(&self, action: &PageAction) -> Result<ActOutcome> {
        let (handle, body, arg) = match action {
            PageAction::Click(target) => (target.handle.as_str(), CLICK_BODY, JsonValue::Null),
            PageAction::Fill { target, value } => (target.handle.as_str(), FILL_BODY, json!(value)),
            PageAction::Select { target, option } => (target.handle.as_str(), SELECT_BODY, json!(option)),
            other => {
                return Err(AppError::action_failed(other.verb(), "不能通过页面脚本执行").into());
            }
        };

        match self.executor.eval_on_element::<bool>(handle, body, &arg).await? {
            None => Err(GatewayError::ElementNotFound {
                handle: handle.to_string(),
            }
            .into()),
            Some(true) => Ok(ActOutcome::ok()),
            Some(false) => Ok(ActOutcome::rejected(format!("{} 未生效", action.verb()))),
        }
    }

    async fn upload(&self, target: &Candidate, path: &std::path::Path) -> Result<ActOutcome> {
        let element = self
            .executor
            .page()
            .find_element(element_selector(target.handle.as_str()))
            .await
            .map_err(|_| GatewayError::ElementNotFound {
                handle: target.handle.to_string(),
            })?;

        let params = SetFileInputFilesParams::builder()
            .files(vec![path.to_string_lossy().to_string()])
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(|e| AppError::action_failed("upload", e))?;
        self.executor.page().execute(params).await?;
        Ok(ActOutcome::ok())
    }

    /// 多步代理循环：每步重新快照，由 LLM 选出下一个动作
    async fn run_steps(&self, task: &AgentTask) -> Result<AgentOutcome> {
        let system = match &task.context {
            Some(context) => format!("{}\n\n{}", AGENT_SYSTEM, context),
            None => AGENT_SYSTEM.to_string(),
        };
        let mut history: Vec<String> = Vec::new();
        let mut acted = false;

        for step in 1..=task.max_steps.max(1) {
            let elements = self.snapshot().await?;
            let listing = elements
                .iter()
                .map(ElementSnapshot::prompt_line)
                .collect::<Vec<_>>()
                .join("\n");
            let prompt = format!(
                "Instruction: {}\n\nSteps taken so far:\n{}\n\nElements (id | tag type | label | state):\n{}",
                task.instruction,
                if history.is_empty() { "none".to_string() } else { history.join("\n") },
                listing
            );

            let plan: AgentStep = self.llm.ask_json(&prompt, Some(system.as_str())).await?;
            if plan.done {
                return Ok(AgentOutcome {
                    success: plan.success.unwrap_or(acted),
                });
            }

            let Some(element) = plan
                .id
                .as_deref()
                .and_then(|id| elements.iter().find(|e| e.id == id))
            else {
                history.push(format!("step {}: no valid element chosen", step));
                continue;
            };

            let target = Candidate::new(element.describe(), element.id.clone());
            let value = plan.value.clone().unwrap_or_default();
            let action = match plan.action.as_str() {
                "click" if looks_like_submit(&target.description) => {
                    warn!("代理试图点击提交按钮，已拒绝: {}", target.description);
                    history.push(format!("step {}: refused to click the submit control", step));
                    continue;
                }
                "click" => PageAction::Click(target),
                "fill" => PageAction::Fill { target, value },
                "select" => PageAction::Select { target, option: value },
                other => {
                    history.push(format!("step {}: unsupported action '{}'", step, other));
                    continue;
                }
            };

            match self.perform_on_element(&action).await {
                Ok(outcome) if outcome.success => {
                    acted = true;
                    history.push(format!("step {}: {} on {} succeeded", step, action.verb(), element.id));
                }
                Ok(outcome) => history.push(format!(
                    "step {}: {} on {} had no effect {}",
                    step,
                    action.verb(),
                    element.id,
                    outcome.message.unwrap_or_default()
                )),
                Err(e) => history.push(format!("step {}: {} failed: {}", step, action.verb(), e)),
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        Ok(AgentOutcome { success: acted })
    }
}

#[async_trait]
impl PageGateway for CdpGateway {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    async fn observe(&self, query: &str, timeout: Option<Duration>) -> Result<Vec<Candidate>> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.observe_elements(query))
                .await
                .map_err(|_| anyhow!("观察超时 ({}ms): {}", limit.as_millis(), query))?,
            None => self.observe_elements(query).await,
        }
    }

    async fn act(&self, action: &PageAction) -> Result<ActOutcome> {
        self.perform(action).await
    }

    async fn extract(&self, query: &str, shape: &JsonValue) -> Result<JsonValue> {
        let text = self.page_text().await?;
        let elements = self.snapshot().await?;
        let listing = elements
            .iter()
            .map(ElementSnapshot::prompt_line)
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Question: {}\n\nReply with JSON of this shape: {}\n\nPage text:\n{}\n\nElements:\n{}",
            query, shape, text, listing
        );
        self.llm.ask_json(&prompt, Some(EXTRACT_SYSTEM)).await
    }

    async fn wait_for_settle(&self) -> Result<()> {
        loop {
            if self.executor.ready_state().await? == "complete" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        // 给异步渲染留一点时间
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(())
    }
}

#[async_trait]
impl AutonomousAgent for CdpGateway {
    async fn execute(&self, task: &AgentTask) -> Result<AgentOutcome> {
        self.run_steps(task).await
    }
}
