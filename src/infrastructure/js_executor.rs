//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::BrowserError;

/// 页面元素上的句柄属性，由元素快照脚本写入
pub const HANDLE_ATTRIBUTE: &str = "data-auto-apply-id";

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力，以及按句柄在元素上执行脚本
/// - 不认识 Job / Profile
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、CDP 命令等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 在句柄对应的元素上执行一段函数体
    ///
    /// 函数体中可使用 `el`（目标元素）和 `arg`（传入的 JSON 参数）
    ///
    /// # 返回
    /// 元素不存在时返回 None
    pub async fn eval_on_element<T: DeserializeOwned>(
        &self,
        handle: &str,
        body: &str,
        arg: &JsonValue,
    ) -> Result<Option<T>> {
        let js_code = format!(
            r#"
            (async () => {{
                const el = document.querySelector({selector});
                if (!el) return null;
                const arg = {arg};
                el.scrollIntoView({{ block: 'center' }});
                {body}
            }})()
            "#,
            selector = serde_json::to_string(&element_selector(handle))?,
            arg = serde_json::to_string(arg)?,
            body = body,
        );
        self.eval_as(js_code).await
    }

    /// 当前文档的 readyState
    pub async fn ready_state(&self) -> Result<String> {
        self.eval_as("document.readyState").await
    }
}

/// 句柄对应的 CSS 选择器
pub fn element_selector(handle: &str) -> String {
    format!(r#"[{}="{}"]"#, HANDLE_ATTRIBUTE, handle.replace('"', ""))
}
