//! LLM 服务 - 业务能力层
//!
//! 只负责"向 LLM 提问"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, LlmError};

/// JSON 回复解析失败时的最大重试次数
const MAX_JSON_ATTEMPTS: usize = 3;

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API
/// - 把回复解析为 JSON
/// - 不认识页面和表单
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.1)
            .max_tokens(1024u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 要求 LLM 以 JSON 回复并反序列化
    ///
    /// 回复无法解析时重试，最多 3 次
    pub async fn ask_json<T: DeserializeOwned>(&self, user_message: &str, system_message: Option<&str>) -> Result<T> {
        let mut last_error = None;

        for attempt in 1..=MAX_JSON_ATTEMPTS {
            let reply = self.send_to_llm(user_message, system_message).await?;
            match parse_json_reply(&reply).and_then(|v| Ok(serde_json::from_value::<T>(v)?)) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("第 {}/{} 次解析 LLM 回复失败: {}", attempt, MAX_JSON_ATTEMPTS, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::UnparsableReply {
                reply: String::new(),
            }
            .into()
        }))
    }
}

/// 从 LLM 回复中取出 JSON
///
/// 支持 ```json 代码块，以及前后夹杂说明文字的回复
pub fn parse_json_reply(reply: &str) -> Result<JsonValue> {
    let trimmed = reply.trim();
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Ok(value);
    }

    let fence = Regex::new(r"(?s)```(?:json)?\s*(.*?)```")?;
    if let Some(inner) = fence.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<JsonValue>(inner.as_str().trim()) {
            return Ok(value);
        }
    }

    let start = trimmed.find(|c: char| c == '{' || c == '[');
    let end = trimmed.rfind(|c: char| c == '}' || c == ']');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<JsonValue>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(LlmError::UnparsableReply {
        reply: crate::utils::truncate_text(trimmed, 200),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let value = parse_json_reply(r#"{"ids": ["3", "7"]}"#).unwrap();
        assert_eq!(value["ids"][1], "7");
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"attached\": false}\n```";
        assert_eq!(parse_json_reply(reply).unwrap()["attached"], false);
    }

    #[test]
    fn test_parse_json_with_surrounding_text() {
        let reply = "The matching elements are [\"12\", \"4\"] based on the labels.";
        let value = parse_json_reply(reply).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = parse_json_reply("I could not find anything").unwrap_err();
        assert!(err.to_string().contains("无法从LLM回复中解析JSON"));
    }

    #[tokio::test]
    #[ignore] // 需要可用的 LLM 服务：cargo test -- --ignored
    async fn test_live_json_reply() {
        let config = Config::from_env().unwrap();
        let service = LlmService::new(&config);
        let value: JsonValue = service
            .ask_json("Reply with {\"ok\": true}", Some("Reply with JSON only."))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }
}
