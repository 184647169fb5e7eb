use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppResult, ConfigError};
use crate::models::CaptchaPolicy;

/// 浏览器获取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserMode {
    /// 连接到已开启远程调试端口的浏览器
    Connect,
    /// 自行启动无头浏览器
    Headless,
}

impl FromStr for BrowserMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "connect" => Ok(Self::Connect),
            "headless" => Ok(Self::Headless),
            other => Err(ConfigError::InvalidValue {
                name: "BROWSER_MODE".to_string(),
                value: other.to_string(),
                allowed: "connect, headless".to_string(),
            }),
        }
    }
}

/// 表单遍历引擎的各项上限
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineLimits {
    /// 职位列表最多翻页数
    pub max_listing_pages: usize,
    /// 表单最多页数
    pub max_form_pages: usize,
    /// 表单循环总次数上限
    pub max_iterations: usize,
    /// 连续校验错误上限，超过即失败
    pub max_validation_failures: usize,
    /// 连续无进展次数，达到即视为卡住
    pub max_no_progress: usize,
    /// 同一页上无法导航的循环上限
    pub max_cycles_without_navigation: usize,
    /// 每轮最多交给代理处理的字段数
    pub max_fields_per_cycle: usize,
    /// 单个字段的代理步数
    pub field_agent_steps: usize,
    /// 修正校验错误的代理步数
    pub error_fix_agent_steps: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_listing_pages: 5,
            max_form_pages: 10,
            max_iterations: 50,
            max_validation_failures: 3,
            max_no_progress: 3,
            max_cycles_without_navigation: 3,
            max_fields_per_cycle: 12,
            field_agent_steps: 3,
            error_fix_agent_steps: 3,
        }
    }
}

/// 各处等待时长
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timings {
    /// 页面稳定等待上限
    pub settle_timeout: Duration,
    /// 稳定等待超时后的固定宽限
    pub settle_grace: Duration,
    /// 弹窗探测超时
    pub popup_timeout: Duration,
    /// 点击申请按钮后等待表单渲染
    pub form_render_delay: Duration,
    /// 每轮开始时的缓冲
    pub cycle_delay: Duration,
    /// 单个动作之后的停顿
    pub action_delay: Duration,
    /// 未找到提交/下一步时的重试间隔
    pub retry_probe_delay: Duration,
    /// 职位之间的随机延迟下限
    pub inter_job_delay_min: Duration,
    /// 职位之间的随机延迟上限
    pub inter_job_delay_max: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_timeout: Duration::from_millis(10_000),
            settle_grace: Duration::from_millis(2_000),
            popup_timeout: Duration::from_millis(3_000),
            form_render_delay: Duration::from_millis(3_000),
            cycle_delay: Duration::from_millis(1_500),
            action_delay: Duration::from_millis(300),
            retry_probe_delay: Duration::from_millis(2_000),
            inter_job_delay_min: Duration::from_millis(3_000),
            inter_job_delay_max: Duration::from_millis(5_000),
        }
    }
}

impl Timings {
    /// 所有延迟为零，测试用
    pub fn instant() -> Self {
        Self {
            settle_timeout: Duration::from_millis(50),
            settle_grace: Duration::ZERO,
            popup_timeout: Duration::from_millis(50),
            form_render_delay: Duration::ZERO,
            cycle_delay: Duration::ZERO,
            action_delay: Duration::ZERO,
            retry_probe_delay: Duration::ZERO,
            inter_job_delay_min: Duration::ZERO,
            inter_job_delay_max: Duration::ZERO,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器获取方式
    pub browser_mode: BrowserMode,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 无头模式下的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 申请人资料文件
    pub profile_path: String,
    /// 职位列表文件（TOML 或 JSON）
    pub jobs_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 批次结果 JSON 报告
    pub report_file: String,
    /// 未成功职位追加写入的文件
    pub warn_file: String,
    /// 遇到验证码时的结果
    pub captcha_policy: CaptchaPolicy,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 职位搜索代理 ---
    /// 设置后从代理搜索职位，而不是读取 jobs_path
    pub job_search_url: Option<String>,
    pub job_search_query: String,
    pub job_search_location: Option<String>,
    pub job_search_type: Option<String>,
    // --- 引擎参数 ---
    pub limits: EngineLimits,
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_mode: BrowserMode::Connect,
            browser_debug_port: 9222,
            chrome_executable: None,
            profile_path: "profile.toml".to_string(),
            jobs_path: "jobs.toml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            report_file: "report.json".to_string(),
            warn_file: "warn.txt".to_string(),
            captcha_policy: CaptchaPolicy::Failed,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            job_search_url: None,
            job_search_query: "software engineer intern".to_string(),
            job_search_location: None,
            job_search_type: None,
            limits: EngineLimits::default(),
            timings: Timings::default(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    ///
    /// # 返回
    /// 值无法解析时返回 `ConfigError`
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 按给定的查找函数读取配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let default = Self::default();
        let text = |name: &str, fallback: String| lookup(name).unwrap_or(fallback);
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let limits = EngineLimits {
            max_listing_pages: parse_var(&lookup, "MAX_LISTING_PAGES", default.limits.max_listing_pages)?,
            max_form_pages: parse_var(&lookup, "MAX_FORM_PAGES", default.limits.max_form_pages)?,
            max_iterations: parse_var(&lookup, "MAX_FORM_ITERATIONS", default.limits.max_iterations)?,
            ..default.limits
        };

        Ok(Self {
            browser_mode: parse_var(&lookup, "BROWSER_MODE", default.browser_mode)?,
            browser_debug_port: parse_var(&lookup, "BROWSER_DEBUG_PORT", default.browser_debug_port)?,
            chrome_executable: optional("CHROME_EXECUTABLE"),
            profile_path: text("PROFILE_PATH", default.profile_path),
            jobs_path: text("JOBS_PATH", default.jobs_path),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", default.verbose_logging)?,
            output_log_file: text("OUTPUT_LOG_FILE", default.output_log_file),
            report_file: text("REPORT_FILE", default.report_file),
            warn_file: text("WARN_FILE", default.warn_file),
            captcha_policy: parse_var(&lookup, "CAPTCHA_OUTCOME", default.captcha_policy)?,
            llm_api_key: text("LLM_API_KEY", default.llm_api_key),
            llm_api_base_url: text("LLM_API_BASE_URL", default.llm_api_base_url),
            llm_model_name: text("LLM_MODEL_NAME", default.llm_model_name),
            job_search_url: optional("JOB_SEARCH_URL"),
            job_search_query: text("JOB_SEARCH_QUERY", default.job_search_query),
            job_search_location: optional("JOB_SEARCH_LOCATION"),
            job_search_type: optional("JOB_SEARCH_TYPE"),
            limits,
            timings: default.timings,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, fallback: T) -> AppResult<T>
where
    T: FromStr,
{
    match lookup(name) {
        None => Ok(fallback),
        Some(raw) if raw.trim().is_empty() => Ok(fallback),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: raw.clone(),
                expected_type: std::any::type_name::<T>().to_string(),
            }
            .into()
        }),
    }
}
