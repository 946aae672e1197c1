//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WAYFARER__*` 覆盖（双下划线表示嵌套，如 `WAYFARER__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub agents: AgentsSection,
    pub tools: ToolsSection,
    pub ui: UiSection,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：openai / deepseek；有对应 API Key 时才生效，否则退回 Mock
    #[serde(default = "default_provider")]
    pub provider: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次 LLM 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

/// [agents] 段：两个 Agent 使用的模型与工具循环上限
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsSection {
    #[serde(default = "default_agent_model")]
    pub planner_model: String,
    #[serde(default = "default_agent_model")]
    pub reviewer_model: String,
    /// Reviewer 单次运行内最多调用工具的次数
    #[serde(default = "default_max_tool_steps")]
    pub max_tool_steps: usize,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            planner_model: default_agent_model(),
            reviewer_model: default_agent_model(),
            max_tool_steps: default_max_tool_steps(),
        }
    }
}

fn default_agent_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tool_steps() -> usize {
    8
}

/// [tools] 段：工具超时与搜索配置
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default)]
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            search: SearchSection::default(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    45
}

/// [tools.search] 段：搜索服务端点、凭据变量名、结果条数
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    /// 保存 API Key 的环境变量名（每次搜索时读取）
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_search_endpoint() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_search_timeout_secs() -> u64 {
    30
}

/// [ui] 段
#[derive(Debug, Clone, Deserialize)]
pub struct UiSection {
    /// 工具活动面板保留的最近事件数
    #[serde(default = "default_max_tool_events")]
    pub max_tool_events: usize,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            max_tool_events: default_max_tool_events(),
        }
    }
}

fn default_max_tool_events() -> usize {
    60
}

/// 从 config 目录加载配置，环境变量 WAYFARER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WAYFARER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WAYFARER")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

/// 加载失败时记录警告并使用默认值
pub fn load_config_or_default(config_path: Option<PathBuf>) -> AppConfig {
    load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.tools.search.max_results, 3);
        assert_eq!(cfg.tools.search.api_key_env, "TAVILY_API_KEY");
        assert_eq!(cfg.ui.max_tool_events, 60);
        assert_eq!(cfg.agents.planner_model, "gpt-4o");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[agents]\nreviewer_model = \"gpt-4o-mini\"\nmax_tool_steps = 3\n\n[tools.search]\nmax_results = 2"
        )
        .unwrap();
        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.agents.reviewer_model, "gpt-4o-mini");
        assert_eq!(cfg.agents.max_tool_steps, 3);
        assert_eq!(cfg.agents.planner_model, "gpt-4o");
        assert_eq!(cfg.tools.search.max_results, 2);
        assert_eq!(cfg.tools.search.endpoint, "https://api.tavily.com/search");
    }
}
