//! internet_search 工具：联网搜索（Tavily），供 Reviewer 核查营业时间、票价、交通等
//!
//! 每次调用依次上报 call → (result | error) → end 事件；end 由守卫在任何退出路径上补发，且总是最后一条。
//! 凭据在每次搜索时从环境变量重新读取；缺失凭据或服务端失败都以 "Search error: ..." 字符串返回，
//! 不向调用方抛错，便于 Agent 把它当作普通工具输出来处理。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use html2text::from_read;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SearchSection;
use crate::tools::events::ToolEvent;
use crate::tools::redact::{redact, redact_str};
use crate::tools::schema::{search_args_schema, SearchArgs};
use crate::tools::{Tool, ToolContext};

pub const SEARCH_TOOL_NAME: &str = "internet_search";
pub const SEARCH_ERROR_PREFIX: &str = "Search error:";
pub const NO_RESULTS: &str = "No results found.";
/// 结果字段缺失时的占位
const MISSING_FIELD: &str = "N/A";
/// result 事件预览的最大字符数
const PREVIEW_CHARS: usize = 400;

/// 搜索服务返回的一条结果
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            url: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("missing {0} in environment.")]
    MissingCredential(String),

    #[error("empty query.")]
    EmptyQuery,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl SearchError {
    /// 是否为鉴权类失败（给出更具体的提示）
    pub fn is_auth(&self) -> bool {
        match self {
            SearchError::Unauthorized(_) => true,
            SearchError::Http { status, .. } if *status == 401 || *status == 403 => true,
            other => {
                let msg = other.to_string();
                msg.contains("API key") || msg.contains("Unauthorized")
            }
        }
    }
}

/// 搜索服务抽象（Tavily / 测试桩）
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        api_key: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily 搜索 API
pub struct TavilyProvider {
    client: Client,
    endpoint: String,
}

impl TavilyProvider {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(
        &self,
        query: &str,
        api_key: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let body = json!({
            "api_key": api_key,
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = resp.text().await.unwrap_or_default();
            return Err(SearchError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), text)));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SearchError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        let parsed: TavilyResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.results)
    }
}

/// 判断内容是否像 HTML（需提取可读文本）
fn looks_like_html(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with("<!")
        || s.starts_with("<html")
        || s.starts_with("<HTML")
        || (s.len() > 20 && s.contains('<') && (s.contains("</") || s.contains("<p")))
}

/// 结果内容压成单行；HTML 片段先转为纯文本
fn single_line(content: &str) -> String {
    let text = if looks_like_html(content) {
        match from_read(content.as_bytes(), 200) {
            Ok(t) if !t.trim().is_empty() => t,
            _ => content.to_string(),
        }
    } else {
        content.to_string()
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 每条结果一行 "- <title>: <content>"；无结果时返回 "No results found."
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter()
        .map(|h| {
            let title = h.title.as_deref().map(single_line);
            let content = h.content.as_deref().map(single_line);
            format!(
                "- {}: {}",
                title.as_deref().unwrap_or(MISSING_FIELD),
                content.as_deref().unwrap_or(MISSING_FIELD)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// result 事件的预览：前 400 字符（超出追加 …）再脱敏
fn preview(output: &str) -> String {
    let truncated = if output.chars().count() > PREVIEW_CHARS {
        output.chars().take(PREVIEW_CHARS).collect::<String>() + "…"
    } else {
        output.to_string()
    };
    redact_str(&truncated)
}

/// 函数退出时补发 end 事件
struct EndGuard<'a> {
    ctx: &'a ToolContext,
}

impl Drop for EndGuard<'_> {
    fn drop(&mut self) {
        self.ctx.emit(ToolEvent::End {
            tool: SEARCH_TOOL_NAME.to_string(),
        });
    }
}

/// internet_search 工具
pub struct SearchTool {
    provider: Arc<dyn SearchProvider>,
    api_key_env: String,
    max_results: usize,
}

impl SearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>, api_key_env: impl Into<String>, max_results: usize) -> Self {
        Self {
            provider,
            api_key_env: api_key_env.into(),
            max_results,
        }
    }

    /// 按 [tools.search] 配置创建 Tavily 搜索工具
    pub fn from_config(cfg: &SearchSection) -> Self {
        let provider = Arc::new(TavilyProvider::new(cfg.endpoint.clone(), cfg.timeout_secs));
        Self::new(provider, cfg.api_key_env.clone(), cfg.max_results)
    }

    /// 每次调用都重新读取，容忍启动后才写入的环境变量
    fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    fn friendly_error(&self, err: &SearchError) -> String {
        let msg = err.to_string();
        if err.is_auth() {
            format!(
                "{} Invalid Tavily API key. Please check your {} in the environment. Error: {}",
                SEARCH_ERROR_PREFIX, self.api_key_env, msg
            )
        } else {
            format!("{} {}", SEARCH_ERROR_PREFIX, msg)
        }
    }

    /// 执行一次搜索并返回给 Agent 的文本（失败也以文本返回）
    pub async fn search(&self, query: &str, ctx: &ToolContext) -> String {
        ctx.emit(ToolEvent::Call {
            tool: SEARCH_TOOL_NAME.to_string(),
            args: json!({ "query": redact(&Value::String(query.to_string())) }),
        });
        let _end = EndGuard { ctx };

        let query = query.trim();
        if query.is_empty() {
            let msg = SearchError::EmptyQuery.to_string();
            ctx.emit(ToolEvent::Error {
                tool: SEARCH_TOOL_NAME.to_string(),
                error: msg.clone(),
            });
            return format!("{} {}", SEARCH_ERROR_PREFIX, msg);
        }

        let Some(api_key) = self.api_key() else {
            let msg = SearchError::MissingCredential(self.api_key_env.clone()).to_string();
            tracing::warn!(env = %self.api_key_env, "search credential missing");
            ctx.emit(ToolEvent::Error {
                tool: SEARCH_TOOL_NAME.to_string(),
                error: msg.clone(),
            });
            return format!("{} {}", SEARCH_ERROR_PREFIX, msg);
        };

        match self.provider.search(query, &api_key, self.max_results).await {
            Ok(hits) => {
                let output = format_hits(&hits);
                tracing::info!(hits = hits.len(), "internet_search done");
                ctx.emit(ToolEvent::Result {
                    tool: SEARCH_TOOL_NAME.to_string(),
                    preview: preview(&output),
                });
                output
            }
            Err(e) => {
                tracing::warn!(error = %e, "internet_search failed");
                ctx.emit(ToolEvent::Error {
                    tool: SEARCH_TOOL_NAME.to_string(),
                    error: e.to_string(),
                });
                self.friendly_error(&e)
            }
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date facts (opening hours, ticket prices, travel times). Args: {\"query\": \"...\"}."
    }

    fn parameters_schema(&self) -> Value {
        search_args_schema()
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, String> {
        let args: SearchArgs =
            serde_json::from_value(args).map_err(|e| format!("Invalid args: {e}"))?;
        Ok(self.search(&args.query, ctx).await)
    }
}
