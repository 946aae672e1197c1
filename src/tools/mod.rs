//! 工具层：注册表与执行器、事件上报、脱敏、internet_search

pub mod events;
pub mod executor;
pub mod redact;
pub mod registry;
pub mod schema;
pub mod search;

pub use events::{ChannelSink, EventLogger, LoggerGuard, ToolEvent, ToolEventSink};
pub use executor::ToolExecutor;
pub use redact::{redact, redact_str};
pub use registry::{Tool, ToolContext, ToolRegistry};
pub use schema::tool_call_schema_json;
pub use search::{SearchError, SearchHit, SearchProvider, SearchTool, TavilyProvider, SEARCH_TOOL_NAME};
