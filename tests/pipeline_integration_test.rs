//! 端到端：脚本化 LLM + 搜索桩，经 LlmAgentRunner 跑完 Planner → Reviewer，检查会话历史与活动面板

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wayfarer::agents::{AgentSet, LlmAgentRunner};
use wayfarer::config::AgentsSection;
use wayfarer::llm::{LlmClient, Message};
use wayfarer::pipeline::Orchestrator;
use wayfarer::session::{ActivityLevel, ChatRole, SessionAdapter, TRACE_OK};
use wayfarer::tools::{SearchError, SearchHit, SearchProvider, SearchTool, ToolExecutor, ToolRegistry};

const PLAN: &str = "**Day 1**\n- 20:00 Louvre\n- 22:00 Seine cruise";
const TOOL_CALL: &str = "```json\n{\"tool\": \"internet_search\", \"args\": {\"query\": \"Louvre opening hours\"}}\n```";
const REVIEW: &str = "1. **Delta List**\n- Louvre at 8 PM: Museum closes at 6 PM → Move to 2 PM\n\n2. **Validated Itinerary**\n**Day 1**\n- 14:00 Louvre\n- 22:00 Seine cruise";

struct ScriptedLlm {
    replies: Mutex<VecDeque<&'static str>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlm {
    fn new(replies: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().copied().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(str::to_string)
            .ok_or_else(|| "script exhausted".to_string())
    }
}

struct StubProvider {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl SearchProvider for StubProvider {
    async fn search(&self, query: &str, _api_key: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        assert_eq!(max_results, 3);
        self.calls.lock().unwrap().push(query.to_string());
        Ok(vec![
            SearchHit::new("Louvre hours", "Open 9:00 to 18:00, closed Tuesdays"),
            SearchHit::new("Seine cruises", "Evening departures until 22:30"),
        ])
    }
}

fn adapter(llm: Arc<ScriptedLlm>, provider: Arc<StubProvider>, key_env: &str) -> SessionAdapter {
    let mut tools = ToolRegistry::new();
    tools.register(SearchTool::new(provider, key_env, 3));
    let executor = Arc::new(ToolExecutor::new(tools, 10));
    let runner = LlmAgentRunner::new(llm, executor, 4);
    let orchestrator = Orchestrator::new(Arc::new(runner), AgentSet::from_config(&AgentsSection::default()));
    SessionAdapter::new(Arc::new(orchestrator), 60)
}

#[tokio::test]
async fn test_planner_then_reviewer_with_search() {
    std::env::set_var("WAYFARER_IT_SEARCH_KEY", "tvly-test");
    let llm = ScriptedLlm::new(&[PLAN, TOOL_CALL, REVIEW]);
    let provider = Arc::new(StubProvider {
        calls: Mutex::new(Vec::new()),
    });
    let mut adapter = adapter(llm.clone(), provider.clone(), "WAYFARER_IT_SEARCH_KEY");

    let reply = adapter.handle_request("One evening in Paris").await;

    // Planner 收到用户原文，Reviewer 收到 Planner 输出
    let seen = llm.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].last().unwrap().content, "One evening in Paris");
    assert_eq!(seen[1].last().unwrap().content, PLAN);
    let observation = &seen[2].last().unwrap().content;
    assert!(observation.starts_with("Observation from internet_search:"));
    assert!(observation.contains("- Louvre hours: Open 9:00 to 18:00, closed Tuesdays"));
    assert_eq!(*provider.calls.lock().unwrap(), vec!["Louvre opening hours".to_string()]);

    let state = adapter.state();
    assert_eq!(state.len(), 2);
    assert_eq!(state.messages()[0].role, ChatRole::User);
    assert_eq!(state.meta()[1].as_ref().unwrap().trace, TRACE_OK);
    assert_eq!(reply.content, "**Day 1**\n- 14:00 Louvre\n- 22:00 Seine cruise");
    assert_eq!(
        reply.delta_list.as_deref(),
        Some("- Louvre at 8 PM: Museum closes at 6 PM → Move to 2 PM")
    );

    let activity = adapter.snapshot().activity;
    let texts: Vec<&str> = activity.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], "internet_search called with `{\"query\":\"Louvre opening hours\"}`");
    assert!(texts[1].starts_with("internet_search result preview: - Louvre hours"));
    assert_eq!(texts[2], "internet_search finished");
    assert!(!adapter.events().is_installed());
}

#[tokio::test]
async fn test_missing_search_key_is_reported_not_fatal() {
    std::env::remove_var("WAYFARER_IT_ABSENT_KEY");
    let llm = ScriptedLlm::new(&[PLAN, TOOL_CALL, REVIEW]);
    let provider = Arc::new(StubProvider {
        calls: Mutex::new(Vec::new()),
    });
    let mut adapter = adapter(llm.clone(), provider.clone(), "WAYFARER_IT_ABSENT_KEY");

    let reply = adapter.handle_request("Paris").await;
    assert_eq!(reply.content, "**Day 1**\n- 14:00 Louvre\n- 22:00 Seine cruise");
    assert!(provider.calls.lock().unwrap().is_empty());

    let seen = llm.seen.lock().unwrap();
    assert!(seen[2]
        .last()
        .unwrap()
        .content
        .ends_with("Search error: missing WAYFARER_IT_ABSENT_KEY in environment."));

    let activity = adapter.snapshot().activity;
    assert_eq!(activity.len(), 3);
    assert_eq!(activity[1].level, ActivityLevel::Error);
    assert_eq!(activity[2].text, "internet_search finished");
}

#[tokio::test]
async fn test_second_turn_clears_activity_and_keeps_history() {
    std::env::set_var("WAYFARER_IT_SECOND_KEY", "tvly-test");
    let llm = ScriptedLlm::new(&[PLAN, TOOL_CALL, REVIEW, PLAN, REVIEW]);
    let provider = Arc::new(StubProvider {
        calls: Mutex::new(Vec::new()),
    });
    let mut adapter = adapter(llm, provider, "WAYFARER_IT_SECOND_KEY");

    adapter.handle_request("Paris").await;
    adapter.handle_request("Now Lyon").await;

    let snap = adapter.snapshot();
    assert_eq!(snap.history.len(), 4);
    assert_eq!(snap.meta.len(), 4);
    assert!(snap.activity.is_empty());
}
