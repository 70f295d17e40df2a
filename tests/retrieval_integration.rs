//! Integration tests for the checkpoint and retrieval flow.
//!
//! Drives the JSON tool envelope over a filesystem store in a temporary
//! directory, the same path the `waymark` binary takes.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use waymark::models::SearchStrategy;
use waymark::{
    ConversationStore, FilesystemStore, RetrievalEngine, RetrievalRequest, ToolRegistry,
};

struct Fixture {
    dir: TempDir,
    store: Arc<FilesystemStore>,
    tools: ToolRegistry,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = Arc::new(FilesystemStore::open(dir.path()).expect("open store"));
        let tools = ToolRegistry::new(store.clone());
        Self { dir, store, tools }
    }

    fn save(&self, content: &str) -> String {
        let response = self
            .tools
            .execute("save_checkpoint", json!({ "content": content }));
        assert!(response.success, "save failed: {:?}", response.error);
        response.data.unwrap()["entry_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn load(&self, arguments: Value) -> Value {
        let response = self.tools.execute("load_context", arguments);
        assert!(response.success, "load failed: {:?}", response.error);
        response.data.unwrap()
    }
}

fn strategies(data: &Value) -> Vec<&str> {
    data["metrics"]["strategies_used"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect()
}

#[test]
fn test_content_match_stops_at_first_strategy() {
    let fixture = Fixture::new();
    let wanted = fixture.save("TypeScript gives us type safety across the frontend.");
    fixture.save("TypeScript build times keep growing.");
    fixture.save("Rust has memory safety without a garbage collector.");

    let data = fixture.load(json!({ "query": "typescript safety" }));

    let entries = data["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entry_id"], wanted);
    assert_eq!(data["outcome"], "matched");
    assert_eq!(data["strategy"], "content");
    assert!(data.get("fallback").is_none());
    assert_eq!(strategies(&data), vec!["content"]);
    assert_eq!(data["metrics"]["candidates_evaluated"], 3);
}

#[test]
fn test_state_synonym_falls_through_the_cascade() {
    let fixture = Fixture::new();
    fixture.save("I am {state:analytical} about this problem");

    let data = fixture.load(json!({ "query": "analyzing" }));

    assert_eq!(strategies(&data), vec!["content", "facet", "anchor", "state"]);
    assert_eq!(data["strategy"], "state");
    assert_eq!(data["fallback"], "state");
    assert_eq!(data["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn test_miss_explains_itself() {
    let fixture = Fixture::new();
    fixture.save("Reviewed the handlers {state:focused} [context:api_design]");
    fixture.save("Sketching screens [context:frontend]");

    let data = fixture.load(json!({ "query": "kubernetes" }));

    assert!(data["entries"].as_array().unwrap().is_empty());
    assert_eq!(data["outcome"], "no_match");
    assert_eq!(strategies(&data).len(), SearchStrategy::CASCADE.len());
    assert_eq!(
        data["available_filters"]["contexts"],
        json!(["api_design", "frontend"])
    );
    assert_eq!(data["available_filters"]["states"], json!(["focused"]));
    let suggestions = data["suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty() && suggestions.len() <= 2);
}

#[test]
fn test_context_filter_without_query() {
    let fixture = Fixture::new();
    let api = fixture.save("Paginate the list endpoint [context:api]");
    fixture.save("Tighten the colour palette [context:ui]");

    let data = fixture.load(json!({ "contexts": ["api"] }));

    let entries = data["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entry_id"], api);
    assert_eq!(data["outcome"], "unqueried");
    assert!(strategies(&data).is_empty());
}

#[test]
fn test_budget_and_anchors_only() {
    let fixture = Fixture::new();
    fixture.save("We decided to use PostgreSQL for the database.");

    let data = fixture.load(json!({ "max_tokens": 3, "anchors_only": true }));

    let entry = &data["entries"][0];
    assert_eq!(data["total_tokens"], 3);
    assert_eq!(entry["tokens"], 3);
    assert_eq!(entry["truncated"], true);
    assert!(entry.get("content").is_none());
    assert_eq!(entry["anchors"][0]["type"], "decision");
}

#[test]
fn test_unresolved_questions_are_listed() {
    let fixture = Fixture::new();
    fixture.save("Should we shard the users table?");
    fixture.save("We decided to use PostgreSQL for the database.");
    fixture.save("We are stuck on the migration ordering.");

    let response = fixture
        .tools
        .execute("get_anchors", json!({ "unresolved": true }));
    assert!(response.success);
    let anchors = response.data.unwrap();
    let anchors = anchors.as_array().unwrap();
    assert_eq!(anchors.len(), 1);
    assert_eq!(anchors[0]["type"], "question");
    assert_eq!(anchors[0]["requires_answer"], true);

    let response = fixture
        .tools
        .execute("get_anchors", json!({ "type": "blocker", "limit": 5 }));
    let blockers = response.data.unwrap();
    assert_eq!(blockers.as_array().unwrap().len(), 1);
}

#[test]
fn test_entries_survive_reopening_the_store() {
    let fixture = Fixture::new();
    let id = fixture.save("Chose SQLite for the prototype [context:storage]");
    assert_eq!(fixture.store.count().unwrap(), 1);

    let reopened = Arc::new(FilesystemStore::open(fixture.dir.path()).unwrap());
    assert_eq!(reopened.count().unwrap(), 1);

    let engine = RetrievalEngine::new(reopened);
    let result = engine.search(&RetrievalRequest::new("sqlite")).unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].entry_id.as_str(), id);
    assert_eq!(result.search_strategy(), Some(SearchStrategy::Content));
}

#[test]
fn test_bad_arguments_become_error_envelopes() {
    let fixture = Fixture::new();

    let response = fixture
        .tools
        .execute("load_context", json!({ "query": "x", "colour": "blue" }));
    assert!(!response.success);
    assert_eq!(response.error.unwrap().code.as_str(), "INVALID_INPUT");

    let response = fixture
        .tools
        .execute("save_checkpoint", json!({ "content": "   " }));
    assert!(!response.success);

    let response = fixture.tools.execute("launch_rockets", json!({}));
    assert!(!response.success);
    assert!(response.error.unwrap().message.contains("launch_rockets"));

    let response = fixture
        .tools
        .execute("load_context", json!({ "anchor_types": ["epiphany"] }));
    assert!(!response.success);
}

#[test]
fn test_parse_markers_does_not_store() {
    let fixture = Fixture::new();
    let response = fixture.tools.execute(
        "parse_markers",
        json!({ "text": "I am {state:analytical} about this problem" }),
    );
    assert!(response.success);
    let doc = response.data.unwrap();
    assert_eq!(doc["states"].as_array().unwrap().len(), 1);
    assert_eq!(doc["statistics"]["total_markers"], 1);
    assert_eq!(fixture.store.count().unwrap(), 0);
}
