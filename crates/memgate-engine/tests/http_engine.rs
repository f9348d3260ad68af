//! HTTP engine binding tests against a mock Mem0 server.

use memgate_config::{Credentials, EngineConfig};
use memgate_engine::{
    DeleteAllOptions, EngineError, GetMemoriesOptions, HttpMemoryEngine, MemoryEngine,
    SearchMemoriesOptions, StoreOptions,
};
use memgate_protocol::{MemoryEventKind, MemoryScope, Message, Metadata};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;

const API_KEY: &str = "test-key";

fn engine_for(server: &Server) -> HttpMemoryEngine {
    HttpMemoryEngine::new(
        &EngineConfig::with_base_url(server.url()),
        &Credentials::new(API_KEY),
    )
    .expect("engine")
}

fn hobbies() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("category".to_string(), json!("hobbies"));
    metadata
}

/// Path matcher tolerant of a query string suffix.
fn path_with_query(path: &str) -> Matcher {
    Matcher::Regex(format!(r"^{path}(\?.*)?$"))
}

/// Store posts messages, scope and metadata with the token header.
#[tokio::test]
async fn store_posts_messages_with_scope_and_auth() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories/")
        .match_header("authorization", "Token test-key")
        .match_body(Matcher::Json(json!({
            "messages": [{ "role": "user", "content": "Likes cricket" }],
            "user_id": "alice",
            "metadata": { "category": "hobbies" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [{"id": "m-1", "memory": "Likes cricket", "event": "ADD"}]}"#)
        .create_async()
        .await;

    let result = engine_for(&server)
        .store(StoreOptions {
            messages: vec![Message::new("user", "Likes cricket")],
            scope: MemoryScope::user("alice"),
            metadata: hobbies(),
        })
        .await
        .expect("store");

    mock.assert_async().await;
    assert_eq!(result.ids(), vec!["m-1"]);
    assert_eq!(result.results[0].event, MemoryEventKind::Add);
}

/// Store accepts the older bare-array response shape.
#[tokio::test]
async fn store_accepts_bare_event_list() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/memories/")
        .with_status(200)
        .with_body(r#"[{"id": "m-1", "memory": "Vegetarian", "event": "ADD"}, {"id": "m-2", "memory": "Allergic to nuts", "event": "ADD"}]"#)
        .create_async()
        .await;

    let result = engine_for(&server)
        .store(StoreOptions {
            messages: vec![Message::new("user", "I'm vegetarian and allergic to nuts")],
            scope: MemoryScope::user("alex"),
            metadata: Metadata::new(),
        })
        .await
        .expect("store");

    assert_eq!(result.ids(), vec!["m-1", "m-2"]);
    assert_eq!(result.relations, None);
}

/// Only the filters that are set are sent as query parameters.
#[tokio::test]
async fn get_memories_sends_only_present_filters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path_with_query("/memories/"))
        .match_query(Matcher::Exact("user_id=alice&run_id=r-1".to_string()))
        .with_status(200)
        .with_body(r#"[{"id": "m-1", "memory": "Likes cricket", "user_id": "alice", "run_id": "r-1", "metadata": {"category": "hobbies"}}]"#)
        .create_async()
        .await;

    let scope = MemoryScope {
        user_id: Some("alice".to_string()),
        run_id: Some("r-1".to_string()),
        ..MemoryScope::default()
    };
    let records = engine_for(&server)
        .get_memories(GetMemoriesOptions {
            scope: scope.clone(),
        })
        .await
        .expect("get");

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "Likes cricket");
    assert_eq!(records[0].scope, scope);
    assert_eq!(records[0].metadata, Some(hobbies()));
}

/// List responses wrapped in `results` decode the same as bare arrays.
#[tokio::test]
async fn get_memories_accepts_wrapped_results() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", path_with_query("/memories/"))
        .with_status(200)
        .with_body(r#"{"results": [{"id": "m-9", "memory": "Prefers tea"}]}"#)
        .create_async()
        .await;

    let records = engine_for(&server)
        .get_memories(GetMemoriesOptions::default())
        .await
        .expect("get");
    assert_eq!(records[0].id, "m-9");
}

/// Search posts the query, limit and scope; scores are preserved.
#[tokio::test]
async fn search_posts_query_limit_and_scope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories/search/")
        .match_body(Matcher::Json(json!({
            "query": "What are Alice's hobbies?",
            "limit": 10,
            "user_id": "alice"
        })))
        .with_status(200)
        .with_body(r#"[{"id": "m-1", "memory": "Likes cricket", "user_id": "alice", "score": 0.92}]"#)
        .create_async()
        .await;

    let records = engine_for(&server)
        .search_memories(SearchMemoriesOptions {
            query: "What are Alice's hobbies?".to_string(),
            scope: MemoryScope::user("alice"),
            limit: 10,
        })
        .await
        .expect("search");

    mock.assert_async().await;
    assert_eq!(records[0].score, Some(0.92));
}

/// The configured output format is forwarded on store.
#[tokio::test]
async fn output_format_is_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories/")
        .match_body(Matcher::PartialJson(json!({ "output_format": "v1.1" })))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let config = EngineConfig {
        output_format: Some("v1.1".to_string()),
        ..EngineConfig::with_base_url(server.url())
    };
    let engine = HttpMemoryEngine::new(&config, &Credentials::new(API_KEY)).expect("engine");
    engine
        .store(StoreOptions {
            messages: vec![Message::new("user", "hi")],
            scope: MemoryScope::user("alice"),
            metadata: Metadata::new(),
        })
        .await
        .expect("store");
    mock.assert_async().await;
}

/// Update sends the new text; content is only reported when the engine echoes it.
#[tokio::test]
async fn update_sends_text_without_inventing_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/memories/m-1/")
        .match_body(Matcher::Json(json!({ "text": "Likes tennis" })))
        .with_status(200)
        .with_body(r#"{"message": "Memory updated successfully!"}"#)
        .create_async()
        .await;

    let result = engine_for(&server)
        .update_memory("m-1", "Likes tennis")
        .await
        .expect("update");

    mock.assert_async().await;
    assert_eq!(result.id, "m-1");
    assert_eq!(result.memory, None);
    assert_eq!(result.message.as_deref(), Some("Memory updated successfully!"));
}

/// Content the engine echoes back is what the result carries.
#[tokio::test]
async fn update_reports_engine_echoed_content() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", "/memories/m-1/")
        .with_status(200)
        .with_body(r#"{"id": "m-1", "memory": "Likes tennis (normalized)"}"#)
        .create_async()
        .await;

    let result = engine_for(&server)
        .update_memory("m-1", "Likes tennis")
        .await
        .expect("update");
    assert_eq!(result.memory.as_deref(), Some("Likes tennis (normalized)"));
    assert_eq!(result.message, None);
}

/// A 404 on update becomes `NotFound` naming the requested id.
#[tokio::test]
async fn update_unknown_id_maps_to_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", "/memories/missing/")
        .with_status(404)
        .with_body(r#"{"detail": "Memory not found"}"#)
        .create_async()
        .await;

    let err = engine_for(&server)
        .update_memory("missing", "anything")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("missing".to_string()));
}

/// Engine failures carry status and detail but never the credential.
#[tokio::test]
async fn api_errors_surface_status_and_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", path_with_query("/memories/"))
        .with_status(401)
        .with_body(r#"{"detail": "Invalid API key", "code": "unauthorized"}"#)
        .create_async()
        .await;

    let err = engine_for(&server)
        .get_memories(GetMemoriesOptions {
            scope: MemoryScope::user("alice"),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Api {
            status: 401,
            message: "Invalid API key (code: unauthorized)".to_string(),
        }
    );
    assert!(!err.to_string().contains(API_KEY));
}

/// Bulk delete forwards the scope as query parameters.
#[tokio::test]
async fn delete_all_passes_scope_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", path_with_query("/memories/"))
        .match_query(Matcher::Exact("agent_id=planner".to_string()))
        .with_status(200)
        .with_body(r#"{"message": "Memories deleted successfully!"}"#)
        .create_async()
        .await;

    let result = engine_for(&server)
        .delete_all_memories(DeleteAllOptions {
            scope: MemoryScope {
                agent_id: Some("planner".to_string()),
                ..MemoryScope::default()
            },
        })
        .await
        .expect("delete all");

    mock.assert_async().await;
    assert_eq!(result.message, "Memories deleted successfully!");
}

/// Single delete tolerates an empty success body.
#[tokio::test]
async fn delete_memory_tolerates_empty_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/memories/m-1/")
        .with_status(204)
        .create_async()
        .await;

    let result = engine_for(&server)
        .delete_memory("m-1")
        .await
        .expect("delete");
    assert_eq!(result.message, "Memory deleted successfully!");
}

/// Reset deletes every entity the engine reports.
#[tokio::test]
async fn reset_deletes_each_entity() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/entities/")
        .with_status(200)
        .with_body(r#"[{"id": "alice", "type": "user"}, {"name": "planner", "type": "agent"}]"#)
        .create_async()
        .await;
    let delete_user = server
        .mock("DELETE", "/entities/user/alice/")
        .with_status(204)
        .create_async()
        .await;
    let delete_agent = server
        .mock("DELETE", "/entities/agent/planner/")
        .with_status(204)
        .create_async()
        .await;

    let result = engine_for(&server).reset().await.expect("reset");

    delete_user.assert_async().await;
    delete_agent.assert_async().await;
    assert_eq!(
        result.message,
        "Memory store reset successfully (entities=2)"
    );
}

/// A failed entity delete reports how many entities were already removed.
#[tokio::test]
async fn reset_failure_reports_progress() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/entities/")
        .with_status(200)
        .with_body(r#"[{"id": "alice", "type": "user"}, {"id": "bob", "type": "user"}]"#)
        .create_async()
        .await;
    let _alice = server
        .mock("DELETE", "/entities/user/alice/")
        .with_status(204)
        .create_async()
        .await;
    let _bob = server
        .mock("DELETE", "/entities/user/bob/")
        .with_status(500)
        .with_body(r#"{"detail": "boom"}"#)
        .create_async()
        .await;

    let err = engine_for(&server).reset().await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Api {
            status: 500,
            message: "boom (reset incomplete, entities_deleted=1 of 2)".to_string(),
        }
    );
}

/// Organization and project ids travel as headers when configured.
#[tokio::test]
async fn organization_and_project_headers_are_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path_with_query("/memories/"))
        .match_header("mem0-organization-id", "org-1")
        .match_header("mem0-project-id", "proj-1")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let config = EngineConfig {
        organization_id: Some("org-1".to_string()),
        project_id: Some("proj-1".to_string()),
        ..EngineConfig::with_base_url(server.url())
    };
    let engine = HttpMemoryEngine::new(&config, &Credentials::new(API_KEY)).expect("engine");
    let records = engine
        .get_memories(GetMemoriesOptions::default())
        .await
        .expect("get");

    mock.assert_async().await;
    assert!(records.is_empty());
}

/// An unreachable engine yields a transport error without the credential.
#[tokio::test]
async fn unreachable_engine_is_a_transport_error() {
    let engine = HttpMemoryEngine::new(
        &EngineConfig::with_base_url("http://127.0.0.1:1"),
        &Credentials::new(API_KEY),
    )
    .expect("engine");
    let err = engine
        .get_memories(GetMemoriesOptions::default())
        .await
        .unwrap_err();
    let EngineError::Transport(message) = &err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.starts_with("connection failed"), "{message}");
    assert!(!message.contains(API_KEY));
}
