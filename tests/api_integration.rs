//! Integration tests for the Taskboard REST API.
//!
//! Each test spins up an Axum server on a random port backed by an
//! in-memory database and exercises the real HTTP contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use taskboard::config::AppConfig;
use taskboard::state::AppState;
use taskboard::store::{Database, LibSqlBackend};
use taskboard::tasks::task_routes;
use taskboard::workers::worker_routes;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Start the full router on a random port, return the base URL.
async fn start_server() -> String {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let state = AppState::new(db, AppConfig::default());
    let app = task_routes(state.clone()).merge(worker_routes(state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

/// Sign up a worker and return (token, worker id).
async fn sign_up(client: &reqwest::Client, base: &str, username: &str) -> (String, String) {
    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "username": username,
            "password": "correct-horse-battery",
            "first_name": "Test",
            "last_name": "Worker",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "sign-up should succeed");

    let body: Value = resp.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["worker"]["id"].as_str().unwrap().to_string(),
    )
}

/// Create a task as the given worker; returns the task id.
async fn create_task(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    name: &str,
    priority: &str,
    deadline: &str,
    assignees: &[&str],
) -> String {
    let resp = client
        .post(format!("{base}/api/tasks"))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "priority": priority,
            "deadline": deadline,
            "assignees": assignees,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201, "task creation should succeed");

    let body: Value = resp.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

/// Fetch a task list endpoint and return the task names in order.
async fn list_names(client: &reqwest::Client, url: &str, token: Option<&str>) -> Vec<String> {
    let mut req = client.get(url);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let tasks = body.as_array().cloned().unwrap_or_default();
    tasks
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

fn today() -> String {
    Utc::now().date_naive().to_string()
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

// ── Sign-up and profiles ────────────────────────────────────────────

#[tokio::test]
async fn sign_up_provisions_profile() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, worker_id) = sign_up(&client, &base, "alice").await;

        // Exactly one profile with default avatar, owned by alice.
        let resp = client
            .get(format!("{base}/api/profile"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let profile: Value = resp.json().await.unwrap();
        assert_eq!(profile["worker_id"].as_str().unwrap(), worker_id);
        assert_eq!(profile["avatar"], "default.jpg");
        assert_eq!(profile["bio"], "");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        sign_up(&client, &base, "alice").await;

        let resp = client
            .post(format!("{base}/api/auth/signup"))
            .json(&json!({
                "username": "alice",
                "password": "another-password",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_signup_payload_rejected() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/api/auth/signup"))
            .json(&json!({
                "username": "bob",
                "password": "short",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);

        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("password"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn login_and_logout_flow() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        sign_up(&client, &base, "alice").await;

        // Wrong password is rejected.
        let resp = client
            .post(format!("{base}/api/auth/login"))
            .json(&json!({"username": "alice", "password": "wrong-password"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        // Correct password issues a fresh token.
        let resp = client
            .post(format!("{base}/api/auth/login"))
            .json(&json!({"username": "alice", "password": "correct-horse-battery"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_string();

        // Logout revokes it.
        let resp = client
            .post(format!("{base}/api/auth/logout"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = client
            .get(format!("{base}/api/tasks/mine"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn profile_update_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, _) = sign_up(&client, &base, "alice").await;

        let resp = client
            .put(format!("{base}/api/profile"))
            .bearer_auth(&token)
            .json(&json!({"bio": "Rustacean", "phone": "+1-555-0100"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let profile: Value = resp.json().await.unwrap();
        assert_eq!(profile["bio"], "Rustacean");
        assert_eq!(profile["phone"], "+1-555-0100");
        // Untouched fields keep their defaults.
        assert_eq!(profile["avatar"], "default.jpg");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn positions_are_listed_for_sign_up_form() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;

        // Open endpoint — no token needed.
        let resp = reqwest::get(format!("{base}/api/positions")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let positions: Value = resp.json().await.unwrap();
        let names: Vec<&str> = positions
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Developer"));
    })
    .await
    .expect("test timed out");
}

// ── Bucket views ────────────────────────────────────────────────────

#[tokio::test]
async fn critical_task_visible_only_in_matching_buckets() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (alice_token, alice_id) = sign_up(&client, &base, "alice").await;
        let (bob_token, _) = sign_up(&client, &base, "bob").await;

        create_task(
            &client,
            &base,
            &alice_token,
            "Fix bug",
            "critical",
            &today(),
            &[&alice_id],
        )
        .await;

        // Appears in alice's critical and today lists.
        let critical =
            list_names(&client, &format!("{base}/api/tasks/critical"), Some(&alice_token)).await;
        assert_eq!(critical, vec!["Fix bug"]);

        let today_list =
            list_names(&client, &format!("{base}/api/tasks/today"), Some(&alice_token)).await;
        assert_eq!(today_list, vec!["Fix bug"]);

        // Not in alice's other priority buckets.
        for bucket in ["important", "normal", "low"] {
            let list =
                list_names(&client, &format!("{base}/api/tasks/{bucket}"), Some(&alice_token))
                    .await;
            assert!(list.is_empty(), "{bucket} list should be empty");
        }

        // Not in bob's lists at all.
        let bobs =
            list_names(&client, &format!("{base}/api/tasks/critical"), Some(&bob_token)).await;
        assert!(bobs.is_empty());
        let bobs = list_names(&client, &format!("{base}/api/tasks/mine"), Some(&bob_token)).await;
        assert!(bobs.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bucket_views_require_authentication() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();

        for bucket in ["critical", "important", "normal", "low", "today", "mine"] {
            let resp = client
                .get(format!("{base}/api/tasks/{bucket}"))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 401, "{bucket} should require auth");
        }

        // The index stays open.
        let resp = client.get(format!("{base}/api/tasks")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn name_filter_narrows_lists() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, worker_id) = sign_up(&client, &base, "alice").await;

        for name in ["Fix login BUG", "Ship feature", "Debug flaky test"] {
            create_task(&client, &base, &token, name, "normal", "2026-12-01", &[&worker_id]).await;
        }

        // Case-insensitive substring match on the mine view.
        let filtered = list_names(
            &client,
            &format!("{base}/api/tasks/mine?name=bug"),
            Some(&token),
        )
        .await;
        assert_eq!(filtered, vec!["Debug flaky test", "Fix login BUG"]);

        // Blank filter is ignored.
        let all = list_names(
            &client,
            &format!("{base}/api/tasks/mine?name="),
            Some(&token),
        )
        .await;
        assert_eq!(all.len(), 3);
    })
    .await
    .expect("test timed out");
}

// ── Index ───────────────────────────────────────────────────────────

#[tokio::test]
async fn index_lists_all_tasks_with_counts() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, worker_id) = sign_up(&client, &base, "alice").await;

        create_task(&client, &base, &token, "Beta task", "low", "2026-12-01", &[]).await;
        create_task(&client, &base, &token, "Alpha task", "critical", "2026-12-01", &[&worker_id])
            .await;

        let resp = client.get(format!("{base}/api/tasks")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();

        // Every task exactly once, in name order, regardless of assignment.
        let names: Vec<&str> = body["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alpha task", "Beta task"]);

        assert_eq!(body["counts"]["tasks"], 2);
        assert_eq!(body["counts"]["workers"], 1);
        assert_eq!(body["priorities"].as_array().unwrap().len(), 4);
    })
    .await
    .expect("test timed out");
}

// ── CRUD ────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_task_applies_partial_changes() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, worker_id) = sign_up(&client, &base, "alice").await;

        let id = create_task(
            &client,
            &base,
            &token,
            "Rotate keys",
            "normal",
            "2026-12-01",
            &[&worker_id],
        )
        .await;

        let resp = client
            .put(format!("{base}/api/tasks/{id}"))
            .bearer_auth(&token)
            .json(&json!({"priority": "critical", "name": "Rotate all keys"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let task: Value = resp.json().await.unwrap();
        assert_eq!(task["name"], "Rotate all keys");
        assert_eq!(task["priority"], "critical");
        // Unchanged fields survive.
        assert_eq!(task["deadline"], "2026-12-01");
        assert_eq!(task["assignees"].as_array().unwrap().len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn delete_missing_task_is_not_found_and_table_unchanged() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, _) = sign_up(&client, &base, "alice").await;

        create_task(&client, &base, &token, "Survivor", "low", "2026-12-01", &[]).await;

        let resp = client
            .delete(format!(
                "{base}/api/tasks/00000000-0000-0000-0000-000000000000"
            ))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client.get(format!("{base}/api/tasks")).send().await.unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["counts"]["tasks"], 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn delete_existing_task_removes_it() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, _) = sign_up(&client, &base, "alice").await;

        let id = create_task(&client, &base, &token, "Ephemeral", "low", "2026-12-01", &[]).await;

        let resp = client
            .delete(format!("{base}/api/tasks/{id}"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = client
            .get(format!("{base}/api/tasks/{id}"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn complete_task_marks_it_done() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, worker_id) = sign_up(&client, &base, "alice").await;

        let id = create_task(
            &client,
            &base,
            &token,
            "Finish report",
            "important",
            "2026-12-01",
            &[&worker_id],
        )
        .await;

        let resp = client
            .post(format!("{base}/api/tasks/{id}/complete"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let task: Value = resp.json().await.unwrap();
        assert_eq!(task["is_completed"], true);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_task_with_invalid_payload_rejected() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, _) = sign_up(&client, &base, "alice").await;

        let resp = client
            .post(format!("{base}/api/tasks"))
            .bearer_auth(&token)
            .json(&json!({
                "name": "   ",
                "priority": "normal",
                "deadline": "2026-12-01",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn task_types_seeded_and_creatable() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let (token, _) = sign_up(&client, &base, "alice").await;

        let resp = reqwest::get(format!("{base}/api/task-types")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let before: Value = resp.json().await.unwrap();
        let count_before = before.as_array().unwrap().len();
        assert!(count_before >= 4, "seed migration should populate task types");

        let resp = client
            .post(format!("{base}/api/task-types"))
            .bearer_auth(&token)
            .json(&json!({"name": "Documentation"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let resp = reqwest::get(format!("{base}/api/task-types")).await.unwrap();
        let after: Value = resp.json().await.unwrap();
        assert_eq!(after.as_array().unwrap().len(), count_before + 1);
    })
    .await
    .expect("test timed out");
}
