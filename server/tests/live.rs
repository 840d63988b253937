//! Search over a real socket.
//!
//! # Design
//! Starts the server on a random port with in-memory collaborators, then
//! drives it with ureq so cookie handling, query decoding, and the response
//! headers are checked exactly as a client sees them.

mod common;

use common::{todo_row, HarnessBuilder, ALICE_COOKIE};

struct Reply {
    status: u16,
    content_type: String,
    body: String,
}

/// Issue a GET, returning 4xx/5xx as data rather than `Err`.
fn fetch(url: &str, cookie: Option<&str>) -> Reply {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut request = agent.get(url);
    if let Some(cookie) = cookie {
        request = request.header("Cookie", cookie);
    }
    let mut response = request.call().expect("HTTP transport error");

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Reply {
        status: response.status().as_u16(),
        content_type,
        body: response.body_mut().read_to_string().unwrap_or_default(),
    }
}

#[test]
fn search_over_http() {
    // Step 1: start the server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let harness = HarnessBuilder::new()
        .rows(vec![todo_row(1, Some("alice"))])
        .build();
    let state = harness.state;

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_search_server::run(listener, state).await
        })
        .unwrap();
    });

    let base = format!("http://{addr}");

    // Step 2: no cookie, 401.
    let reply = fetch(&format!("{base}/todo-list/search"), None);
    assert_eq!(reply.status, 401);

    // Step 3: group search as a member.
    let reply = fetch(
        &format!("{base}/groups/7/todo-list/search?user_id=alice&complete_flag=false"),
        Some(ALICE_COOKIE),
    );
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "application/json; charset=UTF-8");
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body["search_todo_list"][0]["user_id"], "alice");
    assert_eq!(body["search_todo_list"][0]["implementation_date"], "07/01(水)");

    let query = harness.executor.queries().pop().unwrap();
    assert!(query
        .sql
        .contains("WHERE group_id = ? AND user_id = ? AND implementation_date >= ?"));
    assert!(query.sql.contains("AND complete_flag = ?"));
    assert_eq!(query.placeholder_count(), query.params.len());

    // Step 4: parser failure is a 400 and nothing runs.
    let before = harness.executor.queries().len();
    let reply = fetch(
        &format!("{base}/todo-list/search?sort=posted_date"),
        Some(ALICE_COOKIE),
    );
    assert_eq!(reply.status, 400);
    assert!(reply.body.contains("sort"));
    assert_eq!(harness.executor.queries().len(), before);
}
