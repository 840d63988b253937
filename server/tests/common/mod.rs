//! In-memory collaborators for router tests.
//!
//! Each test file is its own crate, so helpers used by only one of them
//! would otherwise warn as dead code.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use todo_search_core::{CompiledQuery, TodoRow};
use todo_search_server::affiliation::{Affiliation, AffiliationError, AffiliationVerifier};
use todo_search_server::config::Timeouts;
use todo_search_server::executor::{ExecutorError, SearchExecutor};
use todo_search_server::session::{SessionError, SessionResolver};
use todo_search_server::AppState;

pub const ALICE_COOKIE: &str = "session_id=token-alice";

#[derive(Default)]
pub struct StaticSessions(HashMap<String, String>);

#[async_trait]
impl SessionResolver for StaticSessions {
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError> {
        Ok(self.0.get(token).cloned())
    }
}

/// Members are `(group_id, user_id)` pairs; `fail` simulates a broken peer.
#[derive(Default)]
pub struct StaticGroups {
    members: HashSet<(i64, String)>,
    fail: bool,
}

#[async_trait]
impl AffiliationVerifier for StaticGroups {
    async fn verify(&self, group_id: i64, user_id: &str) -> Result<Affiliation, AffiliationError> {
        if self.fail {
            return Err(AffiliationError::UnexpectedStatus(500));
        }
        if self.members.contains(&(group_id, user_id.to_string())) {
            Ok(Affiliation::Member)
        } else {
            Ok(Affiliation::NotMember)
        }
    }
}

/// Returns canned rows and remembers every query it was asked to run.
#[derive(Default)]
pub struct RecordingExecutor {
    rows: Vec<TodoRow>,
    fail: bool,
    delay: Option<Duration>,
    seen: Mutex<Vec<CompiledQuery>>,
}

impl RecordingExecutor {
    pub fn queries(&self) -> Vec<CompiledQuery> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchExecutor for RecordingExecutor {
    async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<TodoRow>, ExecutorError> {
        self.seen.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ExecutorError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.clone())
    }
}

pub struct Harness {
    pub state: AppState,
    pub executor: Arc<RecordingExecutor>,
}

pub struct HarnessBuilder {
    sessions: HashMap<String, String>,
    groups: StaticGroups,
    rows: Vec<TodoRow>,
    executor_fails: bool,
    executor_delay: Option<Duration>,
    timeouts: Timeouts,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert("token-alice".to_string(), "alice".to_string());
        let mut groups = StaticGroups::default();
        groups.members.insert((7, "alice".to_string()));
        Self {
            sessions,
            groups,
            rows: Vec::new(),
            executor_fails: false,
            executor_delay: None,
            timeouts: Timeouts::default(),
        }
    }

    pub fn rows(mut self, rows: Vec<TodoRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn executor_fails(mut self) -> Self {
        self.executor_fails = true;
        self
    }

    /// Make every search take `delay` before answering.
    pub fn executor_delay(mut self, delay: Duration) -> Self {
        self.executor_delay = Some(delay);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    pub fn affiliation_fails(mut self) -> Self {
        self.groups.fail = true;
        self
    }

    pub fn build(self) -> Harness {
        let executor = Arc::new(RecordingExecutor {
            rows: self.rows,
            fail: self.executor_fails,
            delay: self.executor_delay,
            seen: Mutex::new(Vec::new()),
        });
        let state = AppState {
            sessions: Arc::new(StaticSessions(self.sessions)),
            affiliation: Arc::new(self.groups),
            executor: executor.clone(),
            timeouts: self.timeouts,
        };
        Harness { state, executor }
    }
}

pub fn todo_row(id: i64, user_id: Option<&str>) -> TodoRow {
    let posted = NaiveDate::from_ymd_opt(2020, 6, 28)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    TodoRow {
        id,
        posted_date: posted,
        updated_date: posted,
        implementation_date: NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2020, 7, 5).unwrap(),
        todo_content: "買い物".to_string(),
        complete_flag: false,
        user_id: user_id.map(String::from),
    }
}
