//! Search endpoints.
//!
//! Both handlers run the same pipeline: session → (group membership) →
//! parse → compile → execute → shape. Every step before execution is
//! synchronous except the two collaborator calls.

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use todo_search_core::{
    compile, parse_group_id, parse_search, shape, ParamError, SearchOwner, SearchSpec,
};

use crate::{
    affiliation::Affiliation,
    error::{json_response, AppError},
    session::session_token,
    AppState,
};

/// `GET /todo-list/search`
pub async fn search_todo_list(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let user_id = authenticate(&state, &jar).await?;
    let spec = parse_search(&query, SearchOwner::Personal { user_id: &user_id })?;
    run_search(&state, &spec).await
}

/// `GET /groups/{group_id}/todo-list/search`
pub async fn search_group_todo_list(
    State(state): State<AppState>,
    group_id: Result<Path<String>, PathRejection>,
    jar: CookieJar,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let user_id = authenticate(&state, &jar).await?;
    let Path(raw_group_id) = group_id.map_err(undecodable_group_id)?;
    let group_id = parse_group_id(&raw_group_id)?;

    match state.affiliation.verify(group_id, &user_id).await? {
        Affiliation::Member => {}
        Affiliation::NotMember => return Err(AppError::NotGroupMember { group_id, user_id }),
    }

    let spec = parse_search(&query, SearchOwner::Group { group_id })?;
    run_search(&state, &spec).await
}

/// `GET /readyz`
pub async fn readyz() -> Response {
    json_response(StatusCode::OK, &json!({ "status": "ok" }))
}

async fn authenticate(state: &AppState, jar: &CookieJar) -> Result<String, AppError> {
    let token = session_token(jar).ok_or(AppError::Unauthenticated)?;
    state
        .sessions
        .resolve(token)
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// axum rejects a segment that is not valid percent-encoded UTF-8 before the
/// handler body runs; report it like any other bad `group_id`.
fn undecodable_group_id(rejection: PathRejection) -> ParamError {
    ParamError::OutOfRange {
        param: "group_id",
        reason: rejection.body_text(),
    }
}

async fn run_search(state: &AppState, spec: &SearchSpec) -> Result<Response, AppError> {
    let compiled = compile(spec)?;
    let limit = state.timeouts.request;
    let rows = tokio::time::timeout(limit, state.executor.fetch(&compiled))
        .await
        .map_err(|_| AppError::Timeout(limit))??;
    tracing::info!(
        group = spec.owner.is_group(),
        rows = rows.len(),
        "todo search completed"
    );
    Ok(json_response(StatusCode::OK, &shape(rows)))
}
