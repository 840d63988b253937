//! Query compiler: [`SearchSpec`] in, parameterized SQL out.
//!
//! # Design
//! `QueryBuilder` appends SQL text and bound values in lockstep: the only way
//! to emit a `?` is [`QueryBuilder::push_bind`], which pushes the matching
//! parameter in the same call. Identifiers go through
//! [`QueryBuilder::push_ident`], which refuses anything outside
//! [`IDENTIFIER_ALLOW_LIST`]. No other path writes dynamic text.
//!
//! The compiler never executes anything. The caller hands the
//! [`CompiledQuery`] to whatever executor it owns.

use serde::Serialize;

use crate::error::CompileError;
use crate::types::{OwnerScope, SearchSpec, SqlParam};

/// Personal todos.
pub const PERSONAL_TABLE: &str = "todo_list";

/// Group todos; same columns plus `group_id` and the owning `user_id`.
pub const GROUP_TABLE: &str = "group_todo_list";

/// Columns selected for personal searches, in row order.
pub const PERSONAL_COLUMNS: &[&str] = &[
    "id",
    "posted_date",
    "updated_date",
    "implementation_date",
    "due_date",
    "todo_content",
    "complete_flag",
];

/// Columns selected for group searches, in row order.
pub const GROUP_COLUMNS: &[&str] = &[
    "id",
    "posted_date",
    "updated_date",
    "implementation_date",
    "due_date",
    "todo_content",
    "complete_flag",
    "user_id",
];

/// Every identifier the compiler may splice into SQL text.
pub const IDENTIFIER_ALLOW_LIST: &[&str] = &[
    "todo_list",
    "group_todo_list",
    "id",
    "posted_date",
    "updated_date",
    "implementation_date",
    "due_date",
    "todo_content",
    "complete_flag",
    "user_id",
    "group_id",
    "ASC",
    "DESC",
];

/// Rendered SQL plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl CompiledQuery {
    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }

    /// Fails when the placeholder count and parameter count disagree.
    pub fn check_parity(&self) -> Result<(), CompileError> {
        let placeholders = self.placeholder_count();
        if placeholders == self.params.len() {
            Ok(())
        } else {
            Err(CompileError::PlaceholderMismatch {
                placeholders,
                params: self.params.len(),
            })
        }
    }
}

/// Render a search into SQL text and parameters.
pub fn compile(spec: &SearchSpec) -> Result<CompiledQuery, CompileError> {
    let mut query = QueryBuilder::new();

    let (table, columns) = match spec.owner {
        OwnerScope::Personal { .. } => (PERSONAL_TABLE, PERSONAL_COLUMNS),
        OwnerScope::Group { .. } => (GROUP_TABLE, GROUP_COLUMNS),
    };
    query.push("SELECT");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            query.push(",");
        }
        query.push_ident(column)?;
    }
    query.push("FROM");
    query.push_ident(table)?;

    match &spec.owner {
        OwnerScope::Personal { user_id } => {
            query.and_where();
            query.push_ident("user_id")?;
            query.push("=");
            query.push_bind(SqlParam::Text(user_id.clone()));
        }
        OwnerScope::Group { group_id, user_ids } => {
            query.and_where();
            query.push_ident("group_id")?;
            query.push("=");
            query.push_bind(SqlParam::Int(*group_id));

            match user_ids.as_deref() {
                None | Some([]) => {}
                Some([user_id]) => {
                    query.and_where();
                    query.push_ident("user_id")?;
                    query.push("=");
                    query.push_bind(SqlParam::Text(user_id.clone()));
                }
                Some(many) => {
                    query.and_where();
                    query.push_ident("user_id")?;
                    query.push("IN");
                    query.push_bind_list(many.iter().cloned().map(SqlParam::Text));
                }
            }
        }
    }

    let date_column = spec.date_type.as_sql();
    query.and_where();
    query.push_ident(date_column)?;
    query.push(">=");
    query.push_bind(SqlParam::Date(spec.start_date));
    query.and_where();
    query.push_ident(date_column)?;
    query.push("<=");
    query.push_bind(SqlParam::Date(spec.end_date));

    if let Some(complete) = spec.complete.as_bool() {
        query.and_where();
        query.push_ident("complete_flag")?;
        query.push("=");
        query.push_bind(SqlParam::Bool(complete));
    }

    // % and _ inside the user's text keep their LIKE meaning.
    if let Some(content) = &spec.content {
        query.and_where();
        query.push_ident("todo_content")?;
        query.push("LIKE");
        query.push_bind(SqlParam::Text(format!("%{content}%")));
    }

    query.push("ORDER BY");
    query.push_ident(spec.sort.as_sql())?;
    query.push_ident(spec.sort_type.as_sql())?;
    query.push(",");
    query.push_ident("updated_date")?;
    query.push_ident("DESC")?;

    if let Some(limit) = spec.limit {
        query.push("LIMIT");
        query.push_bind(SqlParam::Int(i64::from(limit)));
    }

    let compiled = query.finish()?;
    tracing::debug!(
        sql = %compiled.sql,
        params = compiled.params.len(),
        "compiled todo search"
    );
    Ok(compiled)
}

/// Append-only SQL writer keeping text and parameters in step.
#[derive(Debug, Default)]
struct QueryBuilder {
    sql: String,
    params: Vec<SqlParam>,
    has_where: bool,
}

impl QueryBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Fixed keyword or operator text. Callers pass literals only.
    fn push(&mut self, fragment: &'static str) {
        self.sql.push(' ');
        self.sql.push_str(fragment);
    }

    fn push_ident(&mut self, ident: &str) -> Result<(), CompileError> {
        if !IDENTIFIER_ALLOW_LIST.contains(&ident) {
            return Err(CompileError::IdentifierNotAllowed(ident.to_string()));
        }
        self.sql.push(' ');
        self.sql.push_str(ident);
        Ok(())
    }

    fn push_bind(&mut self, value: SqlParam) {
        self.sql.push_str(" ?");
        self.params.push(value);
    }

    /// `(?, ?, ...)` with one parameter per value.
    fn push_bind_list(&mut self, values: impl IntoIterator<Item = SqlParam>) {
        self.sql.push_str(" (");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.sql.push('?');
            self.params.push(value);
        }
        self.sql.push(')');
    }

    /// `WHERE` before the first predicate, `AND` before the rest.
    fn and_where(&mut self) {
        if self.has_where {
            self.push("AND");
        } else {
            self.push("WHERE");
            self.has_where = true;
        }
    }

    fn finish(self) -> Result<CompiledQuery, CompileError> {
        let compiled = CompiledQuery {
            sql: normalize_whitespace(&self.sql).replace(" ,", ","),
            params: self.params,
        };
        compiled.check_parity()?;
        Ok(compiled)
    }
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
