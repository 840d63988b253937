//! Runs compiled searches against MySQL.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use thiserror::Error;
use todo_search_core::{CompileError, CompiledQuery, SqlParam, TodoRow};

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("refusing to run query: {0}")]
    Rejected(#[from] CompileError),

    #[error("mysql: {0}")]
    Database(#[from] sqlx::Error),
}

/// Executes a compiled search and returns its rows in result order.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<TodoRow>, ExecutorError>;
}

#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SearchExecutor for MySqlExecutor {
    async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<TodoRow>, ExecutorError> {
        query.check_parity()?;

        let mut statement = sqlx::query(&query.sql);
        for param in &query.params {
            statement = match param {
                SqlParam::Text(text) => statement.bind(text.as_str()),
                SqlParam::Int(value) => statement.bind(*value),
                SqlParam::Date(date) => statement.bind(*date),
                SqlParam::Bool(flag) => statement.bind(*flag),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        tracing::debug!(rows = rows.len(), "todo search executed");
        rows.iter()
            .map(decode_row)
            .collect::<Result<_, _>>()
            .map_err(ExecutorError::from)
    }
}

/// Group searches select an extra `user_id` column.
fn decode_row(row: &MySqlRow) -> Result<TodoRow, sqlx::Error> {
    let user_id = match row.try_column("user_id") {
        Ok(_) => Some(row.try_get("user_id")?),
        Err(_) => None,
    };
    Ok(TodoRow {
        id: row.try_get("id")?,
        posted_date: row.try_get("posted_date")?,
        updated_date: row.try_get("updated_date")?,
        implementation_date: row.try_get("implementation_date")?,
        due_date: row.try_get("due_date")?,
        todo_content: row.try_get("todo_content")?,
        complete_flag: row.try_get("complete_flag")?,
        user_id,
    })
}
