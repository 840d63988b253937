//! Session lookup: `session_id` cookie to user id.

use async_trait::async_trait;
use axum_extra::extract::CookieJar;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store: {0}")]
    Store(#[from] redis::RedisError),
}

/// Resolves a session token to the user id it belongs to.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` when the token is unknown or expired.
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError>;
}

/// Token from the request cookies, if any.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|token| !token.is_empty())
}

/// Sessions stored in Redis as `GET <token> -> user_id`.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl SessionResolver for RedisSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError> {
        let mut connection = self.connection.clone();
        let user_id: Option<String> = connection.get(token).await?;
        Ok(user_id)
    }
}
