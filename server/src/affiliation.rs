//! Group-membership check delegated to the user service.
//!
//! # Design
//! The user service answers `GET /groups/{group_id}/users/{user_id}` with 200
//! for a member and 400 for a non-member. Any other status, a transport
//! failure, or a timeout is an error, and the handler turns every error into
//! a 500 so a flaky peer never looks like a bad request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::config::Timeouts;

const MAX_IDLE_PER_HOST: usize = 16;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affiliation {
    Member,
    NotMember,
}

#[derive(Debug, Error)]
pub enum AffiliationError {
    #[error("user service url {0:?} is not a valid base url")]
    InvalidUrl(String),

    #[error("user service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("user service sent no response headers within {0:?}")]
    HeaderTimeout(Duration),

    #[error("user service answered with status {0}")]
    UnexpectedStatus(u16),
}

#[async_trait]
pub trait AffiliationVerifier: Send + Sync {
    async fn verify(&self, group_id: i64, user_id: &str) -> Result<Affiliation, AffiliationError>;
}

/// Map the user service's status code to an answer.
pub fn classify(status: StatusCode) -> Result<Affiliation, AffiliationError> {
    match status {
        StatusCode::OK => Ok(Affiliation::Member),
        StatusCode::BAD_REQUEST => Ok(Affiliation::NotMember),
        other => Err(AffiliationError::UnexpectedStatus(other.as_u16())),
    }
}

/// `reqwest`-backed verifier sharing one pooled client.
#[derive(Debug, Clone)]
pub struct HttpAffiliationVerifier {
    client: reqwest::Client,
    base_url: Url,
    header_timeout: Duration,
}

impl HttpAffiliationVerifier {
    pub fn new(base_url: &str, timeouts: &Timeouts) -> Result<Self, AffiliationError> {
        let parsed = Url::parse(base_url)
            .map_err(|_| AffiliationError::InvalidUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(AffiliationError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeouts.request)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
            header_timeout: timeouts.response_headers,
        })
    }

    /// Probe URL with each path segment percent-encoded.
    pub fn probe_url(&self, group_id: i64, user_id: &str) -> Url {
        let group = group_id.to_string();
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["groups", group.as_str(), "users", user_id]);
        }
        url
    }
}

#[async_trait]
impl AffiliationVerifier for HttpAffiliationVerifier {
    async fn verify(&self, group_id: i64, user_id: &str) -> Result<Affiliation, AffiliationError> {
        let url = self.probe_url(group_id, user_id);
        // `send` resolves once the response headers are in.
        let response = tokio::time::timeout(self.header_timeout, self.client.get(url).send())
            .await
            .map_err(|_| AffiliationError::HeaderTimeout(self.header_timeout))??;
        let answer = classify(response.status());
        tracing::debug!(
            group_id,
            user_id,
            status = response.status().as_u16(),
            "affiliation probe"
        );
        answer
    }
}
