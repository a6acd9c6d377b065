//! HTTP client for the progress API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::RemoteError;
use super::{RemoteSkill, RemoteStore, SkillSyncRecord};
use crate::config::Config;
use crate::identity::Identity;

/// A progress row returned by `GET /progress/`
#[derive(Debug, Deserialize)]
struct ProgressRow {
    lesson_id: String,
}

/// Body of `POST /progress/complete`
#[derive(Debug, Serialize)]
struct CompleteLessonRequest<'a> {
    lesson_id: &'a str,
    user_id: &'a str,
    course_id: &'a str,
}

/// Progress API client
pub struct HttpRemote {
    /// HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl HttpRemote {
    /// Create a client for the API configured in `config`
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, failing when the identity has none
    fn authorize(
        request: RequestBuilder,
        identity: &Identity,
    ) -> Result<RequestBuilder, RemoteError> {
        let token = identity
            .token
            .as_deref()
            .ok_or_else(|| RemoteError::MissingToken { user_id: identity.user_id.clone() })?;
        Ok(request.bearer_auth(token))
    }

    /// Map non-success statuses to errors
    async fn check_status(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::ApiError { status: status.as_u16(), message });
        }

        Ok(response)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = Self::check_status(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn completed_lessons(&self, identity: &Identity) -> Result<Vec<String>, RemoteError> {
        let request = Self::authorize(self.client.get(self.url("/progress/")), identity)?
            .query(&[("user_id", identity.user_id.as_str())]);

        let rows: Vec<ProgressRow> = Self::send_json(request).await?;
        debug!("Fetched {} completed lessons for {}", rows.len(), identity.user_id);
        Ok(rows.into_iter().map(|row| row.lesson_id).collect())
    }

    async fn mark_lesson_complete(
        &self,
        identity: &Identity,
        lesson_id: &str,
        course_id: &str,
    ) -> Result<(), RemoteError> {
        let body = CompleteLessonRequest { lesson_id, user_id: &identity.user_id, course_id };
        let request = Self::authorize(self.client.post(self.url("/progress/complete")), identity)?
            .json(&body);

        Self::check_status(request.send().await?).await?;
        Ok(())
    }

    async fn skills(&self, identity: &Identity) -> Result<Vec<RemoteSkill>, RemoteError> {
        let request = Self::authorize(self.client.get(self.url("/progress/skills")), identity)?
            .query(&[("user_id", identity.user_id.as_str())]);

        Self::send_json(request).await
    }

    async fn sync_skills(
        &self,
        identity: &Identity,
        skills: &[SkillSyncRecord],
    ) -> Result<(), RemoteError> {
        let request =
            Self::authorize(self.client.post(self.url("/progress/skills/sync")), identity)?
                .json(skills);

        Self::check_status(request.send().await?).await?;
        Ok(())
    }
}
