//! REST transport for [`RemotePersist`], speaking the PostgREST dialect.
//!
//! Writes address the `notes` table: content updates as `PATCH` filtered by
//! id and owner, import batches as `POST` with merge-on-conflict upsert
//! semantics over the (owner, title) pair.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::{
    config::RemoteConfig,
    error::SiloError,
    model::{DocNode, Note, NoteId, UserId},
};

use super::RemotePersist;

const NOTES_TABLE: &str = "rest/v1/notes";

#[derive(Clone)]
pub struct RestClient {
    config: RemoteConfig,
    base: Url,
    http: Client,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub fn new(config: RemoteConfig) -> Result<Self, SiloError> {
        let mut base = Url::parse(&config.base_url)?;
        // Url::join treats a path without a trailing slash as a file and
        // would replace its last segment.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| SiloError::Config(format!("invalid api_key: {e}")))?;
            headers.insert("apikey", value);
        }
        if let Some(token) = config.access_token.as_ref().or(config.api_key.as_ref()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SiloError::Config(format!("invalid access token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(RestClient { config, base, http })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn notes_url(&self) -> Result<Url, SiloError> {
        Ok(self.base.join(NOTES_TABLE)?)
    }

    async fn expect_success(resp: Response, action: &str) -> Result<(), SiloError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SiloError::Remote(format!(
            "{action} failed with status {status}: {body}"
        )))
    }
}

#[async_trait]
impl RemotePersist for RestClient {
    async fn update_note_content(
        &self,
        id: &NoteId,
        content: &[DocNode],
        user_id: &UserId,
    ) -> Result<(), SiloError> {
        let mut url = self.notes_url()?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("user_id", &format!("eq.{user_id}"));

        debug!(note = %id, "pushing content update");
        let resp = self
            .http
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&json!({ "content": content }))
            .send()
            .await?;
        Self::expect_success(resp, "content update").await
    }

    async fn upsert_notes(&self, notes: &[Note], user_id: &UserId) -> Result<(), SiloError> {
        if notes.is_empty() {
            return Ok(());
        }
        let rows: Vec<Note> = notes
            .iter()
            .cloned()
            .map(|mut note| {
                note.user_id = Some(user_id.clone());
                note
            })
            .collect();

        let mut url = self.notes_url()?;
        url.query_pairs_mut()
            .append_pair("on_conflict", "user_id,title");

        debug!(count = rows.len(), "pushing note batch upsert");
        let resp = self
            .http
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await?;
        Self::expect_success(resp, "batch upsert").await
    }
}
