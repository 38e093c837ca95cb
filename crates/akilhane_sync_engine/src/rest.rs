//! Remote gateway over a PostgREST endpoint (`{base}/rest/v1/{table}`).

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::RemoteGateway;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
use crate::remote::{
    NewRemoteQuestion, NewRemoteSubject, RemoteQuestion, RemoteQuestionPatch, RemoteSubject,
    RemoteSubjectPatch,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const SUBJECTS: &str = "subjects";
const QUESTIONS: &str = "questions";

/// [`RemoteGateway`] speaking the PostgREST dialect.
pub struct RestGateway<C: HttpClient> {
    config: SyncConfig,
    client: C,
}

impl RestGateway<ReqwestClient> {
    /// Creates a gateway using `reqwest` with the configured timeout.
    pub fn connect(config: SyncConfig) -> SyncResult<Self> {
        let client = ReqwestClient::new(config.timeout)?;
        Self::new(config, client)
    }
}

impl<C: HttpClient> RestGateway<C> {
    /// Creates a gateway over `client`.
    pub fn new(config: SyncConfig, client: C) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn url(&self, table: &str, query: &[(&str, &str)]) -> SyncResult<String> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/rest/v1/{table}"))
            .map_err(|e| SyncError::Config(format!("invalid remote URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    fn request(&self, method: Method, url: String, body: Option<Vec<u8>>) -> HttpRequest {
        let mut headers = vec![
            ("apikey".to_string(), self.config.api_key.clone()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.config.bearer()),
            ),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if method != Method::Get {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            headers.push(("Prefer".to_string(), "return=representation".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    async fn send(&self, request: HttpRequest) -> SyncResult<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "remote request");
        let response = self.client.send(request).await?;
        if !response.is_success() {
            return Err(SyncError::remote(
                response.status,
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(response)
    }

    async fn rows<T: DeserializeOwned>(&self, request: HttpRequest) -> SyncResult<Vec<T>> {
        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    async fn list<T: DeserializeOwned>(&self, table: &str, filters: &[(&str, &str)]) -> SyncResult<Vec<T>> {
        let mut query = vec![("select", "*"), ("is_active", "eq.true")];
        query.extend_from_slice(filters);
        query.push(("order", "created_at.desc"));
        let url = self.url(table, &query)?;
        self.rows(self.request(Method::Get, url, None)).await
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(&self, table: &str, body: &B) -> SyncResult<T> {
        let url = self.url(table, &[])?;
        let body = serde_json::to_vec(body)?;
        self.rows(self.request(Method::Post, url, Some(body)))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::Decode(format!("insert into {table} returned no row")))
    }

    async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        body: &B,
    ) -> SyncResult<Option<T>> {
        let filter = format!("eq.{id}");
        let url = self.url(table, &[("id", filter.as_str())])?;
        let body = serde_json::to_vec(body)?;
        Ok(self
            .rows(self.request(Method::Patch, url, Some(body)))
            .await?
            .into_iter()
            .next())
    }

    async fn delete(&self, table: &str, id: &str) -> SyncResult<bool> {
        let filter = format!("eq.{id}");
        let url = self.url(table, &[("id", filter.as_str())])?;
        let deleted: Vec<serde_json::Value> = self.rows(self.request(Method::Delete, url, None)).await?;
        Ok(!deleted.is_empty())
    }
}

#[async_trait]
impl<C: HttpClient> RemoteGateway for RestGateway<C> {
    async fn list_subjects(&self, owner: &str) -> SyncResult<Vec<RemoteSubject>> {
        let owner = format!("eq.{owner}");
        self.list(SUBJECTS, &[("created_by", owner.as_str())]).await
    }

    async fn create_subject(&self, subject: &NewRemoteSubject) -> SyncResult<RemoteSubject> {
        self.insert(SUBJECTS, subject).await
    }

    async fn update_subject(
        &self,
        id: &str,
        patch: &RemoteSubjectPatch,
    ) -> SyncResult<Option<RemoteSubject>> {
        self.patch(SUBJECTS, id, patch).await
    }

    async fn delete_subject(&self, id: &str) -> SyncResult<bool> {
        self.delete(SUBJECTS, id).await
    }

    async fn list_questions(&self) -> SyncResult<Vec<RemoteQuestion>> {
        self.list(QUESTIONS, &[]).await
    }

    async fn create_question(&self, question: &NewRemoteQuestion) -> SyncResult<RemoteQuestion> {
        self.insert(QUESTIONS, question).await
    }

    async fn update_question(
        &self,
        id: &str,
        patch: &RemoteQuestionPatch,
    ) -> SyncResult<Option<RemoteQuestion>> {
        self.patch(QUESTIONS, id, patch).await
    }

    async fn delete_question(&self, id: &str) -> SyncResult<bool> {
        self.delete(QUESTIONS, id).await
    }

    async fn ping(&self) -> SyncResult<()> {
        let url = self.url(SUBJECTS, &[("select", "id"), ("limit", "1")])?;
        self.send(self.request(Method::Get, url, None)).await.map(|_| ())
    }
}
