//! The request/response seam between the client state machines and the verse service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Language, Verse, VerseKey},
    error::ApiError,
    protocol::{
        CommentaryRequest, CommentaryResponse, SearchRequest, SuggestRequest, VerseRecord,
    },
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, error::ClientError};

#[async_trait]
pub trait VerseBackend: Send + Sync {
    /// Ranked keyword search. The service, not the caller, enforces `limit`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Verse>, ClientError>;
    async fn lookup(&self, reference: &str) -> Result<Verse, ClientError>;
    /// Verse picked for a free-text problem; commentary may come pre-filled.
    async fn suggest(&self, problem: &str) -> Result<Verse, ClientError>;
    async fn generate_commentary(
        &self,
        key: &VerseKey,
        source_text: &str,
        language: Language,
    ) -> Result<String, ClientError>;
}

pub struct HttpBackend {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url = Url::parse(&settings.api_base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(settings.api_base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(settings.api_base_url.clone()));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn api_key(&self, operation: &'static str) -> Result<&str, ClientError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ClientError::MissingApiKey(operation))
    }
}

#[async_trait]
impl VerseBackend for HttpBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Verse>, ClientError> {
        let url = self.endpoint(&["search"])?;
        debug!(%url, limit, "verse search request");
        let response = self
            .http
            .post(url)
            .json(&SearchRequest {
                query: query.to_string(),
                num_results: limit,
            })
            .send()
            .await?;
        let records: Vec<VerseRecord> = decode(response).await?;
        Ok(records.into_iter().map(Verse::from).collect())
    }

    async fn lookup(&self, reference: &str) -> Result<Verse, ClientError> {
        let url = self.endpoint(&["verse", reference])?;
        debug!(%url, "verse lookup request");
        let response = self.http.get(url).send().await?;
        let record: VerseRecord = decode(response).await?;
        Ok(record.into())
    }

    async fn suggest(&self, problem: &str) -> Result<Verse, ClientError> {
        let api_key = self.api_key("suggestion")?;
        let url = self.endpoint(&["suggest"])?;
        debug!(%url, "verse suggestion request");
        let response = self
            .http
            .post(url)
            .json(&SuggestRequest {
                problem: problem.to_string(),
                api_key: api_key.to_string(),
            })
            .send()
            .await?;
        let record: VerseRecord = decode(response).await?;
        Ok(record.into())
    }

    async fn generate_commentary(
        &self,
        key: &VerseKey,
        source_text: &str,
        language: Language,
    ) -> Result<String, ClientError> {
        let api_key = self.api_key("commentary")?;
        let url = self.endpoint(&["tafseer"])?;
        debug!(%url, verse = %key, language = language.wire_tag(), "commentary request");
        let response = self
            .http
            .post(url)
            .json(&CommentaryRequest {
                verse_key: key.clone(),
                translation: source_text.to_string(),
                language,
                api_key: api_key.to_string(),
            })
            .send()
            .await?;
        let body: CommentaryResponse = decode(response).await?;
        Ok(body.tafseer)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|err| err.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    Err(ClientError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
