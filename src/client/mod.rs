//! HTTP client for the Google Generative Language API.
//!
//! Every consumer takes the collaborator as an explicit [`GenAiClient`]
//! trait object so tests can substitute a fake service without touching the
//! process environment.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use tracing::debug;

use crate::config::GeminiSettings;

mod error;
mod wire;

pub use error::GenAiError;
pub use wire::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, InlineData, Part,
};


/// Abstract generative AI collaborator: one-shot content generation plus
/// incremental streaming.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError>;

    async fn stream_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ContentStream, GenAiError>;
}

pub type DynGenAiClient = dyn GenAiClient;

/// Finite, non-restartable sequence of text chunks from a streaming call.
///
/// A transport failure mid-stream is surfaced as a terminal `Err` chunk;
/// the stream never silently truncates.
pub struct ContentStream {
    inner: Pin<Box<dyn Stream<Item = Result<String, GenAiError>> + Send>>,
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream").finish_non_exhaustive()
    }
}

impl ContentStream {
    pub fn new(inner: impl Stream<Item = Result<String, GenAiError>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }

    /// Fixed chunk sequence, for fake collaborators in tests.
    #[cfg(test)]
    pub fn from_chunks(chunks: Vec<Result<String, GenAiError>>) -> Self {
        Self::new(futures::stream::iter(chunks))
    }

    pub async fn next_chunk(&mut self) -> Option<Result<String, GenAiError>> {
        self.inner.next().await
    }

    fn from_event_source(source: EventSource) -> Self {
        Self::new(futures::stream::unfold(Some(source), |state| async move {
            let mut source = state?;
            loop {
                match source.next().await {
                    None => {
                        source.close();
                        return None;
                    }
                    Some(Ok(Event::Open)) => continue,
                    Some(Ok(Event::Message(message))) => {
                        let payload: GenerateContentResponse =
                            match serde_json::from_str(&message.data) {
                                Ok(payload) => payload,
                                Err(error) => {
                                    source.close();
                                    return Some((
                                        Err(GenAiError::InvalidResponse(format!(
                                            "failed to parse stream event JSON: {error}"
                                        ))),
                                        None,
                                    ));
                                }
                            };
                        if let Some(reason) = payload
                            .candidates
                            .first()
                            .and_then(|candidate| candidate.finish_reason.as_deref())
                        {
                            debug!(reason, "stream candidate finished");
                        }
                        match payload.first_text() {
                            Some(text) => return Some((Ok(text), Some(source))),
                            None => continue,
                        }
                    }
                    Some(Err(reqwest_eventsource::Error::StreamEnded)) => {
                        source.close();
                        return None;
                    }
                    Some(Err(error)) => {
                        source.close();
                        return Some((Err(GenAiError::Stream(error.to_string())), None));
                    }
                }
            }
        }))
    }
}

/// Client for the Gemini REST endpoints used by this crate.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    user_agent: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GenAiError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            user_agent: settings.user_agent.clone(),
        })
    }

    fn endpoint(&self, model: &str, verb: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, verb)
    }

    /// A missing key is a per-call failure, never a startup one.
    fn ensure_credential(&self) -> Result<(), GenAiError> {
        if self.api_key.trim().is_empty() {
            Err(GenAiError::MissingCredential)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        self.ensure_credential()?;

        let url = self.endpoint(&request.model, "generateContent");
        debug!(model = %request.model, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("User-Agent", &self.user_agent)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|error| {
                    GenAiError::InvalidResponse(format!(
                        "failed to parse generateContent response JSON: {error}"
                    ))
                }),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(GenAiError::Api {
                    status: response.status().as_u16(),
                    message: "API key was rejected. Check your GEMINI_API_KEY.".to_string(),
                })
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let error_text = response.text().await.unwrap_or_default();
                Err(GenAiError::Api {
                    status: 429,
                    message: format!("Rate limit exceeded. Please wait and retry. ({error_text})"),
                })
            }
            reqwest::StatusCode::BAD_REQUEST => {
                let error_text = response.text().await.unwrap_or_default();
                Err(GenAiError::Api {
                    status: 400,
                    message: format!("Invalid request: {error_text}"),
                })
            }
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
            | reqwest::StatusCode::SERVICE_UNAVAILABLE => Err(GenAiError::Api {
                status: response.status().as_u16(),
                message: "Service is temporarily unavailable. Please try again later.".to_string(),
            }),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(GenAiError::Api {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    async fn stream_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ContentStream, GenAiError> {
        self.ensure_credential()?;

        let url = self.endpoint(&request.model, "streamGenerateContent");
        debug!(model = %request.model, "opening streamGenerateContent request");

        let builder = self
            .http
            .post(&url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .header("User-Agent", &self.user_agent)
            .json(&request);

        let source = EventSource::new(builder)
            .map_err(|error| GenAiError::Stream(error.to_string()))?;

        Ok(ContentStream::from_event_source(source))
    }
}
