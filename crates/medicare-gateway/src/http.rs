//! HTTP transport for the analysis backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use medicare_core::config::BackendConfig;
use medicare_core::types::OperationKind;

use crate::error::GatewayError;
use crate::service::{
    AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, RemoteService, ResearchRequest,
    ResearchResponse,
};

const USER_AGENT: &str = concat!("medicare/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in [`GatewayError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// [`RemoteService`] over HTTP: JSON for chat and research, multipart for
/// analysis. No request timeout is set.
#[derive(Debug, Clone)]
pub struct HttpService {
    http: Client,
    backend: BackendConfig,
}

impl HttpService {
    pub fn new(backend: BackendConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, backend })
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    async fn post_json<B, R>(&self, kind: OperationKind, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.backend.endpoint(kind);
        tracing::debug!(%kind, url = %url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        decode(kind, response).await
    }
}

async fn decode<R: DeserializeOwned>(kind: OperationKind, response: Response) -> Result<R, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::warn!(%kind, status = status.as_u16(), "Backend returned an error status");
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl RemoteService for HttpService {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.post_json(OperationKind::Chat, &request).await
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError> {
        let kind = OperationKind::Analysis;
        let url = self.backend.endpoint(kind);
        let AnalyzeRequest { file, language } = request;
        tracing::debug!(%kind, url = %url, file = %file.name, bytes = file.len(), "POST multipart");

        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("language", language.tag());

        let response = self.http.post(&url).multipart(form).send().await?;
        decode(kind, response).await
    }

    async fn research(&self, request: ResearchRequest) -> Result<ResearchResponse, GatewayError> {
        self.post_json(OperationKind::Search, &request).await
    }
}
