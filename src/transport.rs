//! Transport and correlation-ID collaborators.

use crate::config::CbsConfig;
use crate::envelope::Operation;
use crate::error::{CbsError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// One outbound SOAP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl SoapRequest {
    /// Request for `operation` with the configured content type.
    pub fn new(config: &CbsConfig, operation: Operation, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), config.settings.content_type.clone());
        headers.insert("SoapAction".to_string(), operation.soap_action().to_string());
        Self {
            endpoint: config.endpoint.clone(),
            headers,
            body,
        }
    }

    pub fn soap_action(&self) -> Option<&str> {
        self.headers.get("SoapAction").map(String::as_str)
    }
}

/// Sends a SOAP request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SoapRequest) -> Result<String, TransportError>;
}

/// HTTP transport backed by reqwest.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &CbsConfig) -> Result<Self, CbsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.settings.timeout_secs))
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: SoapRequest) -> Result<String, TransportError> {
        let mut builder = self.http.post(&request.endpoint);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "CBS response received");

        // SOAP 1.1 faults arrive with status 500
        if status.is_success() || status.as_u16() == 500 {
            Ok(body)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            })
        }
    }
}

/// Supplies fresh correlation identifiers.
pub trait CorrelationIds: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUIDv4 identifiers in simple (hyphen-free) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCorrelationIds;

impl CorrelationIds for UuidCorrelationIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
