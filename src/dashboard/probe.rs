// src/dashboard/probe.rs
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("could not build http client: {0}")]
    Client(String),
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// Fetches the response headers a URL answers with, as `(name, value)` pairs.
#[async_trait]
pub trait HeaderProbe: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<(String, String)>, ProbeError>;
}

pub struct HttpHeaderProbe {
    client: Client,
}

impl HttpHeaderProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HeaderProbe for HttpHeaderProbe {
    async fn fetch(&self, url: &str) -> Result<Vec<(String, String)>, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // any status will do, only the headers matter
        Ok(response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect())
    }
}
