// src/api/dir_sizer/source.rs
use async_trait::async_trait;
use reqwest::Client;

use crate::api::{error::DispatchError, types::SizeResult};

/// Route the size endpoint is mounted on.
pub const DIR_SIZE_ROUTE: &str = "/api/status/dir-size";

/// Anything that can answer a size query for one path.
#[async_trait]
pub trait SizeSource: Send + Sync {
    async fn query(&self, path: &str) -> Result<SizeResult, DispatchError>;
}

/// Queries a running server over HTTP.
#[derive(Clone)]
pub struct HttpSizeSource {
    client: Client,
    endpoint: String,
}

impl HttpSizeSource {
    pub fn new(base_url: &str) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), DIR_SIZE_ROUTE),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SizeSource for HttpSizeSource {
    async fn query(&self, path: &str) -> Result<SizeResult, DispatchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        response
            .json::<SizeResult>()
            .await
            .map_err(|e| DispatchError::Body(e.to_string()))
    }
}
