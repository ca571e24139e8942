//! API runner: call one catalog entry and persist what came back.
//!
//! Call failures are folded into a failure record and still written. Only
//! catalog and storage problems are returned as errors.

use std::path::PathBuf;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::{ApiCatalog, ApiDescriptor, CatalogError, HttpMethod};
use crate::config::Config;
use crate::responses::{ResponseRecord, ResponseStore, StoreError};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}

/// Calls a single API descriptor.
pub struct ApiRunner {
    api: ApiDescriptor,
    client: reqwest::Client,
}

impl ApiRunner {
    pub fn new(api: ApiDescriptor) -> Self {
        Self::with_client(api, reqwest::Client::new())
    }

    pub fn with_client(api: ApiDescriptor, client: reqwest::Client) -> Self {
        Self { api, client }
    }

    /// Perform the request. Never fails; errors become a failure record.
    pub async fn call(&self) -> ResponseRecord {
        let name = &self.api.name;
        let port = self.api.port_or_default();
        info!("Calling {} on port {}", name, port);

        match self.send().await {
            Ok((status_code, response)) => {
                info!("{} response status: {}", name, status_code);
                ResponseRecord::success(name.clone(), port, status_code, response)
            }
            Err(e) => {
                error!("Error in {}: {}", name, e);
                ResponseRecord::failure(name.clone(), port, e.to_string())
            }
        }
    }

    async fn send(&self) -> anyhow::Result<(u16, serde_json::Value)> {
        let headers = build_headers(&self.api)?;
        let response = self
            .client
            .request(self.api.method.into(), &self.api.url)
            .headers(headers)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await?;
        Ok((status_code, body))
    }
}

fn build_headers(api: &ApiDescriptor) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in &api.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid header name {:?}: {}", key, e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| anyhow::anyhow!("Invalid value for header {:?}: {}", key, e))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Load the descriptor selected by `config.api_id`, call it and save the record.
pub async fn run(config: &Config) -> Result<PathBuf, RunnerError> {
    run_with_client(config, reqwest::Client::new()).await
}

pub async fn run_with_client(
    config: &Config,
    client: reqwest::Client,
) -> Result<PathBuf, RunnerError> {
    let catalog = ApiCatalog::load(&config.db_path)?;
    let api = catalog.get(config.api_id)?.clone();

    let record = ApiRunner::with_client(api, client).call().await;
    let store = ResponseStore::new(&config.responses_dir);
    Ok(store.save(&record).await?)
}
