use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

use crate::api::labrinth::RawVersion;
use crate::types::loader::LoaderKind;
use crate::utils::error::{Error, Result};

/// The catalog operations the resolver and downloader need.
///
/// [`LabrinthSession`](crate::api::labrinth::LabrinthSession) is the real
/// implementation; tests substitute in-memory fakes.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Versions of `project_id` published for one loader and one game version.
    async fn fetch_versions_for(
        &self,
        project_id: &str,
        game_version: &str,
        loader: LoaderKind,
    ) -> Result<Vec<RawVersion>>;

    async fn fetch_version(&self, version_id: &str) -> Result<RawVersion>;

    /// Raw bytes behind an absolute file URL. An empty body is an error.
    async fn fetch_file(&self, url: &str) -> Result<Bytes>;

    /// Names listed by a `v2/tag/*` endpoint.
    async fn fetch_enum_reference(&self, path: &str) -> Result<BTreeSet<String>>;
}

/// Thin wrapper over one `reqwest::Client` rooted at a base URL.
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "mcmods/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ))
            .build()?;

        Ok(Self {
            client,
            base: normalize_base(base_url)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// Send a GET without inspecting the status.
    pub async fn get_raw(&self, url: Url) -> Result<Response> {
        tracing::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Send a GET and turn any non-success status into [`Error::Status`].
    pub async fn get(&self, url: Url, query: &[(&str, String)]) -> Result<Response> {
        tracing::debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send().await?;
        ensure_success(response).await
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(url, query).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn download_file(&self, url: Url) -> Result<Bytes> {
        let response = self.get(url, &[]).await?;
        Ok(response.bytes().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        url,
        status: status.as_u16(),
        body,
    })
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base(base_url: &str) -> Result<Url> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}
