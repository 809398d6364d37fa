use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use strum::IntoEnumIterator;

use crate::api::client::{ApiClient, Catalog};
use crate::types::loader::{DependencyKind, LoaderKind};
use crate::types::project::{FileHashes, FileLink, ResolvedVersion, Target, VersionDependency};
use crate::utils::error::{Error, Result};

pub const LABRINTH_URL: &str = "https://api.modrinth.com/";

/// One open connection to the Labrinth API.
///
/// Constructed once per run by [`LabrinthSession::connect`], which probes the
/// root URL first. The underlying connection pool is released on drop.
pub struct LabrinthSession {
    client: ApiClient,
}

impl LabrinthSession {
    pub async fn connect(base_url: &str) -> Result<Self> {
        let client = ApiClient::new(base_url)?;
        let response = client.get_raw(client.base().clone()).await?;
        if !response.status().is_success() {
            return Err(Error::Unreachable {
                url: client.base().to_string(),
                status: response.status().as_u16(),
            });
        }
        tracing::info!("Labrinth session opened at {}", client.base());
        Ok(Self { client })
    }

    pub fn base_url(&self) -> &str {
        self.client.base().as_str()
    }
}

impl Drop for LabrinthSession {
    fn drop(&mut self) {
        tracing::debug!("Labrinth session at {} closed", self.client.base());
    }
}

#[async_trait]
impl Catalog for LabrinthSession {
    async fn fetch_versions_for(
        &self,
        project_id: &str,
        game_version: &str,
        loader: LoaderKind,
    ) -> Result<Vec<RawVersion>> {
        let url = self.client.endpoint(&format!("v2/project/{project_id}/version"))?;
        let query = [
            ("loaders", serde_json::to_string(&[loader.as_str()])?),
            ("game_versions", serde_json::to_string(&[game_version])?),
        ];
        self.client.get_json(url, &query).await
    }

    async fn fetch_version(&self, version_id: &str) -> Result<RawVersion> {
        let url = self.client.endpoint(&format!("v2/version/{version_id}"))?;
        self.client.get_json(url, &[]).await
    }

    async fn fetch_file(&self, url: &str) -> Result<Bytes> {
        let bytes = self.client.download_file(self.client.endpoint(url)?).await?;
        if bytes.is_empty() {
            return Err(Error::EmptyPayload { url: url.to_string() });
        }
        Ok(bytes)
    }

    async fn fetch_enum_reference(&self, path: &str) -> Result<BTreeSet<String>> {
        let url = self.client.endpoint(path)?;
        let tags: Vec<TagInfo> = self.client.get_json(url, &[]).await?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }
}

/// Compare [`LoaderKind`] against the catalog's `v2/tag/loader` list.
pub async fn check_enums<C: Catalog + ?Sized>(catalog: &C) -> Result<()> {
    let remote = catalog.fetch_enum_reference("v2/tag/loader").await?;
    let local: BTreeSet<String> = LoaderKind::iter().map(|l| l.as_str().to_string()).collect();

    let extra: Vec<String> = local.difference(&remote).cloned().collect();
    let missing: Vec<String> = remote.difference(&local).cloned().collect();
    if extra.is_empty() && missing.is_empty() {
        tracing::info!("Loader enumeration matches the catalog ({} entries)", local.len());
        return Ok(());
    }
    Err(Error::EnumDrift { extra, missing })
}

/// A version entry as returned by `v2/project/{id}/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVersion {
    pub name: String,
    pub id: String,
    pub project_id: String,
    pub version_number: String,
    pub files: Vec<RawFile>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    pub date_published: DateTime<Utc>,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub hashes: FileHashes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDependency {
    pub version_id: Option<String>,
    pub project_id: Option<String>,
    pub file_name: Option<String>,
    pub dependency_type: DependencyKind,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
}

impl RawVersion {
    pub fn into_resolved(self, target: &Target) -> ResolvedVersion {
        let loaders = self
            .loaders
            .into_iter()
            .filter_map(|token| match token.parse::<LoaderKind>() {
                Ok(loader) => Some(loader),
                Err(_) => {
                    tracing::warn!(
                        "Version {} lists unknown loader {:?}; run check-enums",
                        self.id,
                        token
                    );
                    None
                }
            })
            .collect();

        ResolvedVersion {
            name: self.name,
            id: self.id,
            project_id: self.project_id,
            loaders,
            game_versions: self.game_versions.into_iter().collect(),
            version_number: self.version_number,
            published: self.date_published,
            files: self.files.into_iter().map(FileLink::from).collect(),
            dependencies: self
                .dependencies
                .into_iter()
                .map(VersionDependency::from)
                .collect(),
            target: target.clone(),
        }
    }
}

impl From<RawFile> for FileLink {
    fn from(value: RawFile) -> Self {
        Self {
            url: value.url,
            filename: value.filename,
            hashes: value.hashes,
        }
    }
}

impl From<RawDependency> for VersionDependency {
    fn from(value: RawDependency) -> Self {
        Self {
            version_id: value.version_id,
            project_id: value.project_id,
            file_name: value.file_name,
            kind: value.dependency_type,
        }
    }
}
