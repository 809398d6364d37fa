//! In-memory catalog used by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::api::client::Catalog;
use crate::api::labrinth::{RawDependency, RawFile, RawVersion};
use crate::types::loader::{DependencyKind, LoaderKind};
use crate::types::project::FileHashes;
use crate::utils::error::{Error, Result};

enum Listing {
    Versions(Vec<RawVersion>),
    Status(u16),
}

#[derive(Default)]
pub struct FakeCatalog {
    listings: HashMap<(String, String), Listing>,
    by_id: HashMap<String, RawVersion>,
    files: HashMap<String, Vec<u8>>,
    loader_tags: BTreeSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(
        mut self,
        project: &str,
        game_version: &str,
        versions: Vec<RawVersion>,
    ) -> Self {
        for version in &versions {
            self.by_id.insert(version.id.clone(), version.clone());
        }
        self.listings.insert(
            (project.to_string(), game_version.to_string()),
            Listing::Versions(versions),
        );
        self
    }

    pub fn with_status(mut self, project: &str, game_version: &str, status: u16) -> Self {
        self.listings.insert(
            (project.to_string(), game_version.to_string()),
            Listing::Status(status),
        );
        self
    }

    pub fn with_file(mut self, url: &str, data: &[u8]) -> Self {
        self.files.insert(url.to_string(), data.to_vec());
        self
    }

    pub fn with_loader_tags(mut self, tags: &[&str]) -> Self {
        self.loader_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch_versions_for(
        &self,
        project_id: &str,
        game_version: &str,
        loader: LoaderKind,
    ) -> Result<Vec<RawVersion>> {
        self.record(format!("versions {project_id} {game_version} {loader}"));
        match self.listings.get(&(project_id.to_string(), game_version.to_string())) {
            Some(Listing::Versions(versions)) => Ok(versions.clone()),
            Some(Listing::Status(status)) => Err(Error::Status {
                url: format!("fake://v2/project/{project_id}/version"),
                status: *status,
                body: String::new(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_version(&self, version_id: &str) -> Result<RawVersion> {
        self.record(format!("version {version_id}"));
        self.by_id.get(version_id).cloned().ok_or_else(|| Error::Status {
            url: format!("fake://v2/version/{version_id}"),
            status: 404,
            body: String::new(),
        })
    }

    async fn fetch_file(&self, url: &str) -> Result<Bytes> {
        self.record(format!("file {url}"));
        match self.files.get(url) {
            Some(data) if data.is_empty() => Err(Error::EmptyPayload { url: url.to_string() }),
            Some(data) => Ok(Bytes::from(data.clone())),
            None => Err(Error::Status {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }

    async fn fetch_enum_reference(&self, path: &str) -> Result<BTreeSet<String>> {
        self.record(format!("tags {path}"));
        Ok(self.loader_tags.clone())
    }
}

pub fn raw_version(project: &str, id: &str, published: &str, files: &[&str]) -> RawVersion {
    RawVersion {
        name: format!("{project} {id}"),
        id: id.to_string(),
        project_id: project.to_string(),
        version_number: id.to_string(),
        files: files
            .iter()
            .map(|filename| RawFile {
                url: file_url(project, filename),
                filename: filename.to_string(),
                hashes: FileHashes::default(),
            })
            .collect(),
        game_versions: vec!["1.21.5".to_string()],
        loaders: vec!["fabric".to_string()],
        date_published: published.parse::<DateTime<Utc>>().unwrap(),
        dependencies: Vec::new(),
    }
}

pub fn requires(project: &str) -> RawDependency {
    RawDependency {
        version_id: None,
        project_id: Some(project.to_string()),
        file_name: None,
        dependency_type: DependencyKind::Required,
    }
}

pub fn file_url(project: &str, filename: &str) -> String {
    format!("https://cdn.example/{project}/{filename}")
}
