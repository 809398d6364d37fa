use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::loader::{DependencyKind, LoaderKind};
use crate::utils::error::{Error, Result};

/// A project the user asked for, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    /// Catalog slug or id.
    pub name: String,
    pub loader: Option<LoaderKind>,
    pub game_version: Option<String>,
}

impl ProjectRequest {
    pub fn new(
        name: impl Into<String>,
        game_version: impl Into<String>,
        loader: LoaderKind,
    ) -> Self {
        Self {
            name: name.into(),
            loader: Some(loader),
            game_version: Some(game_version.into()),
        }
    }

    pub fn target(&self) -> Result<Target> {
        let game_version = self.game_version.clone().ok_or_else(|| Error::IncompleteRequest {
            project: self.name.clone(),
            field: "game_version",
        })?;
        let loader = self.loader.ok_or_else(|| Error::IncompleteRequest {
            project: self.name.clone(),
            field: "loader",
        })?;
        Ok(Target { game_version, loader })
    }
}

/// The game version and loader a version was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub game_version: String,
    pub loader: LoaderKind,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.loader, self.game_version)
    }
}

/// One concrete release picked by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    pub name: String,
    pub id: String,
    pub project_id: String,
    pub loaders: BTreeSet<LoaderKind>,
    pub game_versions: BTreeSet<String>,
    pub version_number: String,
    pub published: DateTime<Utc>,
    pub files: Vec<FileLink>,
    pub dependencies: Vec<VersionDependency>,
    pub target: Target,
}

impl ResolvedVersion {
    pub fn required_dependencies(&self) -> impl Iterator<Item = &VersionDependency> {
        self.dependencies
            .iter()
            .filter(|dep| dep.kind == DependencyKind::Required)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLink {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub hashes: FileHashes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashes {
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDependency {
    pub version_id: Option<String>,
    pub project_id: Option<String>,
    pub file_name: Option<String>,
    pub kind: DependencyKind,
}
