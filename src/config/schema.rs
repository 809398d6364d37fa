use config::{Config, Environment, File, FileFormat};
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::config::defaults;
use crate::core::batch::BatchOptions;
use crate::core::resolver::ResolverOptions;
use crate::types::loader::LoaderKind;
use crate::types::project::ProjectRequest;
use crate::utils::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ModsConfig {
    pub defaults: Defaults,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub projects: ProjectList,
    #[serde(default, alias = "optional-projects")]
    pub optional_projects: ProjectList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    pub game_version: String,
    pub loader: LoaderKind,
    #[serde(default = "defaults::api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "defaults::enabled")]
    pub reject_empty_files: bool,
    #[serde(default = "defaults::enabled")]
    pub verify_hashes: bool,
}

/// One project entry, from either `[[projects]]` or `[projects.<name>]`.
///
/// With `defaults` set, missing fields fall back to `[defaults]`. Array
/// entries inherit unless told otherwise; keyed tables only inherit when
/// they set `defaults = true`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default = "defaults::enabled")]
    pub defaults: bool,
    pub loader: Option<LoaderKind>,
    pub game_version: Option<String>,
}

/// Body of a `[projects.<name>]` table; the key is the name.
#[derive(Deserialize)]
struct KeyedEntry {
    #[serde(default)]
    defaults: bool,
    loader: Option<LoaderKind>,
    game_version: Option<String>,
}

/// Project entries in file order, written either as an array of tables or
/// as a table keyed by project name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectList(pub Vec<ProjectEntry>);

impl ProjectList {
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectEntry> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ProjectList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ProjectListVisitor)
    }
}

struct ProjectListVisitor;

impl<'de> Visitor<'de> for ProjectListVisitor {
    type Value = ProjectList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of project tables or a table keyed by project name")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<ProjectList, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some(entry) = seq.next_element::<ProjectEntry>()? {
            entries.push(entry);
        }
        Ok(ProjectList(entries))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<ProjectList, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((name, body)) = map.next_entry::<String, KeyedEntry>()? {
            entries.push(ProjectEntry {
                name,
                defaults: body.defaults,
                loader: body.loader,
                game_version: body.game_version,
            });
        }
        Ok(ProjectList(entries))
    }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub game_version: Option<String>,
    pub loader: Option<LoaderKind>,
    pub api_url: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            reject_empty_files: true,
            verify_hashes: true,
        }
    }
}

impl ModsConfig {
    /// Load `path`, layer `MCMODS_*` environment variables over it, then
    /// apply `overrides`.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::finish(builder, overrides)
    }

    pub fn from_toml_str(text: &str, overrides: &Overrides) -> Result<Self> {
        let builder = Config::builder().add_source(File::from_str(text, FileFormat::Toml));
        Self::finish(builder, overrides)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let config = builder
            .set_override_option("defaults.game_version", overrides.game_version.clone())?
            .set_override_option("defaults.loader", overrides.loader.map(|l| l.as_str()))?
            .set_override_option("defaults.api_url", overrides.api_url.clone())?
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn requests(&self) -> Result<Vec<ProjectRequest>> {
        self.projects.iter().map(|p| self.request(p)).collect()
    }

    pub fn optional_requests(&self) -> Result<Vec<ProjectRequest>> {
        self.optional_projects.iter().map(|p| self.request(p)).collect()
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            resolver: ResolverOptions {
                reject_empty_files: self.resolver.reject_empty_files,
            },
            verify_hashes: self.resolver.verify_hashes,
        }
    }

    fn request(&self, entry: &ProjectEntry) -> Result<ProjectRequest> {
        let missing = |field: &'static str| Error::IncompleteRequest {
            project: entry.name.clone(),
            field,
        };
        let game_version = match (&entry.game_version, entry.defaults) {
            (Some(version), _) => version.clone(),
            (None, true) => self.defaults.game_version.clone(),
            (None, false) => return Err(missing("game_version")),
        };
        let loader = match (entry.loader, entry.defaults) {
            (Some(loader), _) => loader,
            (None, true) => self.defaults.loader,
            (None, false) => return Err(missing("loader")),
        };
        Ok(ProjectRequest::new(entry.name.clone(), game_version, loader))
    }
}
