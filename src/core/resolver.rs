use crate::api::client::Catalog;
use crate::types::project::{ResolvedVersion, Target};
use crate::utils::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Treat a selected version without files as a resolution failure.
    pub reject_empty_files: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            reject_empty_files: true,
        }
    }
}

/// Picks the newest published version of a project for a target.
pub struct VersionResolver<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    options: ResolverOptions,
}

impl<'c, C: Catalog + ?Sized> VersionResolver<'c, C> {
    pub fn new(catalog: &'c C, options: ResolverOptions) -> Self {
        Self { catalog, options }
    }

    /// Resolve `project_id` for `target`.
    ///
    /// A non-success response for the exact game version is retried once with
    /// the patch component widened to `x` (`1.21.5` becomes `1.21.x`). An empty
    /// but successful listing is not retried. Among the candidates the one with
    /// the latest publish date wins; on a tie the later entry wins.
    pub async fn resolve(&self, project_id: &str, target: &Target) -> Result<ResolvedVersion> {
        let raw = match self
            .catalog
            .fetch_versions_for(project_id, &target.game_version, target.loader)
            .await
        {
            Ok(raw) => raw,
            Err(err) if err.is_status() => {
                let Some(widened) = widen_game_version(&target.game_version) else {
                    return Err(err);
                };
                tracing::warn!(
                    "Query for {} on {} failed ({}), retrying with {}",
                    project_id,
                    target,
                    err,
                    widened
                );
                self.catalog
                    .fetch_versions_for(project_id, &widened, target.loader)
                    .await?
            }
            Err(err) => return Err(err),
        };

        tracing::debug!("{} candidate versions for {}", raw.len(), project_id);

        // max_by returns the last of several equal elements.
        let best = raw
            .into_iter()
            .map(|entry| entry.into_resolved(target))
            .max_by(|a, b| a.published.cmp(&b.published))
            .ok_or_else(|| Error::NoMatch {
                project: project_id.to_string(),
            })?;

        self.accept(best)
    }

    /// Fetch one exact version by id, keeping `target` as its context.
    pub async fn resolve_by_id(
        &self,
        version_id: &str,
        target: &Target,
    ) -> Result<ResolvedVersion> {
        let raw = self.catalog.fetch_version(version_id).await?;
        self.accept(raw.into_resolved(target))
    }

    fn accept(&self, version: ResolvedVersion) -> Result<ResolvedVersion> {
        if self.options.reject_empty_files && version.files.is_empty() {
            return Err(Error::NoFiles {
                project: version.project_id,
                version: version.id,
            });
        }
        Ok(version)
    }
}

/// Resolves the required dependencies of a version, one level deep.
pub struct DependencyResolver<'r, 'c, C: Catalog + ?Sized> {
    versions: &'r VersionResolver<'c, C>,
}

impl<'r, 'c, C: Catalog + ?Sized> DependencyResolver<'r, 'c, C> {
    pub fn new(versions: &'r VersionResolver<'c, C>) -> Self {
        Self { versions }
    }

    /// Resolve every required dependency of `version` against the parent's
    /// target. Stops at the first failure; dependencies of dependencies are
    /// not followed.
    pub async fn resolve(&self, version: &ResolvedVersion) -> Result<Vec<ResolvedVersion>> {
        let mut resolved = Vec::new();
        for dep in version.required_dependencies() {
            let dep_version = match (&dep.project_id, &dep.version_id) {
                (Some(project_id), _) => self.versions.resolve(project_id, &version.target).await?,
                (None, Some(version_id)) => {
                    self.versions.resolve_by_id(version_id, &version.target).await?
                }
                (None, None) => {
                    return Err(Error::UnresolvableDependency {
                        version: version.id.clone(),
                    })
                }
            };
            tracing::debug!("{} requires {}", version.name, dep_version.name);
            resolved.push(dep_version);
        }
        Ok(resolved)
    }
}

/// `1.21.5` -> `1.21.x`. Versions without a patch component, or already
/// widened, have nothing to widen.
pub fn widen_game_version(game_version: &str) -> Option<String> {
    let (head, patch) = game_version.rsplit_once('.')?;
    if patch == "x" || !head.contains('.') {
        return None;
    }
    Some(format!("{head}.x"))
}
