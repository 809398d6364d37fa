use std::collections::HashSet;
use std::path::Path;

use crate::api::client::Catalog;
use crate::core::download::DownloadManager;
use crate::core::resolver::{DependencyResolver, ResolverOptions, VersionResolver};
use crate::types::project::{ProjectRequest, ResolvedVersion};
use crate::utils::error::{Error, Result};

/// One event per resolved project or downloaded version, in run order.
#[derive(Debug)]
pub enum Outcome<'a> {
    Resolved {
        request: &'a ProjectRequest,
        version: &'a ResolvedVersion,
        dependencies: &'a [ResolvedVersion],
    },
    Failed {
        request: &'a ProjectRequest,
        error: &'a Error,
        optional: bool,
    },
    Downloaded {
        version: &'a ResolvedVersion,
        files: usize,
    },
    DownloadFailed {
        version: &'a ResolvedVersion,
        error: &'a Error,
    },
}

/// Receives outcomes as they happen.
pub trait Reporter {
    fn report(&mut self, outcome: Outcome<'_>);
}

/// Prints one status line per outcome to stdout.
pub struct ConsoleReporter {
    width: usize,
}

impl ConsoleReporter {
    pub fn new(requests: &[ProjectRequest]) -> Self {
        let width = requests.iter().map(|r| r.name.len()).max().unwrap_or(0);
        Self { width }
    }

    fn prefix(&self, name: &str) -> String {
        let label = format!("Find {name}: ");
        format!("{:.<width$} ", label, width = self.width + "Find : ".len())
    }
}

impl ConsoleReporter {
    /// The status lines printed for `outcome`.
    fn lines(&self, outcome: &Outcome<'_>) -> Vec<String> {
        match *outcome {
            Outcome::Resolved {
                request,
                version,
                dependencies,
            } => std::iter::once(format!("{}{}", self.prefix(&request.name), version.name))
                .chain(dependencies.iter().map(|dep| format!("  requires {}", dep.name)))
                .collect(),
            Outcome::Failed {
                request,
                error,
                optional,
            } => {
                let note = if optional { " (skipped)" } else { "" };
                vec![format!("{}\x1b[31m{}\x1b[m{}", self.prefix(&request.name), error, note)]
            }
            Outcome::Downloaded { version, files } => {
                vec![format!("  {}: downloaded {} files", version.name, files)]
            }
            Outcome::DownloadFailed { version, error } => {
                vec![format!("  {}: download error: \x1b[31m{}\x1b[m", version.name, error)]
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, outcome: Outcome<'_>) {
        for line in self.lines(&outcome) {
            println!("{line}");
        }
    }
}

/// A requested project together with its required dependencies.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub request: ProjectRequest,
    pub version: ResolvedVersion,
    pub dependencies: Vec<ResolvedVersion>,
}

#[derive(Debug, Default)]
pub struct DownloadSummary {
    /// Ids of versions whose files were all written.
    pub downloaded: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub required: Vec<ResolvedProject>,
    pub optional: Vec<ResolvedProject>,
    pub skipped: Vec<(ProjectRequest, Error)>,
    pub downloads: Option<DownloadSummary>,
}

impl BatchReport {
    /// Every resolved version in resolution order, each version id once.
    pub fn versions(&self) -> Vec<&ResolvedVersion> {
        let mut seen = HashSet::new();
        self.required
            .iter()
            .chain(&self.optional)
            .flat_map(|project| std::iter::once(&project.version).chain(&project.dependencies))
            .filter(|version| seen.insert(version.id.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub resolver: ResolverOptions,
    pub verify_hashes: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            resolver: ResolverOptions::default(),
            verify_hashes: true,
        }
    }
}

/// Resolves required and optional projects, then downloads the result.
pub struct BatchOrchestrator<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    options: BatchOptions,
}

impl<'c, C: Catalog + ?Sized> BatchOrchestrator<'c, C> {
    pub fn new(catalog: &'c C, options: BatchOptions) -> Self {
        Self { catalog, options }
    }

    /// Run the whole batch.
    ///
    /// The first required project that fails aborts the run with
    /// [`Error::RequiredProject`] before any optional project is tried. Failed
    /// optional projects are reported and skipped. With `download_dir` set,
    /// each resolved version is downloaded; a failed version is reported and
    /// the remaining versions still download.
    pub async fn run(
        &self,
        required: &[ProjectRequest],
        optional: &[ProjectRequest],
        download_dir: Option<&Path>,
        reporter: &mut dyn Reporter,
    ) -> Result<BatchReport> {
        let versions = VersionResolver::new(self.catalog, self.options.resolver);
        let mut report = BatchReport::default();

        tracing::info!("Resolving {} required projects", required.len());
        for request in required {
            match self.resolve_project(&versions, request).await {
                Ok(project) => {
                    report_resolved(reporter, &project);
                    report.required.push(project);
                }
                Err(error) => {
                    reporter.report(Outcome::Failed {
                        request,
                        error: &error,
                        optional: false,
                    });
                    return Err(Error::RequiredProject {
                        project: request.name.clone(),
                        source: Box::new(error),
                    });
                }
            }
        }

        tracing::info!("Resolving {} optional projects", optional.len());
        for request in optional {
            match self.resolve_project(&versions, request).await {
                Ok(project) => {
                    report_resolved(reporter, &project);
                    report.optional.push(project);
                }
                Err(error) => {
                    tracing::warn!("Skipping optional project {}: {}", request.name, error);
                    reporter.report(Outcome::Failed {
                        request,
                        error: &error,
                        optional: true,
                    });
                    report.skipped.push((request.clone(), error));
                }
            }
        }

        if let Some(dir) = download_dir {
            let summary = self.download_all(&report, dir, reporter).await?;
            report.downloads = Some(summary);
        }

        Ok(report)
    }

    async fn resolve_project(
        &self,
        versions: &VersionResolver<'_, C>,
        request: &ProjectRequest,
    ) -> Result<ResolvedProject> {
        let target = request.target()?;
        let version = versions.resolve(&request.name, &target).await?;
        let dependencies = DependencyResolver::new(versions).resolve(&version).await?;
        Ok(ResolvedProject {
            request: request.clone(),
            version,
            dependencies,
        })
    }

    async fn download_all(
        &self,
        report: &BatchReport,
        dir: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<DownloadSummary> {
        // Only the final component is created; a missing parent is an error.
        match tokio::fs::create_dir(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        let manager = DownloadManager::new(self.catalog, self.options.verify_hashes);
        let mut summary = DownloadSummary::default();

        for version in report.versions() {
            match manager.download_version(version, dir).await {
                Ok(files) => {
                    reporter.report(Outcome::Downloaded { version, files });
                    summary.downloaded.push(version.id.clone());
                }
                Err(error) => {
                    tracing::warn!("Download of {} failed: {}", version.name, error);
                    reporter.report(Outcome::DownloadFailed {
                        version,
                        error: &error,
                    });
                    summary.failed.push((version.id.clone(), error));
                }
            }
        }

        tracing::info!(
            "Downloaded {} versions, {} failed",
            summary.downloaded.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}

fn report_resolved(reporter: &mut dyn Reporter, project: &ResolvedProject) {
    reporter.report(Outcome::Resolved {
        request: &project.request,
        version: &project.version,
        dependencies: &project.dependencies,
    });
}
