//! Resolve a list of Minecraft projects against the Modrinth catalog and
//! download the chosen versions.

pub mod api;
pub mod config;
pub mod core;
pub mod types;
pub mod utils;

pub use crate::api::client::Catalog;
pub use crate::api::labrinth::{check_enums, LabrinthSession, LABRINTH_URL};
pub use crate::config::{ModsConfig, Overrides};
pub use crate::core::batch::{
    BatchOptions, BatchOrchestrator, BatchReport, ConsoleReporter, Outcome, Reporter,
};
pub use crate::core::resolver::{DependencyResolver, ResolverOptions, VersionResolver};
pub use crate::types::loader::{DependencyKind, LoaderKind};
pub use crate::types::project::{
    FileLink, ProjectRequest, ResolvedVersion, Target, VersionDependency,
};
pub use crate::utils::error::{Error, Result};
