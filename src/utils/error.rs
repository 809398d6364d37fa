/// Every recoverable failure in the resolve/download pipeline.
///
/// Operations return these through [`Result`] and never panic for them.
/// [`Error::Unreachable`] only comes out of session construction and is
/// escalated to a fatal exit by the caller.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request to {url} failed: status {status}, body {body:?}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Catalog at {url} is unreachable (status {status})")]
    Unreachable { url: String, status: u16 },

    #[error("Required project {project} failed: {source}")]
    RequiredProject {
        project: String,
        #[source]
        source: Box<Error>,
    },

    #[error("No versions found matching the given filters for {project}")]
    NoMatch { project: String },

    #[error("Version {version} of {project} has no files")]
    NoFiles { project: String, version: String },

    #[error("Downloaded file is empty: {url}")]
    EmptyPayload { url: String },

    #[error("Hash mismatch for {filename} ({algorithm}): expected {expected}, got {actual}")]
    HashMismatch {
        filename: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Refusing to write unsafe filename {0:?}")]
    UnsafeFilename(String),

    #[error("Project {project} has no {field} and no default")]
    IncompleteRequest {
        project: String,
        field: &'static str,
    },

    #[error("Dependency of {version} names neither a project nor a version")]
    UnresolvableDependency { version: String },

    #[error("Loader enumeration out of sync: extra {extra:?}, missing {missing:?}")]
    EnumDrift {
        extra: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Invalid {kind}: {value:?}")]
    InvalidEnum { kind: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for a well-formed but unsuccessful HTTP response.
    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status { .. })
    }
}
