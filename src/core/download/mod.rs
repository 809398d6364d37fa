use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::api::client::Catalog;
use crate::types::project::{FileLink, ResolvedVersion};
use crate::utils::error::{Error, Result};

/// Fetches a version's files through the catalog and writes them to disk.
pub struct DownloadManager<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    verify_hashes: bool,
}

impl<'c, C: Catalog + ?Sized> DownloadManager<'c, C> {
    pub fn new(catalog: &'c C, verify_hashes: bool) -> Self {
        Self {
            catalog,
            verify_hashes,
        }
    }

    /// Fetch every file of `version` into memory, failing on the first bad one.
    pub async fn fetch_version_files<'v>(
        &self,
        version: &'v ResolvedVersion,
    ) -> Result<Vec<(&'v FileLink, Bytes)>> {
        let mut fetched = Vec::with_capacity(version.files.len());
        for file in &version.files {
            check_filename(&file.filename)?;
            let data = self.catalog.fetch_file(&file.url).await?;
            if self.verify_hashes {
                verify_hash(file, &data)?;
            }
            fetched.push((file, data));
        }
        Ok(fetched)
    }

    /// Download all files of `version` into `dest`, overwriting existing files.
    ///
    /// Nothing is written unless every file was fetched successfully, and a
    /// failed write removes the files already written for this version.
    /// Returns the number of files written.
    pub async fn download_version(&self, version: &ResolvedVersion, dest: &Path) -> Result<usize> {
        let fetched = self.fetch_version_files(version).await?;

        let mut written: Vec<PathBuf> = Vec::with_capacity(fetched.len());
        for (file, data) in &fetched {
            let path = dest.join(&file.filename);
            if let Err(e) = tokio::fs::write(&path, data).await {
                tracing::warn!("Writing {} failed: {}", path.display(), e);
                remove_written(&written).await;
                return Err(e.into());
            }
            tracing::info!("Downloaded {} ({} bytes)", path.display(), data.len());
            written.push(path);
        }

        Ok(written.len())
    }
}

async fn remove_written(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("Could not remove partial download {}: {}", path.display(), e);
        }
    }
}

/// Filenames come from the catalog and must stay inside the target directory.
fn check_filename(filename: &str) -> Result<()> {
    let unsafe_name = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || Path::new(filename).is_absolute();
    if unsafe_name {
        return Err(Error::UnsafeFilename(filename.to_string()));
    }
    Ok(())
}

/// Check `data` against the strongest hash the catalog gave for `file`.
fn verify_hash(file: &FileLink, data: &[u8]) -> Result<()> {
    let (algorithm, expected, actual) = if let Some(expected) = &file.hashes.sha512 {
        use sha2::{Digest, Sha512};
        ("sha512", expected, hex::encode(Sha512::digest(data)))
    } else if let Some(expected) = &file.hashes.sha1 {
        use sha1::{Digest, Sha1};
        ("sha1", expected, hex::encode(Sha1::digest(data)))
    } else {
        return Ok(());
    };

    if actual.eq_ignore_ascii_case(expected) {
        tracing::debug!("{} verified for {}", algorithm, file.filename);
        return Ok(());
    }
    Err(Error::HashMismatch {
        filename: file.filename.clone(),
        algorithm,
        expected: expected.clone(),
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{file_url, raw_version, FakeCatalog};
    use crate::types::loader::LoaderKind;
    use crate::types::project::{FileHashes, Target};

    fn target() -> Target {
        Target {
            game_version: "1.21.5".into(),
            loader: LoaderKind::Fabric,
        }
    }

    fn version(project: &str, files: &[&str]) -> ResolvedVersion {
        raw_version(project, "v1", "2025-03-01T00:00:00Z", files).into_resolved(&target())
    }

    #[test]
    fn rejects_path_like_filenames() {
        assert!(check_filename("sodium.jar").is_ok());
        assert!(check_filename("../sodium.jar").is_err());
        assert!(check_filename("mods/sodium.jar").is_err());
        assert!(check_filename("..").is_err());
        assert!(check_filename("").is_err());
    }

    #[test]
    fn sha1_is_checked_when_no_sha512() {
        let file = FileLink {
            url: "u".into(),
            filename: "f.jar".into(),
            hashes: FileHashes {
                sha1: Some("A9993E364706816ABA3E25717850C26C9CD0D89D".into()),
                sha512: None,
            },
        };
        assert!(verify_hash(&file, b"abc").is_ok());
        let err = verify_hash(&file, b"abd").unwrap_err();
        assert!(matches!(err, Error::HashMismatch { algorithm: "sha1", .. }));
    }

    #[test]
    fn missing_hashes_skip_verification() {
        let file = FileLink {
            url: "u".into(),
            filename: "f.jar".into(),
            hashes: FileHashes::default(),
        };
        assert!(verify_hash(&file, b"anything").is_ok());
    }

    #[tokio::test]
    async fn writes_every_file_of_a_version() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog::new()
            .with_file(&file_url("iris", "iris.jar"), b"iris")
            .with_file(&file_url("iris", "iris-sources.jar"), b"sources");
        let manager = DownloadManager::new(&catalog, true);

        let iris = version("iris", &["iris.jar", "iris-sources.jar"]);
        let count = manager.download_version(&iris, dir.path()).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dir.path().join("iris.jar")).unwrap(), b"iris");
        assert_eq!(std::fs::read(dir.path().join("iris-sources.jar")).unwrap(), b"sources");
    }

    #[tokio::test]
    async fn empty_second_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FakeCatalog::new()
            .with_file(&file_url("iris", "a.jar"), b"data")
            .with_file(&file_url("iris", "b.jar"), b"");
        let manager = DownloadManager::new(&catalog, true);

        let err = manager
            .download_version(&version("iris", &["a.jar", "b.jar"]), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptyPayload { .. }));
        assert!(!dir.path().join("a.jar").exists());
        assert!(!dir.path().join("b.jar").exists());
    }

    #[tokio::test]
    async fn existing_files_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jar"), b"stale").unwrap();
        let catalog = FakeCatalog::new().with_file(&file_url("p", "a.jar"), b"fresh");
        let manager = DownloadManager::new(&catalog, false);

        manager
            .download_version(&version("p", &["a.jar"]), dir.path())
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.jar")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn failed_write_removes_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the second write fail.
        std::fs::create_dir(dir.path().join("b.jar")).unwrap();
        let catalog = FakeCatalog::new()
            .with_file(&file_url("p", "a.jar"), b"a")
            .with_file(&file_url("p", "b.jar"), b"b");
        let manager = DownloadManager::new(&catalog, true);

        let err = manager
            .download_version(&version("p", &["a.jar", "b.jar"]), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!dir.path().join("a.jar").exists());
        assert!(dir.path().join("b.jar").is_dir());
    }
}
