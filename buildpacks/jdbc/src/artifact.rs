use crate::manifest::ManifestDependency;
use libherokubuildpack::digest::sha256;
use libherokubuildpack::download::{download_file, DownloadError};
use libherokubuildpack::log::{log_info, log_warning};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A driver artifact available on local disk.
///
/// Downloaded artifacts live in a temporary directory that is removed once this value is dropped.
pub(crate) struct Artifact {
    path: PathBuf,
    _download_dir: Option<TempDir>,
}

impl Artifact {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ArtifactError {
    #[error("Couldn't create temporary download directory: {0}")]
    CreateDownloadDir(std::io::Error),
    #[error("Couldn't download {uri}: {source}")]
    Download { uri: String, source: DownloadError },
    #[error("Couldn't calculate checksum of {}: {source}", .path.display())]
    Checksum {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Checksum mismatch for {uri}: expected sha256 {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },
}

/// Whether an artifact was checked against a declared checksum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Verification {
    Verified,
    Unverified,
}

/// Makes the artifact of `dependency` available locally.
///
/// An offline copy at `<buildpack dir>/dependencies/<sha256>/<file name>` is preferred over a
/// download. Artifacts with a declared sha256 are verified either way, others are installed with a
/// warning.
pub(crate) fn acquire(
    dependency: &ManifestDependency,
    buildpack_dir: &Path,
) -> Result<Artifact, ArtifactError> {
    let artifact = match offline_path(dependency, buildpack_dir) {
        Some(path) => {
            log_info(format!("  Using offline artifact {}", path.display()));
            Artifact {
                path,
                _download_dir: None,
            }
        }
        None => download(dependency)?,
    };

    if verify(dependency, &artifact.path)? == Verification::Unverified {
        log_warning(
            "Unverified JDBC driver",
            format!(
                "The dependency manifest declares no sha256 for {} {}. The downloaded artifact was not verified.",
                dependency.name, dependency.version
            ),
        );
    }

    Ok(artifact)
}

fn offline_path(dependency: &ManifestDependency, buildpack_dir: &Path) -> Option<PathBuf> {
    let sha256 = dependency.sha256.as_ref()?;

    let path = buildpack_dir
        .join("dependencies")
        .join(sha256)
        .join(source_file_name(dependency));

    path.is_file().then_some(path)
}

fn download(dependency: &ManifestDependency) -> Result<Artifact, ArtifactError> {
    let download_dir = tempfile::tempdir().map_err(ArtifactError::CreateDownloadDir)?;
    let path = download_dir.path().join(source_file_name(dependency));

    log_info(format!("  Downloading from {}", dependency.uri));
    download_file(&dependency.uri, &path).map_err(|source| ArtifactError::Download {
        uri: dependency.uri.clone(),
        source,
    })?;

    Ok(Artifact {
        path,
        _download_dir: Some(download_dir),
    })
}

fn verify(dependency: &ManifestDependency, path: &Path) -> Result<Verification, ArtifactError> {
    let Some(expected) = &dependency.sha256 else {
        return Ok(Verification::Unverified);
    };

    let actual = sha256(path).map_err(|source| ArtifactError::Checksum {
        path: path.to_path_buf(),
        source,
    })?;

    if actual.eq_ignore_ascii_case(expected) {
        Ok(Verification::Verified)
    } else {
        Err(ArtifactError::ChecksumMismatch {
            uri: dependency.uri.clone(),
            expected: expected.clone(),
            actual,
        })
    }
}

/// The last path segment of the dependency's URI, falling back to the installed artifact name.
fn source_file_name(dependency: &ManifestDependency) -> String {
    dependency
        .uri
        .split(['?', '#'])
        .next()
        .and_then(|uri| uri.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| dependency.artifact_name(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use std::fs;

    // sha256 of "Hello World!"
    const HELLO_WORLD_SHA256: &str =
        "7f83b1657ff1fc53b92dc18148a1d65dfc2d4b1fa3d677284addd200126d9069";

    fn dependency(uri: &str, sha256: Option<&str>) -> ManifestDependency {
        ManifestDependency {
            id: String::from("postgresql-jdbc"),
            name: String::from("PostgreSQL JDBC Driver"),
            version: Version::new(42, 7, 4),
            uri: String::from(uri),
            sha256: sha256.map(String::from),
            stacks: vec![String::from("*")],
        }
    }

    fn write_offline_artifact(buildpack_dir: &Path, sha256: &str, contents: &str) -> PathBuf {
        let directory = buildpack_dir.join("dependencies").join(sha256);
        fs::create_dir_all(&directory).unwrap();
        let path = directory.join("postgresql-42.7.4.jar");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn uses_verified_offline_artifact() {
        let buildpack_dir = tempfile::tempdir().unwrap();
        let offline =
            write_offline_artifact(buildpack_dir.path(), HELLO_WORLD_SHA256, "Hello World!");

        let artifact = acquire(
            &dependency(
                "https://example.com/postgresql-42.7.4.jar",
                Some(HELLO_WORLD_SHA256),
            ),
            buildpack_dir.path(),
        )
        .unwrap();

        assert_eq!(artifact.path(), offline);
    }

    #[test]
    fn rejects_offline_artifact_with_wrong_checksum() {
        let buildpack_dir = tempfile::tempdir().unwrap();
        write_offline_artifact(buildpack_dir.path(), HELLO_WORLD_SHA256, "Goodbye World!");

        let result = acquire(
            &dependency(
                "https://example.com/postgresql-42.7.4.jar",
                Some(HELLO_WORLD_SHA256),
            ),
            buildpack_dir.path(),
        );

        match result {
            Err(ArtifactError::ChecksumMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, HELLO_WORLD_SHA256);
                assert_ne!(actual, HELLO_WORLD_SHA256);
            }
            _ => panic!("expected a checksum mismatch"),
        }
    }

    #[test]
    fn accepts_uppercase_checksum() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("driver.jar");
        fs::write(&path, "Hello World!").unwrap();

        let uppercase = HELLO_WORLD_SHA256.to_uppercase();
        let verification = verify(
            &dependency("https://example.com/driver.jar", Some(&uppercase)),
            &path,
        )
        .unwrap();

        assert_eq!(verification, Verification::Verified);
    }

    #[test]
    fn reports_artifact_without_checksum_as_unverified() {
        let verification = verify(
            &dependency("https://example.com/driver.jar", None),
            Path::new("/does/not/exist.jar"),
        )
        .unwrap();

        assert_eq!(verification, Verification::Unverified);
    }

    #[test]
    fn offline_artifact_requires_checksum() {
        let buildpack_dir = tempfile::tempdir().unwrap();
        write_offline_artifact(buildpack_dir.path(), HELLO_WORLD_SHA256, "Hello World!");

        assert_eq!(
            offline_path(
                &dependency("https://example.com/postgresql-42.7.4.jar", None),
                buildpack_dir.path()
            ),
            None
        );
    }

    #[test]
    fn source_file_name_is_last_uri_segment() {
        assert_eq!(
            source_file_name(&dependency(
                "https://repo1.maven.org/maven2/org/postgresql/postgresql/42.7.4/postgresql-42.7.4.jar",
                None
            )),
            "postgresql-42.7.4.jar"
        );
        assert_eq!(
            source_file_name(&dependency(
                "https://example.com/download/driver.jar?token=abc",
                None
            )),
            "driver.jar"
        );
    }

    #[test]
    fn source_file_name_falls_back_to_artifact_name() {
        assert_eq!(
            source_file_name(&dependency("https://example.com/drivers/", None)),
            "postgresql-jdbc-42.7.4.jar"
        );
    }
}
