use crate::artifact::ArtifactError;
use crate::manifest::{ManifestError, ResolveError};
use crate::plan::PlanError;
use indoc::formatdoc;
use libherokubuildpack::log::log_error;

#[derive(thiserror::Error, Debug)]
pub(crate) enum JdbcBuildpackError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("Couldn't copy driver artifact into layer: {0}")]
    CopyArtifact(std::io::Error),
}

impl From<JdbcBuildpackError> for libcnb::Error<JdbcBuildpackError> {
    fn from(error: JdbcBuildpackError) -> Self {
        libcnb::Error::BuildpackError(error)
    }
}

pub(crate) fn on_jdbc_buildpack_error(error: JdbcBuildpackError) {
    match error {
        JdbcBuildpackError::Plan(error) => log_error(
            "Invalid build plan",
            formatdoc! {"
                A buildpack requested a JDBC driver with metadata that can't be used.

                Details: {}
            ", error},
        ),
        JdbcBuildpackError::Manifest(error) => log_error(
            "Invalid dependency manifest",
            formatdoc! {"
                The dependency manifest in buildpack.toml couldn't be read. This is a bug in the
                buildpack packaging, not in your application.

                Details: {}
            ", error},
        ),
        JdbcBuildpackError::Resolve(error) => log_error(
            "No compatible JDBC driver",
            formatdoc! {"
                The requested JDBC driver version isn't available for this stack. Adjust the
                requested version or use a stack the driver supports.

                Details: {}
            ", error},
        ),
        JdbcBuildpackError::Artifact(error) => log_error(
            "Couldn't obtain JDBC driver",
            formatdoc! {"
                The JDBC driver artifact couldn't be downloaded or verified.

                Details: {}
            ", error},
        ),
        JdbcBuildpackError::CopyArtifact(error) => log_error(
            "Couldn't install JDBC driver",
            format!("Details: {error}"),
        ),
    }
}
