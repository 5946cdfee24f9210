use crate::artifact;
use crate::driver::JdbcDriver;
use crate::errors::JdbcBuildpackError;
use crate::manifest::ManifestDependency;
use crate::JdbcBuildpack;
use libcnb::build::BuildContext;
use libcnb::layer::{
    CachedLayerDefinition, EmptyLayerCause, InvalidMetadataAction, LayerRef, LayerState,
    RestoredLayerAction,
};
use libcnb::layer_env::{LayerEnv, ModificationBehavior, Scope};
use libherokubuildpack::log::log_info;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CLASSPATH: &str = "CLASSPATH";
const CLASSPATH_DELIMITER: &str = ":";

/// Cache key of a driver layer. The layer is reused only while all fields stay the same.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct DriverLayerMetadata {
    id: String,
    version: Version,
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl DriverLayerMetadata {
    fn for_dependency(dependency: &ManifestDependency) -> Self {
        Self {
            id: dependency.id.clone(),
            version: dependency.version.clone(),
            uri: dependency.uri.clone(),
            sha256: dependency.sha256.clone(),
        }
    }

    /// Describes how `current` differs from this cached key, empty when the cache is still valid.
    fn changes(&self, current: &Self) -> Vec<String> {
        let mut changes = Vec::new();

        if self.id != current.id {
            changes.push(format!("dependency ({} to {})", self.id, current.id));
        }
        if self.version != current.version {
            changes.push(format!("version ({} to {})", self.version, current.version));
        }
        if self.uri != current.uri {
            changes.push(String::from("download URI"));
        }
        if self.sha256 != current.sha256 {
            changes.push(String::from("checksum"));
        }

        changes
    }
}

/// A launch layer bound to one resolved driver dependency.
pub(crate) struct DriverContributor {
    dependency: ManifestDependency,
    layer_ref: LayerRef<JdbcBuildpack, (), Vec<String>>,
}

/// Obtains the cached launch layer of `driver`, keyed by the identity of `dependency`.
pub(crate) fn driver_layer(
    context: &BuildContext<JdbcBuildpack>,
    driver: JdbcDriver,
    dependency: ManifestDependency,
) -> libcnb::Result<DriverContributor, JdbcBuildpackError> {
    let metadata = DriverLayerMetadata::for_dependency(&dependency);

    let layer_ref = context.cached_layer(
        driver.layer_name(),
        CachedLayerDefinition {
            build: false,
            launch: true,
            invalid_metadata_action: &|_| InvalidMetadataAction::DeleteLayer,
            restored_layer_action: &|cached: &DriverLayerMetadata, _| {
                let changes = cached.changes(&metadata);
                if changes.is_empty() {
                    (RestoredLayerAction::KeepLayer, changes)
                } else {
                    (RestoredLayerAction::DeleteLayer, changes)
                }
            },
        },
    )?;

    Ok(DriverContributor {
        dependency,
        layer_ref,
    })
}

impl DriverContributor {
    /// Copies the driver into its layer and prepends it to the launch `CLASSPATH`.
    ///
    /// Does nothing when the layer was restored from a previous build with the same cache key.
    pub(crate) fn contribute(
        &self,
        buildpack_dir: &Path,
    ) -> libcnb::Result<(), JdbcBuildpackError> {
        let dependency = &self.dependency;
        let heading = format!("{} {}", dependency.name, dependency.version);

        match &self.layer_ref.state {
            LayerState::Restored { .. } => {
                log_info(format!("{heading}: Reusing cached layer"));
            }
            LayerState::Empty { cause } => {
                if let EmptyLayerCause::RestoredLayerAction { cause: changes } = cause {
                    log_info(format!(
                        "{heading}: Clearing cached layer due to change of {}",
                        changes.join(", ")
                    ));
                }
                log_info(format!("{heading}: Contributing to layer"));

                let artifact = artifact::acquire(dependency, buildpack_dir)
                    .map_err(JdbcBuildpackError::Artifact)?;

                let layer_dir = self.layer_ref.path();
                log_info(format!("  Copying to {}", layer_dir.display()));

                let destination =
                    install_artifact(artifact.path(), &layer_dir, &dependency.artifact_name())
                        .map_err(JdbcBuildpackError::CopyArtifact)?;

                self.layer_ref.write_env(classpath_env(&destination))?;
                self.layer_ref
                    .write_metadata(DriverLayerMetadata::for_dependency(dependency))?;
            }
        }

        Ok(())
    }
}

fn install_artifact(
    artifact: &Path,
    layer_dir: &Path,
    file_name: &str,
) -> std::io::Result<PathBuf> {
    let destination = layer_dir.join(file_name);
    fs::copy(artifact, &destination)?;
    Ok(destination)
}

fn classpath_env(destination: &Path) -> LayerEnv {
    LayerEnv::new()
        .chainable_insert(
            Scope::Launch,
            ModificationBehavior::Prepend,
            CLASSPATH,
            destination,
        )
        .chainable_insert(
            Scope::Launch,
            ModificationBehavior::Delimiter,
            CLASSPATH,
            CLASSPATH_DELIMITER,
        )
}
