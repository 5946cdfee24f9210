use libcnb::generic::GenericMetadata;
use semver::{Version, VersionReq};
use serde::Deserialize;
use toml::Value;

/// Stack entry marking a dependency as compatible with every stack.
pub(crate) const ANY_STACK: &str = "*";

/// The `[[metadata.dependencies]]` entries of `buildpack.toml`.
#[derive(Clone, Debug)]
pub(crate) struct DependencyManifest {
    dependencies: Vec<ManifestDependency>,
}

/// A driver artifact listed in the manifest.
///
/// Additional descriptive fields such as `licenses`, `purl` or `cpes` are accepted and ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct ManifestDependency {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) version: Version,
    pub(crate) uri: String,
    #[serde(default)]
    pub(crate) sha256: Option<String>,
    pub(crate) stacks: Vec<String>,
}

impl ManifestDependency {
    /// File name the artifact is installed under, for example `postgresql-jdbc-42.7.4.jar`.
    pub(crate) fn artifact_name(&self) -> String {
        format!("{}-{}.jar", self.id, self.version)
    }

    pub(crate) fn supports_stack(&self, stack: Option<&str>) -> bool {
        self.stacks
            .iter()
            .any(|candidate| candidate == ANY_STACK || Some(candidate.as_str()) == stack)
    }
}

#[derive(Deserialize)]
struct ManifestMetadata {
    #[serde(default)]
    dependencies: Vec<ManifestDependency>,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ManifestError {
    #[error("buildpack.toml has no [metadata] table")]
    MissingMetadata,
    #[error("buildpack.toml [metadata] isn't a valid dependency manifest: {0}")]
    InvalidMetadata(toml::de::Error),
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ResolveError {
    #[error(
        "No {id} dependency satisfies version requirement `{requirement}` on stack `{stack}`. Available: {}",
        display_available(.available)
    )]
    NoCompatibleDependency {
        id: String,
        requirement: VersionReq,
        stack: String,
        available: Vec<String>,
    },
}

fn display_available(available: &[String]) -> String {
    if available.is_empty() {
        String::from("none")
    } else {
        available.join(", ")
    }
}

impl DependencyManifest {
    pub(crate) fn from_metadata(metadata: &GenericMetadata) -> Result<Self, ManifestError> {
        let table = metadata.as_ref().ok_or(ManifestError::MissingMetadata)?;

        let ManifestMetadata { dependencies } = Value::Table(table.clone())
            .try_into()
            .map_err(ManifestError::InvalidMetadata)?;

        Ok(Self { dependencies })
    }

    /// Selects the highest version of `id` that satisfies `requirement` and supports `stack`.
    ///
    /// An unknown stack (`None`) is only compatible with wildcard entries.
    pub(crate) fn best(
        &self,
        id: &str,
        requirement: &VersionReq,
        stack: Option<&str>,
    ) -> Result<&ManifestDependency, ResolveError> {
        self.dependencies
            .iter()
            .filter(|dependency| {
                dependency.id == id
                    && dependency.supports_stack(stack)
                    && requirement.matches(&dependency.version)
            })
            .max_by(|a, b| a.version.cmp(&b.version))
            .ok_or_else(|| ResolveError::NoCompatibleDependency {
                id: id.to_string(),
                requirement: requirement.clone(),
                stack: stack.unwrap_or("unknown").to_string(),
                available: self
                    .dependencies
                    .iter()
                    .filter(|dependency| dependency.id == id)
                    .map(|dependency| {
                        format!("{} [{}]", dependency.version, dependency.stacks.join(", "))
                    })
                    .collect(),
            })
    }
}
