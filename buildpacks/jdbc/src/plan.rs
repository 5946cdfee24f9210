use libcnb::data::buildpack_plan::BuildpackPlan;
use semver::VersionReq;
use toml::Value;

/// The merged build plan request for a single dependency.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DependencyRequest {
    pub(crate) name: String,
    /// Requirement every matching plan entry agreed on. `*` when no entry declared a version.
    pub(crate) version: VersionReq,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum PlanError {
    #[error("Build plan entry `{name}` declares a version that isn't a string: {value}")]
    VersionNotAString { name: String, value: Value },
    #[error("Build plan entry `{name}` declares an invalid version requirement `{version}`: {source}")]
    InvalidVersionRequirement {
        name: String,
        version: String,
        source: semver::Error,
    },
}

/// Looks up the entries named `name` in the buildpack plan and shallow-merges them.
///
/// Returns `Ok(None)` when no entry requests the dependency. Version requirements of all entries
/// are intersected, entries without a `version` key don't constrain the result.
pub(crate) fn dependency_request(
    plan: &BuildpackPlan,
    name: &str,
) -> Result<Option<DependencyRequest>, PlanError> {
    let mut entries = plan
        .entries
        .iter()
        .filter(|entry| entry.name == name)
        .peekable();

    if entries.peek().is_none() {
        return Ok(None);
    }

    let mut comparators = Vec::new();
    for entry in entries {
        match entry.metadata.get("version") {
            None => {}
            Some(Value::String(version)) => {
                comparators.extend(parse_version_requirement(name, version)?.comparators);
            }
            Some(value) => {
                return Err(PlanError::VersionNotAString {
                    name: name.to_string(),
                    value: value.clone(),
                });
            }
        }
    }

    Ok(Some(DependencyRequest {
        name: name.to_string(),
        version: VersionReq { comparators },
    }))
}

fn parse_version_requirement(name: &str, version: &str) -> Result<VersionReq, PlanError> {
    match version.trim() {
        "" | "latest" => Ok(VersionReq::STAR),
        trimmed => VersionReq::parse(trimmed).map_err(|source| PlanError::InvalidVersionRequirement {
            name: name.to_string(),
            version: version.to_string(),
            source,
        }),
    }
}
