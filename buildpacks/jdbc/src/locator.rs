use crate::driver::JdbcDriver;
use crate::errors::JdbcBuildpackError;
use crate::layers::{driver_layer, DriverContributor};
use crate::manifest::{DependencyManifest, ManifestDependency};
use crate::plan::dependency_request;
use crate::JdbcBuildpack;
use libcnb::build::BuildContext;
use libcnb::data::buildpack_plan::BuildpackPlan;
use libcnb::generic::GenericMetadata;

/// Outcome of looking up a driver for the current build.
pub(crate) enum DriverLocation {
    /// No buildpack asked for the driver. Not an error.
    NotRequested,
    Resolved(DriverContributor),
}

/// Resolves `driver` against the build plan and dependency manifest and obtains its layer.
///
/// A requested driver without a compatible manifest entry is an error, never `NotRequested`.
pub(crate) fn locate(
    context: &BuildContext<JdbcBuildpack>,
    driver: JdbcDriver,
    stack: Option<&str>,
) -> libcnb::Result<DriverLocation, JdbcBuildpackError> {
    match resolve_dependency(
        &context.buildpack_plan,
        &context.buildpack_descriptor.metadata,
        driver,
        stack,
    )? {
        None => Ok(DriverLocation::NotRequested),
        Some(dependency) => driver_layer(context, driver, dependency).map(DriverLocation::Resolved),
    }
}

fn resolve_dependency(
    plan: &BuildpackPlan,
    metadata: &GenericMetadata,
    driver: JdbcDriver,
    stack: Option<&str>,
) -> Result<Option<ManifestDependency>, JdbcBuildpackError> {
    let Some(request) = dependency_request(plan, driver.dependency_id())? else {
        return Ok(None);
    };

    let manifest = DependencyManifest::from_metadata(metadata)?;
    let dependency = manifest.best(&request.name, &request.version, stack)?;

    Ok(Some(dependency.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use semver::Version;

    const MANIFEST: &str = indoc! {r#"
        [[dependencies]]
        id = "mariadb-jdbc"
        name = "MariaDB JDBC Driver"
        version = "2.7.0"
        uri = "https://example.com/mariadb-java-client-2.7.0.jar"
        stacks = ["heroku-24"]

        [[dependencies]]
        id = "postgresql-jdbc"
        name = "PostgreSQL JDBC Driver"
        version = "42.1.0"
        uri = "https://example.com/postgresql-42.1.0.jar"
        stacks = ["heroku-24"]
    "#};

    fn plan(toml: &str) -> BuildpackPlan {
        toml::from_str(toml).unwrap()
    }

    fn manifest_metadata() -> GenericMetadata {
        Some(toml::from_str(MANIFEST).unwrap())
    }

    #[test]
    fn not_requested_without_plan_entry() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "postgresql-jdbc"
        "#});

        let dependency =
            resolve_dependency(&plan, &manifest_metadata(), JdbcDriver::MariaDb, Some("heroku-24"))
                .unwrap();

        assert_eq!(dependency, None);
    }

    #[test]
    fn not_requested_does_not_load_manifest() {
        let dependency =
            resolve_dependency(&plan(""), &None, JdbcDriver::PostgreSql, Some("heroku-24"))
                .unwrap();

        assert_eq!(dependency, None);
    }

    #[test]
    fn resolves_requested_driver_without_version() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "postgresql-jdbc"
        "#});

        let dependency = resolve_dependency(
            &plan,
            &manifest_metadata(),
            JdbcDriver::PostgreSql,
            Some("heroku-24"),
        )
        .unwrap()
        .unwrap();

        assert_eq!(dependency.version, Version::new(42, 1, 0));
        assert_eq!(dependency.artifact_name(), "postgresql-jdbc-42.1.0.jar");
    }

    #[test]
    fn unsatisfiable_version_is_an_error() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "mariadb-jdbc"

            [entries.metadata]
            version = ">=3.0"
        "#});

        assert!(matches!(
            resolve_dependency(&plan, &manifest_metadata(), JdbcDriver::MariaDb, Some("heroku-24")),
            Err(JdbcBuildpackError::Resolve(_))
        ));
    }

    #[test]
    fn incompatible_stack_is_an_error() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "mariadb-jdbc"
        "#});

        assert!(matches!(
            resolve_dependency(&plan, &manifest_metadata(), JdbcDriver::MariaDb, Some("heroku-22")),
            Err(JdbcBuildpackError::Resolve(_))
        ));
    }

    #[test]
    fn malformed_plan_is_an_error() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "mariadb-jdbc"

            [entries.metadata]
            version = ["2.7.0"]
        "#});

        assert!(matches!(
            resolve_dependency(&plan, &manifest_metadata(), JdbcDriver::MariaDb, Some("heroku-24")),
            Err(JdbcBuildpackError::Plan(_))
        ));
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let plan = plan(indoc! {r#"
            [[entries]]
            name = "mariadb-jdbc"
        "#});

        assert!(matches!(
            resolve_dependency(&plan, &None, JdbcDriver::MariaDb, Some("heroku-24")),
            Err(JdbcBuildpackError::Manifest(_))
        ));
    }
}
