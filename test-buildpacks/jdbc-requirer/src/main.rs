// Requires the JDBC drivers listed in an app's `jdbc-drivers.toml`, so integration tests can drive
// the build plan of the JDBC buildpack.

use libcnb::build::{BuildContext, BuildResult, BuildResultBuilder};
use libcnb::data::build_plan::{BuildPlanBuilder, Require};
use libcnb::detect::{DetectContext, DetectResult, DetectResultBuilder};
use libcnb::generic::{GenericMetadata, GenericPlatform};
use libcnb::{buildpack_main, Buildpack};
use serde::{Deserialize, Serialize};
use std::fs;

pub(crate) struct TestBuildpack;

impl Buildpack for TestBuildpack {
    type Platform = GenericPlatform;
    type Metadata = GenericMetadata;
    type Error = TestBuildpackError;

    fn detect(&self, context: DetectContext<Self>) -> libcnb::Result<DetectResult, Self::Error> {
        let Ok(contents) = fs::read_to_string(context.app_dir.join("jdbc-drivers.toml")) else {
            return DetectResultBuilder::fail().build();
        };

        let requests: DriverRequests =
            toml::from_str(&contents).expect("jdbc-drivers.toml should be valid");

        let build_plan = requests
            .drivers
            .into_iter()
            .fold(BuildPlanBuilder::new(), |builder, driver| {
                let mut require = Require::new(driver.name);
                if let Some(version) = driver.version {
                    require
                        .metadata(RequireMetadata { version })
                        .expect("Require metadata should serialize");
                }
                builder.requires(require)
            })
            .build();

        DetectResultBuilder::pass().build_plan(build_plan).build()
    }

    fn build(&self, _context: BuildContext<Self>) -> libcnb::Result<BuildResult, Self::Error> {
        BuildResultBuilder::new().build()
    }
}

#[derive(Deserialize)]
struct DriverRequests {
    #[serde(default)]
    drivers: Vec<DriverRequest>,
}

#[derive(Deserialize)]
struct DriverRequest {
    name: String,
    version: Option<String>,
}

#[derive(Serialize)]
struct RequireMetadata {
    version: String,
}

#[derive(Debug)]
pub(crate) enum TestBuildpackError {}

buildpack_main!(TestBuildpack);
