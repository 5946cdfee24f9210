mod artifact;
mod driver;
mod errors;
mod layers;
mod locator;
mod manifest;
mod plan;
mod stack;

use crate::driver::JdbcDriver;
use crate::errors::{on_jdbc_buildpack_error, JdbcBuildpackError};
use crate::locator::DriverLocation;
use libcnb::build::{BuildContext, BuildResult, BuildResultBuilder};
use libcnb::data::build_plan::BuildPlanBuilder;
use libcnb::detect::{DetectContext, DetectResult, DetectResultBuilder};
use libcnb::generic::{GenericMetadata, GenericPlatform};
use libcnb::{buildpack_main, Buildpack};
use libherokubuildpack::error::on_error;
use libherokubuildpack::log::log_header;

// Suppress warnings due to the `unused_crate_dependencies` lint not handling integration tests well.
#[cfg(test)]
use libcnb_test as _;

pub(crate) struct JdbcBuildpack;

impl Buildpack for JdbcBuildpack {
    type Platform = GenericPlatform;
    type Metadata = GenericMetadata;
    type Error = JdbcBuildpackError;

    fn detect(&self, _context: DetectContext<Self>) -> libcnb::Result<DetectResult, Self::Error> {
        // The empty alternative lets the buildpack pass when no other buildpack requires a driver.
        let build_plan = JdbcDriver::ALL
            .iter()
            .fold(BuildPlanBuilder::new(), |builder, driver| {
                builder.provides(driver.dependency_id())
            })
            .or()
            .build();

        DetectResultBuilder::pass().build_plan(build_plan).build()
    }

    fn build(&self, context: BuildContext<Self>) -> libcnb::Result<BuildResult, Self::Error> {
        log_header("JDBC Drivers");

        let stack = stack::current_stack_id(&context.target);

        for driver in JdbcDriver::ALL {
            match locator::locate(&context, driver, stack.as_deref())? {
                DriverLocation::NotRequested => {}
                DriverLocation::Resolved(contributor) => {
                    contributor.contribute(&context.buildpack_dir)?;
                }
            }
        }

        BuildResultBuilder::new().build()
    }

    fn on_error(&self, error: libcnb::Error<Self::Error>) {
        on_error(on_jdbc_buildpack_error, error);
    }
}

buildpack_main!(JdbcBuildpack);
