mod driver;

pub(crate) use self::driver::{driver_layer, DriverContributor};
