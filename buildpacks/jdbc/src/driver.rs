use libcnb::data::layer::LayerName;
use libcnb::data::layer_name;

/// Build plan name requesting the MariaDB JDBC driver.
pub(crate) const MARIADB_DEPENDENCY: &str = "mariadb-jdbc";

/// Build plan name requesting the PostgreSQL JDBC driver.
pub(crate) const POSTGRESQL_DEPENDENCY: &str = "postgresql-jdbc";

/// A JDBC driver family this buildpack can contribute.
///
/// Each family is looked up in the build plan and the dependency manifest by its dependency id, and
/// gets a launch layer of its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JdbcDriver {
    MariaDb,
    PostgreSql,
}

impl JdbcDriver {
    /// All supported drivers, in contribution order.
    pub(crate) const ALL: [JdbcDriver; 2] = [JdbcDriver::MariaDb, JdbcDriver::PostgreSql];

    pub(crate) fn dependency_id(self) -> &'static str {
        match self {
            JdbcDriver::MariaDb => MARIADB_DEPENDENCY,
            JdbcDriver::PostgreSql => POSTGRESQL_DEPENDENCY,
        }
    }

    pub(crate) fn layer_name(self) -> LayerName {
        match self {
            JdbcDriver::MariaDb => layer_name!("mariadb-jdbc"),
            JdbcDriver::PostgreSql => layer_name!("postgresql-jdbc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names_match_dependency_ids() {
        for driver in JdbcDriver::ALL {
            assert_eq!(driver.layer_name().as_str(), driver.dependency_id());
        }
    }

    #[test]
    fn dependency_ids() {
        assert_eq!(JdbcDriver::MariaDb.dependency_id(), "mariadb-jdbc");
        assert_eq!(JdbcDriver::PostgreSql.dependency_id(), "postgresql-jdbc");
    }
}
