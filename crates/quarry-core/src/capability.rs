/// Features that differ between the supported databases.
///
/// The compiler consults these flags before emitting a construct. Adapters
/// never check them: an adapter renders whatever it is asked to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Supports `RETURNING` on INSERT, UPDATE and DELETE.
    pub returning: bool,

    /// Supports data-modifying statements inside a `WITH` clause.
    pub cte_with_mutations: bool,

    /// Supports `FULL OUTER JOIN`.
    pub full_outer_join: bool,

    /// Supports `SELECT DISTINCT ON (..)`.
    pub distinct_on: bool,

    /// Supports `NULLS FIRST` / `NULLS LAST` in ORDER BY items.
    pub nulls_ordering: bool,

    /// Maximum number of bind parameters in a single statement.
    pub max_bind_params: usize,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        returning: true,
        cte_with_mutations: false,
        full_outer_join: true,
        distinct_on: false,
        nulls_ordering: true,

        // SQLITE_MAX_VARIABLE_NUMBER defaults to 32766 since 3.32.0.
        max_bind_params: 32766,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        cte_with_mutations: true,
        distinct_on: true,
        max_bind_params: 65535,
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        returning: false,
        full_outer_join: false,
        nulls_ordering: false,
        max_bind_params: 65535,
        ..Self::SQLITE
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_lacks_returning_and_full_outer_join() {
        assert!(!Capability::MYSQL.returning);
        assert!(!Capability::MYSQL.full_outer_join);
        assert!(Capability::POSTGRESQL.returning);
        assert!(Capability::SQLITE.returning);
    }

    #[test]
    fn only_postgresql_mutates_in_ctes() {
        assert!(Capability::POSTGRESQL.cte_with_mutations);
        assert!(!Capability::MYSQL.cte_with_mutations);
        assert!(!Capability::SQLITE.cte_with_mutations);
    }
}
