use serde::Deserialize;

/// Knobs that change how operations are compiled, independent of the
/// adapter.
///
/// Loadable from any serde format; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Read mutated records back with a follow-up SELECT when the database
    /// has no `RETURNING`. When disabled, such operations fail to compile.
    pub emulate_returning: bool,

    /// Overrides the adapter's bind-parameter limit when splitting
    /// `createMany` into statements.
    pub max_bind_params: Option<usize>,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn emulate_returning(mut self, emulate: bool) -> Config {
        self.emulate_returning = emulate;
        self
    }

    pub fn max_bind_params(mut self, max: usize) -> Config {
        self.max_bind_params = Some(max);
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            emulate_returning: true,
            max_bind_params: None,
        }
    }
}
