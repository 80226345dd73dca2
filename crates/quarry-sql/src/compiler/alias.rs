use std::{cell::Cell, fmt};

/// A table alias, unique within one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Alias {
    index: usize,

    /// Derived tables wrapping the aliased table reuse its index.
    suffix: Option<&'static str>,
}

/// Hands out `t0`, `t1`, ... for one compilation. Every statement of the
/// compilation draws from the same counter.
#[derive(Debug, Default)]
pub(crate) struct Aliases {
    next: Cell<usize>,
}

impl Alias {
    /// The alias of a derived table owned by `self`, e.g. `t1_r`.
    pub(crate) fn derived(self, suffix: &'static str) -> Alias {
        Alias {
            index: self.index,
            suffix: Some(suffix),
        }
    }

    pub(crate) fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(suffix) => write!(f, "t{}_{suffix}", self.index),
            None => write!(f, "t{}", self.index),
        }
    }
}

impl Aliases {
    pub(crate) fn next(&self) -> Alias {
        let index = self.next.get();
        self.next.set(index + 1);
        Alias {
            index,
            suffix: None,
        }
    }

    /// Number of aliases handed out so far.
    pub(crate) fn allocated(&self) -> usize {
        self.next.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_sequential() {
        let aliases = Aliases::default();
        assert_eq!(aliases.next().name(), "t0");
        assert_eq!(aliases.next().name(), "t1");
        assert_eq!(aliases.allocated(), 2);
    }

    #[test]
    fn derived_aliases_do_not_allocate() {
        let aliases = Aliases::default();
        let alias = aliases.next();

        assert_eq!(alias.derived("r").name(), "t0_r");
        assert_eq!(alias.derived("j").name(), "t0_j");
        assert_eq!(aliases.allocated(), 1);
    }
}
