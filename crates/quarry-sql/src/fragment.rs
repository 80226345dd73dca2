#[macro_use]
mod fmt;
pub use fmt::ToSql;

mod delim;
pub use delim::{Comma, Delimited};

mod statement;
pub use statement::Statement;

use crate::Adapter;

use quarry_core::stmt::Value;

/// A piece of SQL text with its bound parameters.
///
/// Parameters are recorded by byte offset into `text` and only turn into
/// placeholders when the fragment is rendered for a specific adapter. Values
/// never become part of the text. Fragments are combined with
/// [`Sql::append`]; the parameter order always matches textual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    text: String,
    params: Vec<(usize, Value)>,
    group: Group,
}

/// The top-level connective of a fragment, used to decide when an operand
/// needs parentheses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Group {
    #[default]
    Atom,
    And,
    Or,
}

impl Sql {
    pub fn new() -> Sql {
        Sql::default()
    }

    /// Trusted SQL text: keywords, quoted identifiers, operators.
    pub fn raw(text: impl Into<String>) -> Sql {
        Sql {
            text: text.into(),
            ..Sql::default()
        }
    }

    /// A single bound parameter.
    pub fn param(value: impl Into<Value>) -> Sql {
        Sql {
            text: String::new(),
            params: vec![(0, value.into())],
            group: Group::Atom,
        }
    }

    pub fn append(&mut self, fragment: impl ToSql) -> &mut Sql {
        fragment.to_sql(self);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.params.is_empty()
    }

    /// The SQL text without placeholders.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.params.iter().map(|(_, value)| value)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Wraps the fragment in parentheses.
    pub fn parenthesized(self) -> Sql {
        let mut sql = Sql::raw("(");
        fmt!(&mut sql, self, ")");
        sql
    }

    /// Renders the fragment, numbering placeholders in textual order.
    pub fn render(&self, adapter: &dyn Adapter) -> Statement {
        let mut sql = String::with_capacity(self.text.len() + self.params.len() * 3);
        let mut start = 0;

        for (index, (offset, _)) in self.params.iter().enumerate() {
            sql.push_str(&self.text[start..*offset]);
            adapter.placeholder(index + 1, &mut sql);
            start = *offset;
        }

        sql.push_str(&self.text[start..]);

        Statement {
            sql,
            params: self.params.iter().map(|(_, value)| value.clone()).collect(),
        }
    }

    pub(crate) fn group(&self) -> Group {
        self.group
    }

    pub(crate) fn with_group(mut self, group: Group) -> Sql {
        self.group = group;
        self
    }

    fn push_str(&mut self, text: &str) {
        if !text.is_empty() {
            self.group = Group::Atom;
            self.text.push_str(text);
        }
    }

    fn push_sql(&mut self, other: Sql) {
        if self.is_empty() {
            *self = other;
            return;
        }

        let base = self.text.len();
        self.text.push_str(&other.text);
        self.params
            .extend(other.params.into_iter().map(|(offset, value)| (base + offset, value)));
        self.group = Group::Atom;
    }
}

impl From<&str> for Sql {
    fn from(text: &str) -> Sql {
        Sql::raw(text)
    }
}

impl From<String> for Sql {
    fn from(text: String) -> Sql {
        Sql::raw(text)
    }
}
