use crate::Sql;

pub trait Identifiers {
    /// Quotes a single identifier.
    fn quote(&self, ident: &str) -> String;

    fn table(&self, name: &str) -> Sql {
        Sql::raw(self.quote(name))
    }

    /// `"table" AS alias`
    fn table_as(&self, name: &str, alias: &str) -> Sql {
        let mut sql = self.table(name);
        fmt!(&mut sql, " AS ", alias);
        sql
    }

    /// A column, optionally qualified. The qualifier is inserted verbatim.
    fn column(&self, qualifier: Option<&str>, name: &str) -> Sql {
        match qualifier {
            Some(qualifier) => Sql::raw(format!("{qualifier}.{}", self.quote(name))),
            None => Sql::raw(self.quote(name)),
        }
    }

    /// `expr AS "alias"`
    fn aliased(&self, expr: Sql, alias: &str) -> Sql {
        let mut sql = expr;
        fmt!(&mut sql, " AS ", self.quote(alias));
        sql
    }

    /// A string literal for trusted text such as JSON keys.
    fn literal(&self, text: &str) -> Sql {
        Sql::raw(format!("'{}'", text.replace('\'', "''")))
    }
}

/// Double-quote style used by PostgreSQL and SQLite.
pub(super) fn double_quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
