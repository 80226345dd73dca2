use super::{Sql, ToSql};

/// Comma delimited
pub struct Comma<L>(pub L);

/// Delimited by an arbitrary separator
pub struct Delimited<L>(pub L, pub &'static str);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, dst: &mut Sql) {
        Delimited(self.0, ", ").to_sql(dst);
    }
}

impl<L> ToSql for Delimited<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, dst: &mut Sql) {
        let mut s = "";
        for item in self.0 {
            fmt!(dst, s, item);
            s = self.1;
        }
    }
}
