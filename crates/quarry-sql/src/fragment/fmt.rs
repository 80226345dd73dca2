use super::Sql;

macro_rules! fmt {
    ($dst:expr, $( $fragments:expr ),* $(,)?) => {{
        let dst: &mut $crate::Sql = $dst;
        $(
            $crate::ToSql::to_sql($fragments, dst);
        )*
    }};
}

/// Types that can be appended onto a [`Sql`] fragment.
pub trait ToSql {
    fn to_sql(self, dst: &mut Sql);
}

impl ToSql for &str {
    fn to_sql(self, dst: &mut Sql) {
        dst.push_str(self);
    }
}

impl ToSql for String {
    fn to_sql(self, dst: &mut Sql) {
        dst.push_str(&self);
    }
}

impl ToSql for &String {
    fn to_sql(self, dst: &mut Sql) {
        dst.push_str(self);
    }
}

impl ToSql for Sql {
    fn to_sql(self, dst: &mut Sql) {
        dst.push_sql(self);
    }
}

impl ToSql for &Sql {
    fn to_sql(self, dst: &mut Sql) {
        dst.push_sql(self.clone());
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(self, dst: &mut Sql) {
        if let Some(fragment) = self {
            fragment.to_sql(dst);
        }
    }
}
