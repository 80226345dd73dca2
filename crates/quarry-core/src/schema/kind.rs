use std::fmt;

/// The closed set of scalar kinds a field can hold.
///
/// Filter and update operators are validated against the kind: each kind
/// belongs to exactly one operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Date,
    Time,
    BigInt,
    Json,
    Bytes,
    Vector,
    Point,
    Enum,
}

impl ScalarKind {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarKind::Int | ScalarKind::Float | ScalarKind::Decimal | ScalarKind::BigInt
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ScalarKind::DateTime | ScalarKind::Date | ScalarKind::Time)
    }

    pub fn is_json(self) -> bool {
        matches!(self, ScalarKind::Json)
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Date => "Date",
            ScalarKind::Time => "Time",
            ScalarKind::BigInt => "BigInt",
            ScalarKind::Json => "Json",
            ScalarKind::Bytes => "Bytes",
            ScalarKind::Vector => "Vector",
            ScalarKind::Point => "Point",
            ScalarKind::Enum => "Enum",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
