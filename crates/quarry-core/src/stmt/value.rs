use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

/// A literal bound as a statement parameter.
///
/// Values never become part of the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Json(serde_json::Value),
    Vector(Vec<f32>),
    Point { x: f64, y: f64 },
    Enum(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) | Value::Enum(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the value to JSON, for databases that store lists and
    /// documents as JSON text.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(value) => Json::Bool(*value),
            Value::I64(value) => Json::from(*value),
            Value::F64(value) => Json::from(*value),
            Value::Decimal(value) => Json::String(value.to_string()),
            Value::String(value) | Value::Enum(value) => Json::String(value.clone()),
            Value::Bytes(value) => Json::Array(value.iter().map(|b| Json::from(*b)).collect()),
            Value::DateTime(value) => Json::String(value.to_rfc3339()),
            Value::Date(value) => Json::String(value.to_string()),
            Value::Time(value) => Json::String(value.to_string()),
            Value::Json(value) => value.clone(),
            Value::Vector(value) => Json::Array(value.iter().map(|v| Json::from(*v)).collect()),
            Value::Point { x, y } => serde_json::json!({ "x": x, "y": y }),
            Value::List(values) => Json::Array(values.iter().map(Value::to_json).collect()),
        }
    }

    /// The textual form a JSON path extraction yields for this value.
    pub fn to_json_text(&self) -> Value {
        match self.to_json() {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::String(value) => Value::String(value),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I64(src.into())
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<Decimal> for Value {
    fn from(src: Decimal) -> Value {
        Value::Decimal(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Value {
        Value::DateTime(src)
    }
}

impl From<NaiveDate> for Value {
    fn from(src: NaiveDate) -> Value {
        Value::Date(src)
    }
}

impl From<NaiveTime> for Value {
    fn from(src: NaiveTime) -> Value {
        Value::Time(src)
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Value {
        Value::Json(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Value {
        match src {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}
