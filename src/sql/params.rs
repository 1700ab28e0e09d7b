//! Typed bind values for dynamically built queries.

use chrono::NaiveDate;

/// A value bound to a `$n` placeholder. Each variant binds with its native Postgres type.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Date(NaiveDate),
}

impl From<bool> for PgBindValue {
    fn from(v: bool) -> Self {
        PgBindValue::Bool(v)
    }
}

impl From<i64> for PgBindValue {
    fn from(v: i64) -> Self {
        PgBindValue::I64(v)
    }
}

impl From<f64> for PgBindValue {
    fn from(v: f64) -> Self {
        PgBindValue::F64(v)
    }
}

impl From<String> for PgBindValue {
    fn from(v: String) -> Self {
        PgBindValue::Text(v)
    }
}

impl From<&str> for PgBindValue {
    fn from(v: &str) -> Self {
        PgBindValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for PgBindValue {
    fn from(v: NaiveDate) -> Self {
        PgBindValue::Date(v)
    }
}

/// Binds every value in order onto a `query`, `query_as` or `query_scalar` builder.
#[macro_export]
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for p in $params.iter() {
            q = match p {
                $crate::sql::PgBindValue::Bool(v) => q.bind(*v),
                $crate::sql::PgBindValue::I64(v) => q.bind(*v),
                $crate::sql::PgBindValue::F64(v) => q.bind(*v),
                $crate::sql::PgBindValue::Text(v) => q.bind(v.clone()),
                $crate::sql::PgBindValue::Date(v) => q.bind(*v),
            };
        }
        q
    }};
}
