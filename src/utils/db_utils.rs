use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::String(v) => write!(f, "{v}"),
            SqlValue::I64(v) => write!(f, "{v}"),
            SqlValue::U64(v) => write!(f, "{v}"),
            SqlValue::F64(v) => write!(f, "{v}"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Date(v) => write!(f, "{v}"),
            SqlValue::DateTime(v) => write!(f, "{v}"),
            SqlValue::Null => f.write_str("NULL"),
        }
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::U64(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::I64(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// A positional query parameter. The name only shows up in logs; MySQL binds
/// by position (`?`).
#[derive(Debug, Clone)]
pub struct SqlParam {
    pub name: &'static str,
    pub value: SqlValue,
}

impl SqlParam {
    pub fn new(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// ===============================
/// Bind parameters in order
/// ===============================
pub fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param.value.clone() {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}

/// ===============================
/// Decode one column by its MySQL type
/// ===============================
pub fn decode_column(row: &MySqlRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let type_name = match row.columns().get(index) {
        Some(column) => column.type_info().name().to_string(),
        None => {
            return Err(sqlx::Error::ColumnIndexOutOfBounds {
                index,
                len: row.columns().len(),
            });
        }
    };

    let value = match type_name.as_str() {
        "NULL" => None,
        "BOOLEAN" => row.try_get::<Option<bool>, _>(index)?.map(SqlValue::Bool),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<Option<u64>, _>(index)?.map(SqlValue::U64),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            row.try_get::<Option<i64>, _>(index)?.map(SqlValue::I64)
        }
        "FLOAT" | "DOUBLE" => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::F64),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(index)?.map(SqlValue::Date),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(SqlValue::DateTime),
        // DECIMAL and the text types all arrive as strings on the wire
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)?
            .map(SqlValue::String),
    };

    Ok(value.unwrap_or(SqlValue::Null))
}
