
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ParseError;

/// value of the payload's own `status` field when the provider succeeded
pub const STATUS_SUCCESS: &str = "success";

/// Provider payload reduced to one of the two known layouts.
///
/// The variant is picked from the top-level structure only, field level
/// problems inside records or rows are left to the parser.
#[derive(Debug, Clone)]
pub enum UpstreamPayload {
    /// `data` is `{ day: { slot code: [record, ...] } }`, days in document order
    NestedByDay(Vec<ApiDay>),
    /// `data` (or the root itself) is a list of positional rows
    FlatRows(Vec<Value>),
}

#[derive(Debug, Clone)]
pub struct ApiDay {
    pub day: String,
    /// slot code -> raw value, expected to be a list of records
    pub slots: Map<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiMealRecord {
    /// `YYYYMMDD`
    #[serde(rename = "mealDt")]
    pub meal_dt: String,
    #[serde(default)]
    pub corner: Option<String>,
    pub name: String,
    #[serde(default)]
    pub side: Option<String>,
}

impl TryFrom<Value> for UpstreamPayload {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let data = match value {
            Value::Object(mut root) => root.remove("data")
                .ok_or(ParseError::MissingData)?,
            Value::Array(rows) => return Ok(Self::FlatRows(rows)),
            other => return Err(ParseError::unexpected(
                "$", "object or array", &other,
            )),
        };

        match data {
            Value::Object(days) => days.into_iter().map(|(day, slots)| {
                match slots {
                    Value::Object(slots) => Ok(ApiDay { day, slots }),
                    other => Err(ParseError::unexpected(
                        format!("data.{day}"), "object", &other,
                    )),
                }
            }).collect::<Result<Vec<_>, _>>().map(Self::NestedByDay),
            Value::Array(rows) => Ok(Self::FlatRows(rows)),
            other => Err(ParseError::unexpected("data", "object or array", &other)),
        }
    }
}

/// Name of the json type, used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
