//! Local (zone-less) timestamps and their textual forms.

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use chrono::{Local, NaiveDateTime};

use crate::core::error::{AppError, Result};

/// Accepted inbound layouts, tried in order; the first match wins.
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current wall-clock time in the server's zone
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn parse_local_date_time(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| AppError::validation(format!("Unable to parse date-time: '{}'", input)))
}

pub fn format_local_date_time(value: &NaiveDateTime) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

/// GraphQL `DateTime` scalar over a local date-time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalDateTime(pub NaiveDateTime);

impl From<NaiveDateTime> for LocalDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

#[Scalar(name = "DateTime")]
impl ScalarType for LocalDateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => parse_local_date_time(s)
                .map(LocalDateTime)
                .map_err(|e| InputValueError::custom(e.client_message())),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(format_local_date_time(&self.0))
    }
}
