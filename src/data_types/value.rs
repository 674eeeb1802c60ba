use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Marker for a missing value. Every out-of-range read and every empty
/// input cell comes back as this.
pub const MISSING: f64 = f64::NAN;

/// A single cell as handed over by a provider, before coercion.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Converts a JSON scalar. Arrays and objects have no scalar meaning and map to `Null`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            serde_json::Value::String(s) => RawValue::Str(s.clone()),
            _ => RawValue::Null,
        }
    }

    /// Text form used for names and ids.
    pub fn to_label(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Bool(b) => Some(b.to_string()),
            RawValue::Number(n) if n.is_nan() => None,
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Str(s) => Some(s.clone()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Str(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Str(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Null)
    }
}

/// Formats integral floats without a trailing `.0` so `3.0` labels as `3`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn is_blank(s: &str) -> bool {
    s.is_empty() || s == "-"
}

/// Numeric coercion shared by float, int and generic number dimensions.
pub fn parse_number(value: &RawValue) -> f64 {
    match value {
        RawValue::Null => MISSING,
        RawValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        RawValue::Number(n) => *n,
        RawValue::Str(s) => {
            let s = s.trim();
            if is_blank(s) {
                MISSING
            } else {
                s.parse::<f64>().unwrap_or(MISSING)
            }
        }
    }
}

const BUILTIN_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const BUILTIN_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a time cell into UTC milliseconds.
///
/// Naive date-times are read as UTC. `extra_formats` are tried last, first as
/// date-time formats and then as date-only formats.
pub fn parse_time(value: &RawValue, extra_formats: &[String]) -> f64 {
    let s = match value {
        RawValue::Str(s) => s.trim(),
        other => return parse_number(other),
    };
    if is_blank(s) {
        return MISSING;
    }
    if let Ok(n) = s.parse::<f64>() {
        return n;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis() as f64;
    }

    let builtin_dt = BUILTIN_DATETIME_FORMATS.iter().copied();
    let extra = extra_formats.iter().map(String::as_str);
    for fmt in builtin_dt.chain(extra.clone()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_utc().timestamp_millis() as f64;
        }
    }
    for fmt in BUILTIN_DATE_FORMATS.iter().copied().chain(extra) {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return dt.and_utc().timestamp_millis() as f64;
            }
        }
    }
    MISSING
}
