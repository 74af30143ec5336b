//! Inbound ECS events
//!
//! Events arrive as loosely shaped EventBridge JSON. Nothing here validates a
//! schema: every accessor returns an `Option` so a missing key degrades to a
//! placeholder further down instead of failing the invocation.

use serde_json::{Number, Value};

pub mod trigger;

/// Discriminator key carried by every EventBridge event
pub const DETAIL_TYPE: &str = "detail-type";

/// Known ECS event kinds, selected by `detail-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskStateChange,
    DeploymentStateChange,
    ServiceAction,
    Other,
}

impl EventKind {
    pub fn from_detail_type(detail_type: Option<&str>) -> Self {
        match detail_type {
            Some("ECS Task State Change") => Self::TaskStateChange,
            Some("ECS Deployment State Change") => Self::DeploymentStateChange,
            Some("ECS Service Action") => Self::ServiceAction,
            _ => Self::Other,
        }
    }

    /// Classify an event by its discriminator. A missing or non-string
    /// `detail-type` is `Other`.
    pub fn of(event: &Value) -> Self {
        Self::from_detail_type(detail_type(event))
    }
}

/// The event's `detail-type`, if it is a string
pub fn detail_type(event: &Value) -> Option<&str> {
    lookup(event, &[DETAIL_TYPE]).and_then(Value::as_str)
}

/// Walk `keys` through nested objects starting at `root`.
///
/// Returns `None` as soon as a key is missing or an intermediate value is not
/// an object.
pub fn lookup<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(root, |current, key| current.as_object()?.get(*key))
}

/// Shorthand for `lookup(event, &["detail", key])`
pub fn detail<'a>(event: &'a Value, key: &str) -> Option<&'a Value> {
    lookup(event, &["detail", key])
}

/// Final `/`-separated segment of a string value
pub fn last_path_segment(value: Option<&Value>) -> Option<&str> {
    last_segment(value, '/')
}

/// Final `:`-separated segment of a string value
pub fn last_colon_segment(value: Option<&Value>) -> Option<&str> {
    last_segment(value, ':')
}

fn last_segment(value: Option<&Value>, separator: char) -> Option<&str> {
    value?.as_str()?.rsplit(separator).next()
}

/// Render a value the way it should appear inside message text.
///
/// Absent values render as `undefined`, strings verbatim, everything else as
/// JSON text with integral floats written as integers (`2.0` -> `2`).
pub fn render(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => normalize_numbers(other).to_string(),
    }
}

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Copy of `value` with every integral float replaced by the equivalent
/// integer. Key order is kept.
pub fn normalize_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) => integral(n).map_or_else(|| value.clone(), Value::from),
        Value::Array(items) => Value::Array(items.iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), normalize_numbers(item)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn integral(n: &Number) -> Option<i64> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER).then_some(f as i64)
}

/// Whether a value should count as "set" for conditional fields
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
