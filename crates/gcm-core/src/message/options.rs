//! Recognized delivery options and their type coercion.

use serde_json::{Map, Value};

use crate::error::GcmError;

pub const COLLAPSE_KEY: &str = "collapse_key";
pub const TIME_TO_LIVE: &str = "time_to_live";
pub const DELAY_WHILE_IDLE: &str = "delay_while_idle";
pub const RESTRICTED_PACKAGE_NAME: &str = "restricted_package_name";
pub const DRY_RUN: &str = "dry_run";
pub const PRIORITY: &str = "priority";

/// Every option key the gateway understands. Anything else is ignored.
pub const OPTION_KEYS: [&str; 6] = [
    COLLAPSE_KEY,
    TIME_TO_LIVE,
    DELAY_WHILE_IDLE,
    RESTRICTED_PACKAGE_NAME,
    DRY_RUN,
    PRIORITY,
];

/// Delivery options. `None` (or `false` / empty string after normalization)
/// means "not sent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Collapse key/bucket.
    pub collapse_key: Option<String>,
    /// Message TTL in seconds. Zero is a meaningful value and is kept.
    pub time_to_live: Option<i64>,
    /// Hold the message while the device is idle.
    pub delay_while_idle: Option<bool>,
    /// Restrict delivery to this package name.
    pub restricted_package_name: Option<String>,
    /// Let the gateway validate without delivering.
    pub dry_run: Option<bool>,
    /// Delivery priority; only carried by the JSON (multicast) form.
    pub priority: Option<String>,
}

impl Options {
    /// Build options from a loose key/value mapping, coercing each recognized
    /// key to its declared type. Unrecognized keys are skipped.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, GcmError> {
        let mut opts = Options::default();
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                COLLAPSE_KEY => opts.collapse_key = Some(coerce_string(value)),
                TIME_TO_LIVE => opts.time_to_live = Some(coerce_int(key, value)?),
                DELAY_WHILE_IDLE => opts.delay_while_idle = Some(coerce_bool(value)),
                RESTRICTED_PACKAGE_NAME => {
                    opts.restricted_package_name = Some(coerce_string(value))
                }
                DRY_RUN => opts.dry_run = Some(coerce_bool(value)),
                PRIORITY => opts.priority = Some(coerce_string(value)),
                _ => tracing::trace!(key = %key, "ignoring unrecognized option"),
            }
        }
        Ok(opts.normalized())
    }

    /// Drop values that would not be transmitted (`false`, empty strings).
    pub fn normalized(self) -> Self {
        Options {
            collapse_key: self.collapse_key.filter(|s| !s.is_empty()),
            time_to_live: self.time_to_live,
            delay_while_idle: self.delay_while_idle.filter(|b| *b),
            restricted_package_name: self.restricted_package_name.filter(|s| !s.is_empty()),
            dry_run: self.dry_run.filter(|b| *b),
            priority: self.priority.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Options::default()
    }

    /// Options as typed JSON fields. `include_priority` is false for the
    /// plain-text form, which has no priority field.
    pub fn to_json_fields(&self, include_priority: bool) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(v) = &self.collapse_key {
            out.insert(COLLAPSE_KEY.into(), Value::from(v.as_str()));
        }
        if let Some(v) = self.time_to_live {
            out.insert(TIME_TO_LIVE.into(), Value::from(v));
        }
        if let Some(v) = self.delay_while_idle {
            out.insert(DELAY_WHILE_IDLE.into(), Value::from(v));
        }
        if let Some(v) = &self.restricted_package_name {
            out.insert(RESTRICTED_PACKAGE_NAME.into(), Value::from(v.as_str()));
        }
        if let Some(v) = self.dry_run {
            out.insert(DRY_RUN.into(), Value::from(v));
        }
        if include_priority {
            if let Some(v) = &self.priority {
                out.insert(PRIORITY.into(), Value::from(v.as_str()));
            }
        }
        out
    }

    /// Options as form fields for the plain-text form.
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(v) = &self.collapse_key {
            out.push((COLLAPSE_KEY, v.clone()));
        }
        if let Some(v) = self.time_to_live {
            out.push((TIME_TO_LIVE, v.to_string()));
        }
        if let Some(v) = self.delay_while_idle {
            out.push((DELAY_WHILE_IDLE, v.to_string()));
        }
        if let Some(v) = &self.restricted_package_name {
            out.push((RESTRICTED_PACKAGE_NAME, v.clone()));
        }
        if let Some(v) = self.dry_run {
            out.push((DRY_RUN, v.to_string()));
        }
        out
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_int(key: &str, value: &Value) -> Result<i64, GcmError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| GcmError::validation(format!("{key} must be an integer, got {value}")))
}

/// Truthiness: empty strings, zero, empty containers and null are false.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
