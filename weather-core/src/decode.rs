//! Decoding of `current.json` response bodies.
//!
//! Only the fields the lookup needs are read; anything else the provider adds
//! is ignored.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{error::DecodeError, model::WeatherResult};

const LOCATION_NAME: &str = "location.name";
const TEMP_C: &str = "current.temp_c";
const CONDITION_CODE: &str = "current.condition.code";
const CONDITION_TEXT: &str = "current.condition.text";
const LAST_UPDATED_EPOCH: &str = "current.last_updated_epoch";
const ERROR_MESSAGE: &str = "error.message";

pub fn decode(bytes: &[u8]) -> Result<WeatherResult, DecodeError> {
    let body: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;

    let location_name = required(&body, LOCATION_NAME, |v| v.as_str().map(str::to_owned))?;
    let temperature_c = required(&body, TEMP_C, |v| v.as_f64().filter(|t| t.is_finite()))?;
    let condition_code =
        required(&body, CONDITION_CODE, |v| v.as_u64().and_then(|c| u32::try_from(c).ok()))?;
    let condition_text = required(&body, CONDITION_TEXT, |v| v.as_str().map(str::to_owned))?;

    // Optional: older payloads and some proxies omit it.
    let last_updated = lookup(&body, LAST_UPDATED_EPOCH)
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

    Ok(WeatherResult {
        location_name,
        temperature_c,
        condition_code,
        condition_text,
        last_updated,
    })
}

/// Extract `error.message` from a provider error body such as
/// `{"error":{"code":1006,"message":"No matching location found."}}`.
pub fn provider_error_message(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;

    lookup(&body, ERROR_MESSAGE)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(str::to_owned)
}

fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(body, |node, key| node.get(key))
}

fn required<'a, T>(
    body: &'a Value,
    path: &'static str,
    convert: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<T, DecodeError> {
    lookup(body, path).and_then(convert).ok_or(DecodeError::MissingField(path))
}
