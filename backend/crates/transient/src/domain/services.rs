//! Domain Services
//!
//! Pure normalization of the upstream `object` reply into domain values.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::domain::entities::Transient;

/// Object record as returned by the registry, after normalization
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectReply {
    pub objname: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub redshift: Option<f64>,
    #[serde(rename = "radeg", deserialize_with = "required_f64")]
    pub ra: f64,
    #[serde(rename = "decdeg", deserialize_with = "required_f64")]
    pub dec: f64,
    #[serde(default)]
    pub internal_names: Vec<String>,
    /// Remaining upstream fields, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectReply {
    /// Map into a [`Transient`]. A missing or zero redshift becomes 0 and
    /// E(B-V) is always 0, the registry does not provide it.
    pub fn into_transient(self) -> Transient {
        Transient::new(
            self.objname,
            self.redshift.unwrap_or(0.0),
            self.ra,
            self.dec,
            0.0,
        )
    }
}

/// Extract the object reply from a decoded response body.
///
/// Returns `None` (not found) when `data.reply` is missing or falsy, when
/// the reply has no `objname`, or when its coordinates cannot be read.
pub fn normalize_reply(body: &Value) -> Option<ObjectReply> {
    let reply = body.get("data")?.get("reply")?;
    if is_falsy(reply) {
        return None;
    }

    let mut reply = reply.as_object()?.clone();
    if !reply.contains_key("objname") {
        return None;
    }

    let internal_names = reply
        .get("internal_names")
        .and_then(Value::as_str)
        .map(split_internal_names)
        .unwrap_or_default();
    reply.insert(
        "internal_names".to_string(),
        Value::from(internal_names),
    );

    match serde_json::from_value::<ObjectReply>(Value::Object(reply)) {
        Ok(object) => Some(object),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable object reply, treating as not found");
            None
        }
    }
}

/// Split the comma-separated `internal_names` field, dropping blanks.
pub fn split_internal_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON truthiness as the registry uses it: null, false, 0, "" and empty
/// containers all mean "nothing here".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Numbers arrive either as JSON numbers or as numeric strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

fn required_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing number"))
}
