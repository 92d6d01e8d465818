//! Request payloads.

use url::form_urlencoded;

#[cfg(feature = "json")]
use crate::base::neterror::ValidationError;

/// Data attached to a request: either a literal body or form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestData {
    /// Sent as-is.
    Text(String),
    /// Url-encoded as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

impl RequestData {
    /// Wire form of the payload.
    pub fn encode(&self) -> String {
        match self {
            RequestData::Text(text) => text.clone(),
            RequestData::Form(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter())
                .finish(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestData::Text(text) => text.is_empty(),
            RequestData::Form(pairs) => pairs.is_empty(),
        }
    }
}

impl From<String> for RequestData {
    fn from(s: String) -> Self {
        RequestData::Text(s)
    }
}

impl From<&str> for RequestData {
    fn from(s: &str) -> Self {
        RequestData::Text(s.to_owned())
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for RequestData {
    fn from(pairs: Vec<(K, V)>) -> Self {
        RequestData::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for RequestData {
    fn from(pairs: [(K, V); N]) -> Self {
        RequestData::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Strings pass through; objects are flattened into form fields using
/// bracket notation (`a[b][0]=x`). Every other JSON type is rejected.
#[cfg(feature = "json")]
impl TryFrom<serde_json::Value> for RequestData {
    type Error = ValidationError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(RequestData::Text(s)),
            Value::Object(map) => {
                let mut pairs = Vec::new();
                for (key, value) in &map {
                    flatten(key.clone(), value, &mut pairs);
                }
                Ok(RequestData::Form(pairs))
            }
            Value::Null => Err(ValidationError::InvalidData("null")),
            Value::Bool(_) => Err(ValidationError::InvalidData("boolean")),
            Value::Number(_) => Err(ValidationError::InvalidData("number")),
            Value::Array(_) => Err(ValidationError::InvalidData("array")),
        }
    }
}

#[cfg(feature = "json")]
fn flatten(prefix: String, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    use serde_json::Value;

    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", prefix, i), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{}[{}]", prefix, key), item, out);
            }
        }
    }
}
