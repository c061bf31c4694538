//! The JSON envelope every endpoint reply is wrapped in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LhaError;

/// `{ "success": bool, "data": ... }`. On failure `data` is a message
/// string; on success it is the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::String(message.into()),
        }
    }

    /// The failure message, if this is an error envelope carrying one.
    pub fn message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            self.data.as_str()
        }
    }
}

impl From<&LhaError> for ResponseEnvelope {
    fn from(err: &LhaError) -> Self {
        Self::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let ok = ResponseEnvelope::ok(json!({ "data": { "brma": "Leeds" } }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "data": { "data": { "brma": "Leeds" } } })
        );

        let err = ResponseEnvelope::from(&LhaError::validation("Missing name or email."));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "success": false, "data": "Missing name or email." })
        );
        assert_eq!(err.message(), Some("Missing name or email."));
        assert_eq!(ok.message(), None);
    }
}
