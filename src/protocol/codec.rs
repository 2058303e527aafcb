//! JSON payload codec.
//!
//! Inbound: `{"action": str, "correlation_id": str, "value"?: int}`.
//! Outbound replies carry `state` and the echoed `correlation_id`, plus
//! whichever of `value`/`temperature`/`unit`/`error_*` the reply needs.

use serde::Serialize;
use serde_json::Value;

use crate::error::CommandError;

/// Correlation id used when the request's own id cannot be recovered.
pub const UNKNOWN_CORRELATION_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub action: String,
    /// `None` when absent, non-integer or outside `i32`.
    pub value: Option<i32>,
    pub correlation_id: String,
}

impl CommandMessage {
    /// The value with the protocol default of 0.
    pub fn value_or_default(&self) -> i32 {
        self.value.unwrap_or(0)
    }
}

/// A payload that could not be turned into a [`CommandMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub error: CommandError,
    /// Best-known correlation id for the error reply.
    pub correlation_id: String,
}

pub fn decode_command(payload: &[u8]) -> Result<CommandMessage, DecodeError> {
    let doc: Value = serde_json::from_slice(payload).map_err(|_| DecodeError {
        error: CommandError::PayloadParse,
        correlation_id: UNKNOWN_CORRELATION_ID.into(),
    })?;
    let Some(obj) = doc.as_object() else {
        return Err(DecodeError {
            error: CommandError::PayloadParse,
            correlation_id: UNKNOWN_CORRELATION_ID.into(),
        });
    };

    let action = obj.get("action").and_then(Value::as_str);
    let correlation_id = obj.get("correlation_id").and_then(Value::as_str);
    let (Some(action), Some(correlation_id)) = (action, correlation_id) else {
        return Err(DecodeError {
            error: CommandError::MissingField,
            correlation_id: correlation_id.unwrap_or(UNKNOWN_CORRELATION_ID).into(),
        });
    };

    let value = obj
        .get("value")
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok());

    Ok(CommandMessage {
        action: action.into(),
        value,
        correlation_id: correlation_id.into(),
    })
}

// ───────────────────────────────────────────────────────────────
// Replies
// ───────────────────────────────────────────────────────────────

pub const STATE_READ: &str = "READ";
pub const STATE_ERROR: &str = "ERROR";
pub const STATE_SET_TEMP: &str = "SET_TEMP";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub state: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'static str>,
}

impl Reply {
    fn bare(state: &str, correlation_id: &str) -> Self {
        Self {
            state: state.into(),
            correlation_id: correlation_id.into(),
            value: None,
            temperature: None,
            unit: None,
            error_code: None,
            error_message: None,
        }
    }

    /// Actuator success: echoes the action as `state`.
    pub fn state(action: &str, correlation_id: &str) -> Self {
        Self::bare(action, correlation_id)
    }

    /// Sensor success.
    pub fn reading(correlation_id: &str, value: f32, unit: &'static str) -> Self {
        Self {
            value: Some(value),
            unit: Some(unit),
            ..Self::bare(STATE_READ, correlation_id)
        }
    }

    /// AC `SET_TEMP` success.
    pub fn temperature(correlation_id: &str, temperature: i32) -> Self {
        Self {
            temperature: Some(temperature),
            unit: Some("°C"),
            ..Self::bare(STATE_SET_TEMP, correlation_id)
        }
    }

    pub fn error(correlation_id: &str, error: CommandError) -> Self {
        Self {
            error_code: Some(error.code()),
            error_message: Some(error.message()),
            ..Self::bare(STATE_ERROR, correlation_id)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

pub fn encode_reply(reply: &Reply) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(reply)
}
