//! Request types for the Almond API.
//!
//! Responses stay untyped (`serde_json::Value`) since their shape belongs to
//! the server. Requests with a known shape get builders here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────────────────────────────────────

/// A single command sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConverseCommand {
    /// Free-text natural language input.
    #[serde(rename = "command")]
    Text {
        /// What the user said.
        text: String,
    },
    /// A ThingTalk program to execute directly.
    #[serde(rename = "tt")]
    Program {
        /// ThingTalk source.
        code: String,
    },
}

/// Body of `POST /api/converse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverseRequest {
    /// Command to run.
    pub command: ConverseCommand,
    /// Conversation to continue; serialized as `null` when absent.
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<String>,
}

impl ConverseRequest {
    /// Natural language command.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            command: ConverseCommand::Text { text: text.into() },
            conversation_id: None,
        }
    }

    /// ThingTalk program.
    pub fn program(code: impl Into<String>) -> Self {
        Self {
            command: ConverseCommand::Program { code: code.into() },
            conversation_id: None,
        }
    }

    /// Continue an existing conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Devices
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for a device to create on the assistant.
///
/// Always a JSON object holding at least a `kind` entry, which names the
/// driver to instantiate. Other fields are driver-specific and passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DeviceConfig(Map<String, Value>);

impl DeviceConfig {
    /// Config holding only a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("kind".to_string(), Value::String(kind.into()));
        Self(fields)
    }

    /// Add a driver-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "kind" {
            self.0.insert(key, value.into());
        }
        self
    }

    /// Driver kind, when it is a string.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    /// All fields, `kind` included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for DeviceConfig {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(Error::InvalidDevice(format!(
                "expected an object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl TryFrom<Map<String, Value>> for DeviceConfig {
    type Error = Error;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        if !fields.contains_key("kind") {
            return Err(Error::InvalidDevice("missing `kind`".to_string()));
        }
        Ok(Self(fields))
    }
}

impl From<DeviceConfig> for Value {
    fn from(config: DeviceConfig) -> Self {
        Value::Object(config.0)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
