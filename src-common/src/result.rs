//! Structured outcome of a camera operation, as emitted in JSON output.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Machine-readable error: a stable `kind` code plus a human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// `{success, output?, error?}`. Captured bytes are base64 encoded in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_output",
        deserialize_with = "deserialize_output"
    )]
    pub output: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl OperationResult {
    /// Success without captured data.
    pub fn ok() -> Self {
        Self {
            success: true,
            output: None,
            error: None,
        }
    }

    /// Success carrying the tool's stdout.
    pub fn with_output(output: Vec<u8>) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error),
        }
    }
}

fn serialize_output<S: Serializer>(output: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match output {
        Some(bytes) => s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
        None => s.serialize_none(),
    }
}

fn deserialize_output<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
    let encoded: Option<String> = Option::deserialize(d)?;
    encoded
        .map(|text| {
            base64::engine::general_purpose::STANDARD
                .decode(text)
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}
