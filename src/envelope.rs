//! The tagged tuple that wraps every payload on the wire.
//!
//! `[tag, version, payload]` for anonymous variants and
//! `[tag, name, version, payload]` for named ones. Arity alone selects the
//! decoding path.

use serde::Serialize;
use serde_json::Value;

use crate::config::CodecLimits;
use crate::error::{SerialError, SerialResult};
use crate::object::Serialisable;
use crate::tags::{TypeTag, Version};

pub type Payload = Value;

#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub tag: TypeTag,
    pub name: Option<String>,
    pub version: Version,
    pub payload: Payload,
}

impl Envelope {
    /// Wraps an object's current payload with its declared tag, name and version.
    pub fn of(obj: &dyn Serialisable) -> Self {
        Self {
            tag: obj.type_tag(),
            name: obj.name().map(str::to_string),
            version: obj.version(),
            payload: obj.extract_payload(),
        }
    }

    pub fn arity(&self) -> usize {
        if self.name.is_some() {
            4
        } else {
            3
        }
    }

    pub fn to_value(&self) -> Value {
        let mut tuple = Vec::with_capacity(self.arity());
        tuple.push(Value::from(self.tag.get()));
        if let Some(name) = &self.name {
            tuple.push(Value::String(name.clone()));
        }
        tuple.push(Value::from(self.version.get()));
        tuple.push(self.payload.clone());
        Value::Array(tuple)
    }

    pub fn into_value(self) -> Value {
        let mut tuple = Vec::with_capacity(self.arity());
        tuple.push(Value::from(self.tag.get()));
        if let Some(name) = self.name {
            tuple.push(Value::String(name));
        }
        tuple.push(Value::from(self.version.get()));
        tuple.push(self.payload);
        Value::Array(tuple)
    }

    /// Splits an already-parsed tuple into its fields.
    pub fn from_value(value: Value) -> SerialResult<Self> {
        let Value::Array(items) = value else {
            return Err(SerialError::malformed(format!(
                "envelope must be an array, found {}",
                value_kind(&value)
            )));
        };
        let arity = items.len();
        let mut items = items.into_iter();
        match (arity, items.next(), items.next(), items.next(), items.next()) {
            (3, Some(tag), Some(version), Some(payload), None) => Ok(Self {
                tag: parse_tag(&tag)?,
                name: None,
                version: parse_version(&version)?,
                payload,
            }),
            (4, Some(tag), Some(name), Some(version), Some(payload)) => {
                let Value::String(name) = name else {
                    return Err(SerialError::malformed(format!(
                        "envelope name must be a string, found {}",
                        value_kind(&name)
                    )));
                };
                Ok(Self {
                    tag: parse_tag(&tag)?,
                    name: Some(name),
                    version: parse_version(&version)?,
                    payload,
                })
            }
            _ => Err(SerialError::malformed(format!(
                "envelope must have 3 or 4 elements, found {arity}"
            ))),
        }
    }

    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }

    pub fn from_text(text: &str, limits: &CodecLimits) -> SerialResult<Self> {
        Self::from_value(parse_text(text, limits)?)
    }

    pub fn header(&self) -> EnvelopeHeader {
        EnvelopeHeader {
            tag: self.tag,
            label: self.tag.label(),
            name: self.name.clone(),
            version: self.version,
            payload_kind: value_kind(&self.payload),
        }
    }
}

/// Registry-free summary of an envelope, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnvelopeHeader {
    pub tag: TypeTag,
    pub label: Option<&'static str>,
    pub name: Option<String>,
    pub version: Version,
    pub payload_kind: &'static str,
}

pub(crate) fn parse_text(text: &str, limits: &CodecLimits) -> SerialResult<Value> {
    if text.len() > limits.max_text_bytes {
        return Err(SerialError::LimitExceeded(format!(
            "envelope text is {} bytes, limit is {}",
            text.len(),
            limits.max_text_bytes
        )));
    }
    serde_json::from_str(text).map_err(|err| SerialError::text(text, &err))
}

fn parse_tag(value: &Value) -> SerialResult<TypeTag> {
    value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .map(TypeTag::new)
        .ok_or_else(|| SerialError::malformed(format!("invalid type tag {value}")))
}

fn parse_version(value: &Value) -> SerialResult<Version> {
    value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .filter(|raw| *raw >= 1)
        .map(Version::new)
        .ok_or_else(|| SerialError::malformed(format!("invalid payload version {value}")))
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "tests/envelope_tests.rs"]
mod tests;
