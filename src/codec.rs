//! Encode and decode entry points.
//!
//! Encoding needs nothing but the object. Decoding resolves the envelope tag
//! through a sealed [`Registry`] and then runs the variant's migration chain.

use serde_json::Value;
use tracing::{instrument, trace, warn};

use crate::compress;
use crate::config::CodecLimits;
use crate::envelope::{parse_text, Envelope};
use crate::error::{SerialError, SerialResult};
use crate::object::{downcast, initialise_from_envelope, MigrationReport, Serialisable};
use crate::registry::Registry;

/// Serialises an object to envelope text.
pub fn dump_to_string(obj: &dyn Serialisable) -> String {
    Envelope::of(obj).into_value().to_string()
}

/// Serialises an object to a compressed network frame.
pub fn dump_to_network(obj: &dyn Serialisable) -> Vec<u8> {
    compress::compress(&dump_to_string(obj))
}

/// State threaded through one decode, including nested container entries.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'r> {
    registry: &'r Registry,
    limits: CodecLimits,
    depth: usize,
}

impl<'r> DecodeContext<'r> {
    pub fn new(registry: &'r Registry, limits: CodecLimits) -> Self {
        Self {
            registry,
            limits,
            depth: 0,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Number of containers enclosing the object being decoded.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Decodes an already-parsed tuple found inside another object's payload.
    pub fn decode_tuple(&self, value: Value) -> SerialResult<Box<dyn Serialisable>> {
        let nested = self.descend()?;
        let envelope = Envelope::from_value(value)?;
        nested.decode_envelope(envelope).map(|(obj, _)| obj)
    }

    fn descend(&self) -> SerialResult<Self> {
        let depth = self.depth + 1;
        if depth > self.limits.max_nesting_depth {
            return Err(SerialError::LimitExceeded(format!(
                "objects nested {depth} deep, limit is {}",
                self.limits.max_nesting_depth
            )));
        }
        Ok(Self { depth, ..*self })
    }

    fn decode_envelope(
        &self,
        envelope: Envelope,
    ) -> SerialResult<(Box<dyn Serialisable>, MigrationReport)> {
        let Envelope {
            tag,
            name,
            version,
            payload,
        } = envelope;
        trace!(%tag, %version, depth = self.depth, "dispatching tuple");
        let factory = self.registry.resolve(tag).inspect_err(|_| {
            warn!(%tag, "no variant registered for tag");
        })?;
        let mut obj = factory.instantiate(tag, name)?;
        let report = initialise_from_envelope(obj.as_mut(), version, payload, self)?;
        Ok((obj, report))
    }
}

/// Decoder bound to a sealed registry and a set of limits.
#[derive(Clone, Copy, Debug)]
pub struct Codec<'r> {
    registry: &'r Registry,
    limits: CodecLimits,
}

impl<'r> Codec<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            limits: CodecLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    pub fn dump_to_string(&self, obj: &dyn Serialisable) -> String {
        dump_to_string(obj)
    }

    pub fn dump_to_network(&self, obj: &dyn Serialisable) -> Vec<u8> {
        dump_to_network(obj)
    }

    #[instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn create_from_string(&self, text: &str) -> SerialResult<Box<dyn Serialisable>> {
        let value = parse_text(text, &self.limits)?;
        self.create_from_tuple(value)
    }

    #[instrument(level = "debug", skip_all, fields(len = frame.len()))]
    pub fn create_from_network(&self, frame: &[u8]) -> SerialResult<Box<dyn Serialisable>> {
        let text = compress::decompress(frame, &self.limits)?;
        self.create_from_string(&text)
    }

    pub fn create_from_tuple(&self, value: Value) -> SerialResult<Box<dyn Serialisable>> {
        self.create_from_tuple_with_report(value).map(|(obj, _)| obj)
    }

    /// Decodes a parsed tuple and reports which migration steps ran on the
    /// outermost object.
    pub fn create_from_tuple_with_report(
        &self,
        value: Value,
    ) -> SerialResult<(Box<dyn Serialisable>, MigrationReport)> {
        let envelope = Envelope::from_value(value)?;
        DecodeContext::new(self.registry, self.limits).decode_envelope(envelope)
    }

    /// Decodes envelope text and downcasts the result to `T`.
    pub fn decode_as<T: Serialisable + 'static>(&self, text: &str) -> SerialResult<Box<T>> {
        downcast::<T>(self.create_from_string(text)?)
    }
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
