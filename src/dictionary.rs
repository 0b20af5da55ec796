//! Polymorphic dictionary.
//!
//! Keys and values are each either a plain text-encodable value or a boxed
//! serialisable object. The text encoding cannot key a mapping by a
//! structured value, nor tell an embedded envelope from an ordinary array,
//! so the payload splits entries into four buckets by the kind of key and
//! value:
//!
//! ```text
//! [ [[key, value], ...],        plain key,  plain value
//!   [[key, tuple], ...],        plain key,  object value
//!   [[tuple, value], ...],      object key, plain value
//!   [[tuple, tuple], ...] ]     object key, object value
//! ```
//!
//! Each bucket keeps insertion order. Order across buckets is not kept: a
//! decoded dictionary lists every plain/plain entry first, then plain/object,
//! and so on.
//!
//! Lookups go through a hash index keyed by each key's wire text, so two keys
//! are the same exactly when they encode identically.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::codec::DecodeContext;
use crate::envelope::{value_kind, Envelope, Payload};
use crate::error::{SerialError, SerialResult};
use crate::object::Serialisable;
use crate::tags::{TypeTag, Version, DICTIONARY};
use crate::version::DICTIONARY_VERSION;

/// A dictionary key or value.
#[derive(Clone, Debug)]
pub enum Element {
    Plain(Value),
    Object(Box<dyn Serialisable>),
}

impl Element {
    pub fn plain(value: impl Into<Value>) -> Self {
        Self::Plain(value.into())
    }

    pub fn object<T: Serialisable + 'static>(obj: T) -> Self {
        Self::Object(Box::new(obj))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Self::Plain(value) => Some(value),
            Self::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&(dyn Serialisable + 'static)> {
        match self {
            Self::Plain(_) => None,
            Self::Object(obj) => Some(obj.as_ref()),
        }
    }

    pub fn downcast_ref<T: Serialisable + 'static>(&self) -> Option<&T> {
        self.as_object().and_then(|obj| obj.downcast_ref::<T>())
    }

    /// Raw value for plain elements, full envelope tuple for objects.
    fn to_wire(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Object(obj) => Envelope::of(obj.as_ref()).into_value(),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Plain(left), Self::Plain(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => left == right,
            _ => false,
        }
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<Box<dyn Serialisable>> for Element {
    fn from(obj: Box<dyn Serialisable>) -> Self {
        Self::Object(obj)
    }
}

/// Which of the four payload buckets an entry is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    PlainKeyPlainValue,
    PlainKeyObjectValue,
    ObjectKeyPlainValue,
    ObjectKeyObjectValue,
}

impl Bucket {
    /// Order in which buckets appear in the payload and are decoded.
    pub const ORDER: [Bucket; 4] = [
        Bucket::PlainKeyPlainValue,
        Bucket::PlainKeyObjectValue,
        Bucket::ObjectKeyPlainValue,
        Bucket::ObjectKeyObjectValue,
    ];

    pub fn classify(key: &Element, value: &Element) -> Self {
        match (key, value) {
            (Element::Plain(_), Element::Plain(_)) => Self::PlainKeyPlainValue,
            (Element::Plain(_), Element::Object(_)) => Self::PlainKeyObjectValue,
            (Element::Object(_), Element::Plain(_)) => Self::ObjectKeyPlainValue,
            (Element::Object(_), Element::Object(_)) => Self::ObjectKeyObjectValue,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::PlainKeyPlainValue => 0,
            Self::PlainKeyObjectValue => 1,
            Self::ObjectKeyPlainValue => 2,
            Self::ObjectKeyObjectValue => 3,
        }
    }

    fn key_is_object(self) -> bool {
        matches!(self, Self::ObjectKeyPlainValue | Self::ObjectKeyObjectValue)
    }

    fn value_is_object(self) -> bool {
        matches!(self, Self::PlainKeyObjectValue | Self::ObjectKeyObjectValue)
    }
}

/// Index key: whether the key is an object, plus its wire text. The flag
/// keeps a plain array apart from an object with the same envelope.
type KeyText = (bool, String);

fn key_text(key: &Element) -> KeyText {
    (key.is_object(), key.to_wire().to_string())
}

/// Insertion-ordered map whose keys and values may be serialisable objects.
#[derive(Clone, Default)]
pub struct SerialisableDictionary {
    entries: Vec<(Element, Element)>,
    index: HashMap<KeyText, usize>,
}

impl SerialisableDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry. An equal key keeps its position and has its value
    /// replaced; the previous value is returned.
    pub fn insert(
        &mut self,
        key: impl Into<Element>,
        value: impl Into<Element>,
    ) -> Option<Element> {
        let key = key.into();
        let value = value.into();
        let text = key_text(&key);
        match self.index.get(&text).copied() {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.index.insert(text, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Element) -> Option<&Element> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn get_mut(&mut self, key: &Element) -> Option<&mut Element> {
        self.position(key).map(|index| &mut self.entries[index].1)
    }

    /// Looks up a plain key.
    pub fn get_plain(&self, key: impl Into<Value>) -> Option<&Element> {
        self.get(&Element::Plain(key.into()))
    }

    /// Removes an entry, shifting later entries down to keep their order.
    pub fn remove(&mut self, key: &Element) -> Option<Element> {
        let index = self.index.remove(&key_text(key))?;
        for slot in self.index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &Element) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Element, &Element)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Element> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Element> {
        self.entries.iter().map(|(_, value)| value)
    }

    fn position(&self, key: &Element) -> Option<usize> {
        self.index.get(&key_text(key)).copied()
    }
}

impl PartialEq for SerialisableDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for SerialisableDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for SerialisableDictionary
where
    K: Into<Element>,
    V: Into<Element>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }
        dictionary
    }
}

impl Serialisable for SerialisableDictionary {
    fn type_tag(&self) -> TypeTag {
        DICTIONARY
    }

    fn version(&self) -> Version {
        DICTIONARY_VERSION
    }

    fn extract_payload(&self) -> Payload {
        let mut buckets: [Vec<Value>; 4] = Default::default();
        for (key, value) in &self.entries {
            let bucket = Bucket::classify(key, value);
            buckets[bucket.index()].push(Value::Array(vec![key.to_wire(), value.to_wire()]));
        }
        Value::Array(buckets.into_iter().map(Value::Array).collect())
    }

    fn init_from_payload(
        &mut self,
        payload: Payload,
        ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        let Value::Array(buckets) = payload else {
            return Err(SerialError::malformed(format!(
                "dictionary payload must be an array, found {}",
                value_kind(&payload)
            )));
        };
        if buckets.len() != Bucket::ORDER.len() {
            return Err(SerialError::malformed(format!(
                "dictionary payload must hold 4 buckets, found {}",
                buckets.len()
            )));
        }

        let mut decoded = Self::new();
        for (bucket, pairs) in Bucket::ORDER.into_iter().zip(buckets) {
            let Value::Array(pairs) = pairs else {
                return Err(SerialError::malformed(format!(
                    "dictionary bucket {bucket:?} must be an array"
                )));
            };
            for pair in pairs {
                let (key, value) = split_pair(pair, bucket)?;
                let key = decode_element(key, bucket.key_is_object(), ctx)?;
                let value = decode_element(value, bucket.value_is_object(), ctx)?;
                decoded.insert(key, value);
            }
        }
        *self = decoded;
        Ok(())
    }
}

fn split_pair(pair: Value, bucket: Bucket) -> SerialResult<(Value, Value)> {
    match pair {
        Value::Array(items) if items.len() == 2 => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(key), Some(value)) => Ok((key, value)),
                _ => Err(SerialError::malformed(format!(
                    "dictionary entry in {bucket:?} must be a pair"
                ))),
            }
        }
        other => Err(SerialError::malformed(format!(
            "dictionary entry in {bucket:?} must be a pair, found {other}"
        ))),
    }
}

fn decode_element(raw: Value, is_object: bool, ctx: &DecodeContext<'_>) -> SerialResult<Element> {
    if is_object {
        ctx.decode_tuple(raw).map(Element::Object)
    } else {
        Ok(Element::Plain(raw))
    }
}

#[cfg(test)]
#[path = "tests/dictionary_tests.rs"]
mod tests;
