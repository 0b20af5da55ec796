//! Polymorphic list. Every element is a serialisable object; the payload is
//! the array of their envelope tuples in order.

use std::ops::Index;

use serde_json::Value;

use crate::codec::DecodeContext;
use crate::envelope::{value_kind, Envelope, Payload};
use crate::error::{SerialError, SerialResult};
use crate::object::Serialisable;
use crate::tags::{TypeTag, Version, LIST};
use crate::version::LIST_VERSION;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerialisableList {
    items: Vec<Box<dyn Serialisable>>,
}

impl SerialisableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Serialisable + 'static>(&mut self, obj: T) {
        self.items.push(Box::new(obj));
    }

    pub fn push_boxed(&mut self, obj: Box<dyn Serialisable>) {
        self.items.push(obj);
    }

    pub fn get(&self, index: usize) -> Option<&(dyn Serialisable + 'static)> {
        self.items.get(index).map(|obj| obj.as_ref())
    }

    pub fn get_as<T: Serialisable + 'static>(&self, index: usize) -> Option<&T> {
        self.get(index).and_then(|obj| obj.downcast_ref::<T>())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Serialisable + 'static)> {
        self.items.iter().map(|obj| obj.as_ref())
    }

    /// Elements of concrete type `T`, skipping every other variant.
    pub fn iter_as<T: Serialisable + 'static>(&self) -> impl Iterator<Item = &T> {
        self.iter().filter_map(|obj| obj.downcast_ref::<T>())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_inner(self) -> Vec<Box<dyn Serialisable>> {
        self.items
    }
}

impl Index<usize> for SerialisableList {
    type Output = dyn Serialisable;

    fn index(&self, index: usize) -> &Self::Output {
        self.items[index].as_ref()
    }
}

impl FromIterator<Box<dyn Serialisable>> for SerialisableList {
    fn from_iter<I: IntoIterator<Item = Box<dyn Serialisable>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Serialisable for SerialisableList {
    fn type_tag(&self) -> TypeTag {
        LIST
    }

    fn version(&self) -> Version {
        LIST_VERSION
    }

    fn extract_payload(&self) -> Payload {
        Value::Array(
            self.items
                .iter()
                .map(|obj| Envelope::of(obj.as_ref()).into_value())
                .collect(),
        )
    }

    fn init_from_payload(&mut self, payload: Payload, ctx: &DecodeContext<'_>) -> SerialResult<()> {
        let Value::Array(tuples) = payload else {
            return Err(SerialError::malformed(format!(
                "list payload must be an array, found {}",
                value_kind(&payload)
            )));
        };
        self.items = tuples
            .into_iter()
            .map(|tuple| ctx.decode_tuple(tuple))
            .collect::<SerialResult<_>>()?;
        Ok(())
    }
}
