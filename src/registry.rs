//! Type registry: tag to constructor.
//!
//! Built once through [`RegistryBuilder`] during startup and sealed into an
//! immutable [`Registry`]. A sealed registry is `Send + Sync` and every
//! lookup is a plain read, so decoding threads share it without locking.

use std::collections::{btree_map::Entry, BTreeMap};
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::dictionary::SerialisableDictionary;
use crate::error::{SerialError, SerialResult};
use crate::list::SerialisableList;
use crate::object::{NamedSerialisable, Serialisable};
use crate::tags::{TypeTag, DICTIONARY, LIST};

pub type AnonymousFn = dyn Fn() -> Box<dyn Serialisable> + Send + Sync;
pub type NamedFn = dyn Fn(String) -> Box<dyn Serialisable> + Send + Sync;

/// Produces an empty instance of a registered variant.
pub enum Factory {
    Anonymous(Box<AnonymousFn>),
    Named(Box<NamedFn>),
}

impl Factory {
    pub fn anonymous<T, F>(make: F) -> Self
    where
        T: Serialisable + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Anonymous(Box::new(move || Box::new(make()) as Box<dyn Serialisable>))
    }

    pub fn named<T, F>(make: F) -> Self
    where
        T: NamedSerialisable + 'static,
        F: Fn(String) -> T + Send + Sync + 'static,
    {
        Self::Named(Box::new(move |name| Box::new(make(name)) as Box<dyn Serialisable>))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// Builds an instance, enforcing that the envelope arity matches the factory.
    pub fn instantiate(
        &self,
        tag: TypeTag,
        name: Option<String>,
    ) -> SerialResult<Box<dyn Serialisable>> {
        match (self, name) {
            (Self::Anonymous(make), None) => Ok(make()),
            (Self::Named(make), Some(name)) => Ok(make(name)),
            (Self::Anonymous(_), Some(name)) => Err(SerialError::malformed(format!(
                "{tag} is anonymous but the envelope carries name '{name}'"
            ))),
            (Self::Named(_), None) => Err(SerialError::malformed(format!(
                "{tag} is named but the envelope carries no name"
            ))),
        }
    }

    fn sample(&self) -> Box<dyn Serialisable> {
        match self {
            Self::Anonymous(make) => make(),
            Self::Named(make) => make(String::new()),
        }
    }
}

fn arity_kind(named: bool) -> &'static str {
    if named {
        "named"
    } else {
        "anonymous"
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous(_) => f.write_str("Factory::Anonymous"),
            Self::Named(_) => f.write_str("Factory::Named"),
        }
    }
}

/// Collects registrations during startup.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    factories: BTreeMap<TypeTag, Factory>,
}

impl RegistryBuilder {
    /// Starts an empty builder. Most callers want [`RegistryBuilder::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder that already knows the dictionary and list containers.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        builder
            .factories
            .insert(DICTIONARY, Factory::anonymous(SerialisableDictionary::new));
        builder
            .factories
            .insert(LIST, Factory::anonymous(SerialisableList::new));
        builder
    }

    /// Binds `tag` to `factory`.
    ///
    /// # Errors
    ///
    /// Fails if the tag is already bound or is an abstract base marker. Also
    /// fails if the factory builds objects that declare a different tag, or
    /// whose `name()` disagrees with the factory being named.
    pub fn register(&mut self, tag: TypeTag, factory: Factory) -> SerialResult<()> {
        if tag.is_abstract() {
            return Err(SerialError::ReservedTag { tag });
        }
        let sample = factory.sample();
        let declared = sample.type_tag();
        if declared != tag {
            return Err(SerialError::TagMismatch {
                registered: tag,
                declared,
            });
        }
        if factory.is_named() != sample.name().is_some() {
            return Err(SerialError::NameMismatch {
                tag,
                expected: arity_kind(factory.is_named()),
                found: arity_kind(sample.name().is_some()),
            });
        }
        match self.factories.entry(tag) {
            Entry::Occupied(_) => Err(SerialError::DuplicateTag { tag }),
            Entry::Vacant(slot) => {
                debug!(%tag, named = factory.is_named(), "registered variant");
                slot.insert(factory);
                Ok(())
            }
        }
    }

    pub fn register_anonymous<T, F>(&mut self, tag: TypeTag, make: F) -> SerialResult<()>
    where
        T: Serialisable + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(tag, Factory::anonymous(make))
    }

    pub fn register_named<T, F>(&mut self, tag: TypeTag, make: F) -> SerialResult<()>
    where
        T: NamedSerialisable + 'static,
        F: Fn(String) -> T + Send + Sync + 'static,
    {
        self.register(tag, Factory::named(make))
    }

    /// Seals the registrations. No tag can be added afterwards.
    pub fn build(self) -> Registry {
        debug!(variants = self.factories.len(), "sealed type registry");
        Registry {
            factories: self.factories,
        }
    }
}

/// Sealed, read-only mapping from tag to factory.
pub struct Registry {
    factories: BTreeMap<TypeTag, Factory>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::with_builtins()
    }

    /// Registry holding only the built-in containers.
    pub fn builtin() -> Self {
        RegistryBuilder::with_builtins().build()
    }

    pub fn resolve(&self, tag: TypeTag) -> SerialResult<&Factory> {
        self.factories
            .get(&tag)
            .ok_or(SerialError::UnknownType { tag })
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.factories.contains_key(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.factories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.factories.iter()).finish()
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Installs the process-wide registry. Only the first call wins; later calls
/// get their registry handed back.
pub fn install_global(registry: Registry) -> Result<(), Registry> {
    GLOBAL.set(registry)
}

/// The process-wide registry, if one was installed.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
