use std::any::Any;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::codec::DecodeContext;
use crate::envelope::{Envelope, Payload};
use crate::error::{MigrationFailure, SerialError, SerialResult};
use crate::tags::{TypeTag, Version};

/// Capability shared by every variant that can travel inside an envelope.
///
/// `extract_payload` must produce exactly the shape `init_from_payload`
/// accepts at the current `version`. Older shapes are reached through
/// `migration_step`, one version at a time.
pub trait Serialisable: SerialisableClone + Debug + Send + Sync {
    fn type_tag(&self) -> TypeTag;

    fn version(&self) -> Version;

    /// Identity string of named variants. Anonymous variants return `None`.
    fn name(&self) -> Option<&str> {
        None
    }

    fn extract_payload(&self) -> Payload;

    fn init_from_payload(&mut self, payload: Payload, ctx: &DecodeContext<'_>)
        -> SerialResult<()>;

    /// Upgrades a payload stored at `version` to a later version.
    ///
    /// The default returns its input unchanged, which the migration runner
    /// reports as a stalled chain if `version` is still behind.
    fn migration_step(
        &self,
        version: Version,
        payload: Payload,
    ) -> SerialResult<(Version, Payload)> {
        Ok((version, payload))
    }
}

/// Variants whose envelope carries a mutable identity string.
pub trait NamedSerialisable: Serialisable {
    fn set_name(&mut self, name: String);
}

/// Object-safe cloning and downcasting, implemented for every `Clone` variant.
pub trait SerialisableClone {
    fn clone_boxed(&self) -> Box<dyn Serialisable>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> SerialisableClone for T
where
    T: Serialisable + Clone + 'static,
{
    fn clone_boxed(&self) -> Box<dyn Serialisable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn Serialisable> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Two objects are equal when they would encode to the same envelope.
impl PartialEq for dyn Serialisable {
    fn eq(&self, other: &Self) -> bool {
        self.type_tag() == other.type_tag()
            && self.version() == other.version()
            && self.name() == other.name()
            && self.extract_payload() == other.extract_payload()
    }
}

impl dyn Serialisable {
    pub fn envelope(&self) -> Envelope {
        Envelope::of(self)
    }

    pub fn downcast_ref<T: Serialisable + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Serialisable + 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Serialisable + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Recovers the concrete type of a decoded object.
pub fn downcast<T: Serialisable + 'static>(obj: Box<dyn Serialisable>) -> SerialResult<Box<T>> {
    let found = obj.type_tag();
    obj.into_any().downcast::<T>().map_err(|_| {
        SerialError::malformed(format!(
            "decoded {found} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MigrationTraceEntry {
    pub from_version: Version,
    pub to_version: Version,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MigrationReport {
    pub tag: TypeTag,
    pub from_version: Version,
    pub to_version: Version,
    pub entries: Vec<MigrationTraceEntry>,
}

impl MigrationReport {
    pub fn migrated(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Walks `payload` forward from `version` to the object's current version,
/// then initialises the object from the result.
///
/// Every step must strictly advance the version without passing the
/// current one. On failure the object may be partially initialised and must
/// be discarded.
pub fn initialise_from_envelope(
    obj: &mut dyn Serialisable,
    version: Version,
    payload: Payload,
    ctx: &DecodeContext<'_>,
) -> SerialResult<MigrationReport> {
    let tag = obj.type_tag();
    let current = obj.version();
    let fail = |failure: MigrationFailure| {
        warn!(%tag, %failure, "rejecting envelope");
        SerialError::Migration { tag, failure }
    };

    if version > current {
        return Err(fail(MigrationFailure::FutureVersion {
            found: version,
            current,
        }));
    }

    let mut report = MigrationReport {
        tag,
        from_version: version,
        to_version: current,
        entries: Vec::new(),
    };
    let mut version = version;
    let mut payload = payload;
    while version < current {
        let (next, upgraded) = obj
            .migration_step(version, payload)
            .map_err(|err| match err {
                SerialError::Migration { .. } => err,
                other => fail(MigrationFailure::StepFailed {
                    from: version,
                    message: other.to_string(),
                }),
            })?;
        if next <= version {
            return Err(fail(MigrationFailure::Stalled {
                at: version,
                current,
            }));
        }
        if next > current {
            return Err(fail(MigrationFailure::Overshoot {
                from: version,
                to: next,
                current,
            }));
        }
        debug!(%tag, from = %version, to = %next, "migrated payload");
        report.entries.push(MigrationTraceEntry {
            from_version: version,
            to_version: next,
        });
        version = next;
        payload = upgraded;
    }

    obj.init_from_payload(payload, ctx)?;
    Ok(report)
}

/// Deserialises a payload into a typed shape, reporting mismatches as malformed.
pub fn from_payload<T: DeserializeOwned>(payload: Payload, what: &str) -> SerialResult<T> {
    serde_json::from_value(payload)
        .map_err(|err| SerialError::malformed(format!("{what}: {err}")))
}
