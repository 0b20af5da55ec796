mod codec;
mod compress;
mod config;
mod dictionary;
mod envelope;
mod error;
mod list;
mod object;
mod registry;
pub mod tags;
pub mod version;

pub use codec::{dump_to_network, dump_to_string, Codec, DecodeContext};
pub use compress::{compress, decompress};
pub use config::{CodecLimits, ConfigError};
pub use dictionary::{Bucket, Element, SerialisableDictionary};
pub use envelope::{Envelope, EnvelopeHeader, Payload};
pub use error::{MigrationFailure, SerialError, SerialResult};
pub use list::SerialisableList;
pub use object::{
    downcast, from_payload, initialise_from_envelope, MigrationReport, MigrationTraceEntry,
    NamedSerialisable, Serialisable, SerialisableClone,
};
pub use registry::{global, install_global, Factory, Registry, RegistryBuilder};
pub use tags::{TypeTag, Version};
