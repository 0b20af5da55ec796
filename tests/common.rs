#![allow(dead_code)]

use polyserial::tags::{GALLERY_IDENTIFIER, HDD_IMPORT, PERIODIC, SEED_CACHE, SHORTCUTS};
use polyserial::{
    from_payload, DecodeContext, NamedSerialisable, Payload, Registry, SerialResult,
    Serialisable, TypeTag, Version,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Three payload generations:
/// v1 `[period, max_runs]`, v2 `{"period", "max_runs"}`, v3 adds `"paused"`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Periodic {
    pub period: u64,
    pub max_runs: u32,
    pub paused: bool,
}

impl Serialisable for Periodic {
    fn type_tag(&self) -> TypeTag {
        PERIODIC
    }

    fn version(&self) -> Version {
        Version::new(3)
    }

    fn extract_payload(&self) -> Payload {
        json!({
            "period": self.period,
            "max_runs": self.max_runs,
            "paused": self.paused,
        })
    }

    fn init_from_payload(
        &mut self,
        payload: Payload,
        _ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        *self = from_payload(payload, "periodic v3")?;
        Ok(())
    }

    fn migration_step(
        &self,
        version: Version,
        payload: Payload,
    ) -> SerialResult<(Version, Payload)> {
        match version.get() {
            1 => {
                let (period, max_runs): (u64, u32) = from_payload(payload, "periodic v1")?;
                Ok((
                    Version::new(2),
                    json!({ "period": period, "max_runs": max_runs }),
                ))
            }
            2 => {
                let mut payload = payload;
                if let Value::Object(fields) = &mut payload {
                    fields.entry("paused").or_insert(Value::Bool(false));
                }
                Ok((Version::new(3), payload))
            }
            _ => Ok((version, payload)),
        }
    }
}

/// Named variant: a set of key bindings under a user-chosen name.
#[derive(Clone, Debug, PartialEq)]
pub struct Shortcuts {
    pub name: String,
    pub bindings: Vec<(String, String)>,
}

impl Shortcuts {
    pub fn new(name: String) -> Self {
        Self {
            name,
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, key: &str, action: &str) -> Self {
        self.bindings.push((key.to_string(), action.to_string()));
        self
    }
}

impl Serialisable for Shortcuts {
    fn type_tag(&self) -> TypeTag {
        SHORTCUTS
    }

    fn version(&self) -> Version {
        Version::new(1)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn extract_payload(&self) -> Payload {
        json!(self.bindings)
    }

    fn init_from_payload(
        &mut self,
        payload: Payload,
        _ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        self.bindings = from_payload(payload, "shortcuts")?;
        Ok(())
    }
}

impl NamedSerialisable for Shortcuts {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GalleryIdentifier {
    pub site: String,
}

impl GalleryIdentifier {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
        }
    }
}

impl Serialisable for GalleryIdentifier {
    fn type_tag(&self) -> TypeTag {
        GALLERY_IDENTIFIER
    }

    fn version(&self) -> Version {
        Version::new(1)
    }

    fn extract_payload(&self) -> Payload {
        json!(self.site)
    }

    fn init_from_payload(
        &mut self,
        payload: Payload,
        _ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        self.site = from_payload(payload, "gallery identifier")?;
        Ok(())
    }
}

/// At version 3 but only knows how to leave version 1.
#[derive(Clone, Debug, Default)]
pub struct MissingStep;

impl Serialisable for MissingStep {
    fn type_tag(&self) -> TypeTag {
        SEED_CACHE
    }

    fn version(&self) -> Version {
        Version::new(3)
    }

    fn extract_payload(&self) -> Payload {
        Value::Null
    }

    fn init_from_payload(
        &mut self,
        _payload: Payload,
        _ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn migration_step(
        &self,
        version: Version,
        payload: Payload,
    ) -> SerialResult<(Version, Payload)> {
        if version.get() == 1 {
            Ok((Version::new(2), payload))
        } else {
            Ok((version, payload))
        }
    }
}

/// Its only step jumps past the current version.
#[derive(Clone, Debug, Default)]
pub struct Overshooter;

impl Serialisable for Overshooter {
    fn type_tag(&self) -> TypeTag {
        HDD_IMPORT
    }

    fn version(&self) -> Version {
        Version::new(2)
    }

    fn extract_payload(&self) -> Payload {
        Value::Null
    }

    fn init_from_payload(
        &mut self,
        _payload: Payload,
        _ctx: &DecodeContext<'_>,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn migration_step(
        &self,
        _version: Version,
        payload: Payload,
    ) -> SerialResult<(Version, Payload)> {
        Ok((Version::new(5), payload))
    }
}

pub fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register_anonymous(PERIODIC, Periodic::default)
        .expect("register periodic");
    builder
        .register_named(SHORTCUTS, Shortcuts::new)
        .expect("register shortcuts");
    builder
        .register_anonymous(GALLERY_IDENTIFIER, GalleryIdentifier::default)
        .expect("register gallery identifier");
    builder
        .register_anonymous(SEED_CACHE, || MissingStep)
        .expect("register missing step");
    builder
        .register_anonymous(HDD_IMPORT, || Overshooter)
        .expect("register overshooter");
    builder.build()
}

pub fn periodic(period: u64, max_runs: u32, paused: bool) -> Periodic {
    Periodic {
        period,
        max_runs,
        paused,
    }
}
