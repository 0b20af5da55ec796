//! Permanent type tags and payload versions.
//!
//! A tag is assigned once, when a variant is first defined, and is never
//! reused. Retired variants leave a gap in the table below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire identifier of a serialisable variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(u32);

impl TypeTag {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Well-known name of this tag, if it appears in the permanent table.
    pub fn label(self) -> Option<&'static str> {
        tag_label(self)
    }

    /// Abstract base markers are part of the table but never registrable.
    pub fn is_abstract(self) -> bool {
        self == BASE || self == BASE_NAMED
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "type {} ({label})", self.0),
            None => write!(f, "type {}", self.0),
        }
    }
}

/// Payload schema version owned by a variant. Starts at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u32);

impl Version {
    pub const INITIAL: Version = Version(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const BASE: TypeTag = TypeTag(0);
pub const BASE_NAMED: TypeTag = TypeTag(1);
pub const SHORTCUTS: TypeTag = TypeTag(2);
pub const SUBSCRIPTION: TypeTag = TypeTag(3);
pub const PERIODIC: TypeTag = TypeTag(4);
pub const GALLERY_IDENTIFIER: TypeTag = TypeTag(5);
pub const IMPORT_TAG_OPTIONS: TypeTag = TypeTag(6);
pub const IMPORT_FILE_OPTIONS: TypeTag = TypeTag(7);
pub const SEED_CACHE: TypeTag = TypeTag(8);
pub const HDD_IMPORT: TypeTag = TypeTag(9);
pub const SERVER_TO_CLIENT_CONTENT_UPDATE_PACKAGE: TypeTag = TypeTag(10);
pub const SERVER_TO_CLIENT_SERVICE_UPDATE_PACKAGE: TypeTag = TypeTag(11);
pub const MANAGEMENT_CONTROLLER: TypeTag = TypeTag(12);
pub const GUI_SESSION: TypeTag = TypeTag(13);
pub const PREDICATE: TypeTag = TypeTag(14);
pub const FILE_SEARCH_CONTEXT: TypeTag = TypeTag(15);
pub const EXPORT_FOLDER: TypeTag = TypeTag(16);
pub const THREAD_WATCHER_IMPORT: TypeTag = TypeTag(17);
pub const PAGE_OF_IMAGES_IMPORT: TypeTag = TypeTag(18);
pub const IMPORT_FOLDER: TypeTag = TypeTag(19);
pub const GALLERY_IMPORT: TypeTag = TypeTag(20);
pub const DICTIONARY: TypeTag = TypeTag(21);
pub const CLIENT_OPTIONS: TypeTag = TypeTag(22);
pub const CONTENT: TypeTag = TypeTag(23);
pub const SERVER_TO_CLIENT_PETITION: TypeTag = TypeTag(24);
pub const ACCOUNT_IDENTIFIER: TypeTag = TypeTag(25);
pub const LIST: TypeTag = TypeTag(26);

const TAG_LABELS: &[(TypeTag, &str)] = &[
    (BASE, "base"),
    (BASE_NAMED, "base_named"),
    (SHORTCUTS, "shortcuts"),
    (SUBSCRIPTION, "subscription"),
    (PERIODIC, "periodic"),
    (GALLERY_IDENTIFIER, "gallery_identifier"),
    (IMPORT_TAG_OPTIONS, "import_tag_options"),
    (IMPORT_FILE_OPTIONS, "import_file_options"),
    (SEED_CACHE, "seed_cache"),
    (HDD_IMPORT, "hdd_import"),
    (
        SERVER_TO_CLIENT_CONTENT_UPDATE_PACKAGE,
        "server_to_client_content_update_package",
    ),
    (
        SERVER_TO_CLIENT_SERVICE_UPDATE_PACKAGE,
        "server_to_client_service_update_package",
    ),
    (MANAGEMENT_CONTROLLER, "management_controller"),
    (GUI_SESSION, "gui_session"),
    (PREDICATE, "predicate"),
    (FILE_SEARCH_CONTEXT, "file_search_context"),
    (EXPORT_FOLDER, "export_folder"),
    (THREAD_WATCHER_IMPORT, "thread_watcher_import"),
    (PAGE_OF_IMAGES_IMPORT, "page_of_images_import"),
    (IMPORT_FOLDER, "import_folder"),
    (GALLERY_IMPORT, "gallery_import"),
    (DICTIONARY, "dictionary"),
    (CLIENT_OPTIONS, "client_options"),
    (CONTENT, "content"),
    (SERVER_TO_CLIENT_PETITION, "server_to_client_petition"),
    (ACCOUNT_IDENTIFIER, "account_identifier"),
    (LIST, "list"),
];

pub fn tag_label(tag: TypeTag) -> Option<&'static str> {
    TAG_LABELS
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, label)| *label)
}
