//! Format versioning constants for built-in variants and the network frame.
//!
//! Bump a container version whenever its payload shape changes, and add the
//! matching migration step to the container.

use crate::tags::Version;

/// Current payload version of the polymorphic dictionary.
pub const DICTIONARY_VERSION: Version = Version::new(1);

/// Current payload version of the polymorphic list.
pub const LIST_VERSION: Version = Version::new(1);

/// Bytes of CRC32 checksum that open a network frame.
pub const NETWORK_CHECKSUM_LEN: usize = 4;

/// Bytes of the little-endian uncompressed size that precede the LZ4 block.
pub const NETWORK_SIZE_PREFIX_LEN: usize = 4;
