//! Common settings shared by the persisted structures.

use bincode::config::{self, Fixint, LittleEndian};

/// Gap between skip pointers; lists longer than this use the skip codec.
pub const SKIP_GAP: usize = 64;

/// Maximum number of bytes in a variable-byte encoded `u32`.
pub const MAX_VARINT_LEN: usize = 5;

/// Upper bound of candidate cardinality for the overlap metric.
pub const MAX_OVERLAP_CARDINALITY: usize = i16::MAX as usize;

/// Gets the common bincode configuration of serialization.
pub fn bincode_config() -> config::Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
        .write_fixed_array_length()
}
