use std::io::Read;

use crate::errors::{Result, SuggestError};

pub trait FromU32 {
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

const EPSILON: f64 = 1e-9;

/// Ceil that ignores float noise right above an integer.
#[inline(always)]
pub fn ceil_tolerant(x: f64) -> f64 {
    (x - EPSILON).ceil()
}

/// Floor that ignores float noise right below an integer.
#[inline(always)]
pub fn floor_tolerant(x: f64) -> f64 {
    (x + EPSILON).floor()
}

/// Reads exactly `len` bytes, growing the buffer only as bytes arrive so
/// that a corrupt length cannot force a huge allocation.
///
/// # Errors
///
/// [`SuggestError::InvalidSize`] is returned with the number of bytes found
/// when the input ends early.
pub fn read_bytes<R>(rdr: R, len: usize, what: &'static str) -> Result<Vec<u8>>
where
    R: Read,
{
    let mut bytes = vec![];
    rdr.take(u64::try_from(len)?).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(SuggestError::InvalidSize {
            what,
            len: bytes.len(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerant_rounding() {
        assert_eq!(ceil_tolerant(7.000000000001), 7.0);
        assert_eq!(ceil_tolerant(7.1), 8.0);
        assert_eq!(floor_tolerant(17.99999999999), 18.0);
        assert_eq!(floor_tolerant(17.9), 17.0);
    }

    #[test]
    fn test_read_bytes() {
        let data = b"abcdef";
        assert_eq!(read_bytes(&data[..], 4, "data").unwrap(), b"abcd");
        assert!(matches!(
            read_bytes(&data[..], usize::MAX, "data"),
            Err(SuggestError::InvalidSize { what: "data", len: 6 })
        ));
    }
}
