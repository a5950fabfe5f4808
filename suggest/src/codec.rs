//! Posting-list codecs.
//!
//! Three encodings are provided:
//!
//! * [`VarintEncoder`] / [`VarintDecoder`]: variable-byte deltas between
//!   successive ids, little-endian base-128 groups with `0x80` as the
//!   continuation bit.
//! * [`SkipEncoder`]: blocks of [`SKIP_GAP`] deltas, each prefixed by a 16-bit
//!   skip pointer; decoded lazily by
//!   [`SkipIterator`](crate::posting::SkipIterator).
//! * [`BinaryEncoder`] / [`BinaryDecoder`]: four little-endian bytes per id.
use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::common::{MAX_VARINT_LEN, SKIP_GAP};
use crate::errors::{Result, SuggestError};

/// Flag of the last block in the 16-bit skip header.
pub const LAST_BLOCK_FLAG: u16 = 0x8000;

/// Encodes an ascending list of ids into a byte sink.
pub trait Encoder {
    /// Writes the encoded list and returns the number of bytes written.
    fn encode(&self, list: &[u32], wtr: &mut dyn Write) -> Result<usize>;
}

/// Decodes a byte source into a pre-allocated buffer.
pub trait Decoder {
    /// Fills `buf` and returns the number of elements read.
    fn decode(&self, bytes: &[u8], buf: &mut [u32]) -> Result<usize>;
}

/// Writes a variable-byte `u32` and returns the number of bytes written.
pub fn write_vuint32<W>(mut wtr: W, mut value: u32) -> std::io::Result<usize>
where
    W: Write,
{
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    while value >= 0x80 {
        buf[len] = (value as u8) | 0x80;
        value >>= 7;
        len += 1;
    }
    buf[len] = value as u8;
    len += 1;
    wtr.write_all(&buf[..len])?;
    Ok(len)
}

/// Reads a variable-byte `u32` from the head of `bytes`.
///
/// Returns the value and the number of bytes consumed, or [`None`] on
/// truncated or overlong input.
#[inline(always)]
pub fn read_vuint32(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (i, &b) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u32::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

fn check_ascending(list: &[u32]) -> Result<()> {
    if list.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SuggestError::invalid_codec(
            "posting list must be strictly ascending",
        ));
    }
    Ok(())
}

/// Variable-byte delta encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarintEncoder {
    prev: u32,
}

impl VarintEncoder {
    /// Creates an encoder whose first delta is taken against `prev`.
    pub const fn with_prev(prev: u32) -> Self {
        Self { prev }
    }
}

impl Encoder for VarintEncoder {
    fn encode(&self, list: &[u32], wtr: &mut dyn Write) -> Result<usize> {
        check_ascending(list)?;
        let mut prev = self.prev;
        let mut written = 0;
        for &v in list {
            let delta = v.checked_sub(prev).ok_or_else(|| {
                SuggestError::invalid_codec("first id is smaller than the initial value")
            })?;
            written += write_vuint32(&mut *wtr, delta)?;
            prev = v;
        }
        Ok(written)
    }
}

/// Variable-byte delta decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarintDecoder {
    prev: u32,
}

impl VarintDecoder {
    /// Creates a decoder whose first delta is added to `prev`.
    pub const fn with_prev(prev: u32) -> Self {
        Self { prev }
    }
}

impl Decoder for VarintDecoder {
    fn decode(&self, mut bytes: &[u8], buf: &mut [u32]) -> Result<usize> {
        let mut prev = self.prev;
        for slot in buf.iter_mut() {
            let (delta, len) = read_vuint32(bytes)
                .ok_or_else(|| SuggestError::invalid_codec("truncated or malformed varint"))?;
            prev = prev
                .checked_add(delta)
                .ok_or_else(|| SuggestError::invalid_codec("id overflows u32"))?;
            *slot = prev;
            bytes = &bytes[len..];
        }
        Ok(buf.len())
    }
}

/// Skip-pointer block encoder.
///
/// Each block of up to [`SKIP_GAP`] ids is laid out as:
///
/// * a little-endian `u16` holding the byte length of the rest of the block,
///   with [`LAST_BLOCK_FLAG`] set on the last block;
/// * the varint delta of the block head against the previous block head;
/// * varint deltas of the other ids against their predecessors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipEncoder;

impl Encoder for SkipEncoder {
    fn encode(&self, list: &[u32], wtr: &mut dyn Write) -> Result<usize> {
        check_ascending(list)?;
        let num_blocks = (list.len() + SKIP_GAP - 1) / SKIP_GAP;
        let mut written = 0;
        let mut payload = Vec::with_capacity(SKIP_GAP * MAX_VARINT_LEN);
        let mut prev_head = 0;
        for (i, block) in list.chunks(SKIP_GAP).enumerate() {
            payload.clear();
            write_vuint32(&mut payload, block[0] - prev_head)?;
            for w in block.windows(2) {
                write_vuint32(&mut payload, w[1] - w[0])?;
            }
            prev_head = block[0];

            let mut header = u16::try_from(payload.len())?;
            if header & LAST_BLOCK_FLAG != 0 {
                return Err(SuggestError::invalid_codec("skip block is too long"));
            }
            if i + 1 == num_blocks {
                header |= LAST_BLOCK_FLAG;
            }
            wtr.write_u16::<LittleEndian>(header)?;
            wtr.write_all(&payload)?;
            written += 2 + payload.len();
        }
        Ok(written)
    }
}

/// Four little-endian bytes per id.
///
/// No length prefix is written; the element count is kept by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryEncoder;

impl Encoder for BinaryEncoder {
    fn encode(&self, list: &[u32], wtr: &mut dyn Write) -> Result<usize> {
        for &v in list {
            wtr.write_u32::<LittleEndian>(v)?;
        }
        Ok(list.len() * 4)
    }
}

/// Decoder of [`BinaryEncoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryDecoder;

impl Decoder for BinaryDecoder {
    fn decode(&self, bytes: &[u8], buf: &mut [u32]) -> Result<usize> {
        let len = buf.len() * 4;
        if bytes.len() < len {
            return Err(SuggestError::invalid_codec("truncated binary list"));
        }
        LittleEndian::read_u32_into(&bytes[..len], buf);
        Ok(buf.len())
    }
}

/// Codec used for a posting list of the given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingCodec {
    /// [`VarintEncoder`].
    Varint,

    /// [`SkipEncoder`].
    Skip,
}

impl PostingCodec {
    /// Chooses the codec from the number of elements.
    #[inline(always)]
    pub const fn for_len(len: usize) -> Self {
        if len > SKIP_GAP {
            Self::Skip
        } else {
            Self::Varint
        }
    }

    /// Encodes the list with this codec.
    pub fn encode(self, list: &[u32], wtr: &mut dyn Write) -> Result<usize> {
        match self {
            Self::Varint => VarintEncoder::default().encode(list, wtr),
            Self::Skip => SkipEncoder.encode(list, wtr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::posting::{PostingList, SkipIterator};

    #[test]
    fn test_varint_scenario() {
        let list = [824, 829, 215406];
        let mut bytes = vec![];
        let written = VarintEncoder::default().encode(&list, &mut bytes).unwrap();
        assert_eq!(written, bytes.len());
        assert!(written <= 8);

        let mut buf = [0; 3];
        assert_eq!(VarintDecoder::default().decode(&bytes, &mut buf).unwrap(), 3);
        assert_eq!(buf, list);
    }

    #[test]
    fn test_binary_scenario() {
        let list = [824, 829, 215406];
        let mut bytes = vec![];
        let written = BinaryEncoder.encode(&list, &mut bytes).unwrap();
        assert_eq!(written, 12);
        assert_eq!(bytes.len(), 12);

        let mut buf = [0; 3];
        assert_eq!(BinaryDecoder.decode(&bytes, &mut buf).unwrap(), 3);
        assert_eq!(buf, list);
    }

    #[test]
    fn test_varint_bytes() {
        let mut bytes = vec![];
        write_vuint32(&mut bytes, 300).unwrap();
        assert_eq!(bytes, [0xac, 0x02]);
        assert_eq!(read_vuint32(&bytes), Some((300, 2)));

        bytes.clear();
        write_vuint32(&mut bytes, u32::MAX).unwrap();
        assert_eq!(bytes.len(), 5);
        assert_eq!(read_vuint32(&bytes), Some((u32::MAX, 5)));
    }

    #[test]
    fn test_varint_with_prev() {
        let mut bytes = vec![];
        VarintEncoder::with_prev(100)
            .encode(&[101, 110], &mut bytes)
            .unwrap();
        assert_eq!(bytes, [1, 9]);
        let mut buf = [0; 2];
        VarintDecoder::with_prev(100)
            .decode(&bytes, &mut buf)
            .unwrap();
        assert_eq!(buf, [101, 110]);
    }

    #[test]
    fn test_varint_truncated() {
        let mut buf = [0; 2];
        let result = VarintDecoder::default().decode(&[0x05, 0x80], &mut buf);
        assert!(matches!(result, Err(SuggestError::InvalidCodec(_))));
    }

    #[test]
    fn test_varint_overlong() {
        let mut buf = [0; 1];
        let result = VarintDecoder::default().decode(&[0x80; 6], &mut buf);
        assert!(matches!(result, Err(SuggestError::InvalidCodec(_))));
    }

    #[test]
    fn test_not_ascending() {
        let mut bytes = vec![];
        assert!(VarintEncoder::default().encode(&[3, 3], &mut bytes).is_err());
        assert!(SkipEncoder.encode(&[5, 4], &mut bytes).is_err());
    }

    #[test]
    fn test_skip_layout() {
        let list: Vec<u32> = (0..130).map(|i| i * 3 + 1).collect();
        let mut bytes = vec![];
        let written = SkipEncoder.encode(&list, &mut bytes).unwrap();
        assert_eq!(written, bytes.len());

        // 3 blocks: 64 + 64 + 2
        let first = LittleEndian::read_u16(&bytes[0..2]);
        assert_eq!(first & LAST_BLOCK_FLAG, 0);
        let second_at = 2 + usize::from(first);
        let second = LittleEndian::read_u16(&bytes[second_at..second_at + 2]);
        assert_eq!(second & LAST_BLOCK_FLAG, 0);
        let third_at = second_at + 2 + usize::from(second);
        let third = LittleEndian::read_u16(&bytes[third_at..third_at + 2]);
        assert_ne!(third & LAST_BLOCK_FLAG, 0);
        assert_eq!(
            third_at + 2 + usize::from(third & !LAST_BLOCK_FLAG),
            bytes.len()
        );

        let decoded: Vec<u32> = SkipIterator::new(&bytes, list.len()).unwrap().collect_all();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_codec_choice() {
        assert_eq!(PostingCodec::for_len(1), PostingCodec::Varint);
        assert_eq!(PostingCodec::for_len(SKIP_GAP), PostingCodec::Varint);
        assert_eq!(PostingCodec::for_len(SKIP_GAP + 1), PostingCodec::Skip);
    }

    mod props {
        use super::*;

        use proptest::collection::btree_set;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn codecs_are_identity(set in btree_set(0u32..1_000_000, 0..300)) {
                let list: Vec<u32> = set.into_iter().collect();

                let mut bytes = vec![];
                VarintEncoder::default().encode(&list, &mut bytes).unwrap();
                let mut buf = vec![0; list.len()];
                VarintDecoder::default().decode(&bytes, &mut buf).unwrap();
                prop_assert_eq!(&buf, &list);

                bytes.clear();
                BinaryEncoder.encode(&list, &mut bytes).unwrap();
                BinaryDecoder.decode(&bytes, &mut buf).unwrap();
                prop_assert_eq!(&buf, &list);

                bytes.clear();
                SkipEncoder.encode(&list, &mut bytes).unwrap();
                let decoded = SkipIterator::new(&bytes, list.len()).unwrap().collect_all();
                prop_assert_eq!(&decoded, &list);
            }
        }
    }
}
