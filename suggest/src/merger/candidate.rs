use std::fmt;

/// A merge candidate packing the document id and its overlap in one word.
///
/// The id occupies the upper 32 bits, so candidates sort by id.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate(u64);

impl Candidate {
    /// Creates a candidate.
    #[inline(always)]
    pub const fn new(position: u32, overlap: u32) -> Self {
        Self(((position as u64) << 32) | overlap as u64)
    }

    /// Gets the document id.
    #[inline(always)]
    pub const fn position(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Gets the number of lists containing the document.
    #[inline(always)]
    pub const fn overlap(self) -> usize {
        (self.0 & 0xffff_ffff) as usize
    }

    /// Counts one more list.
    #[inline(always)]
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("position", &self.position())
            .field("overlap", &self.overlap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack() {
        let mut c = Candidate::new(u32::MAX, 3);
        assert_eq!(c.position(), u32::MAX);
        assert_eq!(c.overlap(), 3);
        c.increment();
        assert_eq!(c.position(), u32::MAX);
        assert_eq!(c.overlap(), 4);
        assert!(Candidate::new(1, 100) < Candidate::new(2, 0));
    }
}
