use std::error::Error;
use std::fmt;

use super::Candidate;

/// Signals that a collector has seen enough candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTerminated;

impl fmt::Display for CollectionTerminated {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CollectionTerminated")
    }
}

impl Error for CollectionTerminated {}

/// A sink of merge candidates.
pub trait Collector {
    /// Receives a candidate; returning an error stops the merge.
    fn collect(&mut self, candidate: Candidate) -> Result<(), CollectionTerminated>;
}

impl<F> Collector for F
where
    F: FnMut(Candidate) -> Result<(), CollectionTerminated>,
{
    #[inline(always)]
    fn collect(&mut self, candidate: Candidate) -> Result<(), CollectionTerminated> {
        self(candidate)
    }
}

/// Keeps every candidate.
#[derive(Debug, Default)]
pub struct VecCollector {
    candidates: Vec<Candidate>,
}

impl VecCollector {
    /// Gets the collected candidates in arrival order.
    pub fn into_inner(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl Collector for VecCollector {
    #[inline(always)]
    fn collect(&mut self, candidate: Candidate) -> Result<(), CollectionTerminated> {
        self.candidates.push(candidate);
        Ok(())
    }
}

/// Keeps the first `k` candidates and then terminates the merge.
#[derive(Debug)]
pub struct FirstKCollector {
    k: usize,
    candidates: Vec<Candidate>,
}

impl FirstKCollector {
    /// Creates a collector of at most `k` candidates.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            candidates: Vec::with_capacity(k),
        }
    }

    /// Gets the collected candidates in arrival order.
    pub fn into_inner(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl Collector for FirstKCollector {
    fn collect(&mut self, candidate: Candidate) -> Result<(), CollectionTerminated> {
        if self.candidates.len() >= self.k {
            return Err(CollectionTerminated);
        }
        self.candidates.push(candidate);
        if self.candidates.len() == self.k {
            return Err(CollectionTerminated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_k() {
        let mut collector = FirstKCollector::new(2);
        assert_eq!(collector.collect(Candidate::new(3, 1)), Ok(()));
        assert_eq!(
            collector.collect(Candidate::new(5, 1)),
            Err(CollectionTerminated)
        );
        assert_eq!(
            collector.collect(Candidate::new(7, 1)),
            Err(CollectionTerminated)
        );
        let positions: Vec<_> = collector
            .into_inner()
            .into_iter()
            .map(Candidate::position)
            .collect();
        assert_eq!(positions, vec![3, 5]);
    }

    #[test]
    fn test_first_zero() {
        let mut collector = FirstKCollector::new(0);
        assert_eq!(
            collector.collect(Candidate::new(3, 1)),
            Err(CollectionTerminated)
        );
        assert!(collector.into_inner().is_empty());
    }

    #[test]
    fn test_closure() {
        let mut seen = vec![];
        let mut collector = |c: Candidate| -> Result<(), CollectionTerminated> {
            seen.push(c.position());
            Ok(())
        };
        collector.collect(Candidate::new(9, 2)).unwrap();
        assert_eq!(seen, vec![9]);
    }
}
