//! The unweighted reservoir engine.
//!
//! Maintains a uniform sample of size `k` from a stream of unknown
//! length. The engine is generic over a [`SkipGenerator`]: the variants
//! differ only in how they compute the gap between two acceptances.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::error::{Result, SampleError};
use crate::skip::{LiLSkip, SkipGenerator, VitterXSkip, VitterZSkip, WatermanSkip};

/// A reservoir sampler that maintains a uniform sample of size `k` from
/// a stream.
///
/// Every item fed ends up in the sample with probability
/// `min(k, n) / n` where `n` is the stream size. Duplicate items are
/// allowed and treated as distinct stream positions.
///
/// # Example
///
/// ```rust
/// use tameike::LiLSampler;
///
/// let mut sampler = LiLSampler::<_>::new(5).unwrap();
/// for i in 0..100 {
///     sampler.feed(i).unwrap();
/// }
/// assert_eq!(sampler.sample().len(), 5);
/// assert_eq!(sampler.stream_size(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T, S: SkipGenerator, R: Rng = ThreadRng> {
    sample_size: usize,
    rng: R,
    reservoir: Vec<T>,
    stream_size: u64,
    skip: u64,
    generator: S,
}

/// Waterman's Algorithm R: one RNG draw per item.
pub type WatermanSampler<T, R = ThreadRng> = ReservoirSampler<T, WatermanSkip, R>;

/// Vitter's Algorithm X: one RNG draw per acceptance, per-item skip
/// scan.
pub type VitterXSampler<T, R = ThreadRng> = ReservoirSampler<T, VitterXSkip, R>;

/// Vitter's Algorithm Z: rejection-sampled skips, O(k(1 + log(N/k)))
/// RNG draws in expectation.
pub type VitterZSampler<T, R = ThreadRng> = ReservoirSampler<T, VitterZSkip, R>;

/// Li's Algorithm L: closed-form skips, O(k(1 + log(N/k))) RNG draws in
/// expectation.
pub type LiLSampler<T, R = ThreadRng> = ReservoirSampler<T, LiLSkip, R>;

impl<T, S: SkipGenerator, R: Rng + Default> ReservoirSampler<T, S, R> {
    /// Create a sampler that keeps `sample_size` items, using a default
    /// source of randomness.
    pub fn new(sample_size: usize) -> Result<Self> {
        Self::with_rng(sample_size, R::default())
    }
}

impl<T, S: SkipGenerator, R: Rng> ReservoirSampler<T, S, R> {
    /// Create a sampler that keeps `sample_size` items, using a
    /// caller-supplied RNG.
    ///
    /// The sampler owns the RNG for its lifetime; seed it for
    /// deterministic behavior in tests and benchmarks.
    pub fn with_rng(sample_size: usize, mut rng: R) -> Result<Self> {
        if sample_size == 0 {
            return Err(SampleError::InvalidSampleSize(sample_size));
        }
        let mut generator = S::create(sample_size, &mut rng);
        // The first skip applies immediately after the reservoir fills.
        let skip = generator.next_skip(&mut rng)?;
        Ok(Self {
            sample_size,
            rng,
            reservoir: Vec::with_capacity(sample_size),
            stream_size: 0,
            skip,
            generator,
        })
    }

    /// Feed one item from the stream.
    ///
    /// Returns `true` iff the sample changed. Runs in constant amortized
    /// time.
    pub fn feed(&mut self, item: T) -> Result<bool> {
        if self.stream_size == u64::MAX {
            return Err(SampleError::StreamOverflow);
        }
        self.stream_size += 1;

        if self.reservoir.len() < self.sample_size {
            self.reservoir.push(item);
            return Ok(true);
        }

        if self.skip > 0 {
            self.skip -= 1;
            return Ok(false);
        }

        let slot = self.rng.random_range(0..self.sample_size);
        self.reservoir[slot] = item;
        self.skip = self.generator.next_skip(&mut self.rng)?;
        Ok(true)
    }

    /// Feed every item of a sequence.
    ///
    /// Returns `true` iff any item changed the sample.
    pub fn feed_many<I>(&mut self, items: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let mut changed = false;
        for item in items {
            changed |= self.feed(item)?;
        }
        Ok(changed)
    }

    /// The current sample, as a read-only view over the reservoir.
    ///
    /// The slice always holds exactly `min(sample_size, stream_size)`
    /// items, in no particular order. Callers who need a snapshot must
    /// copy.
    pub fn sample(&self) -> &[T] {
        &self.reservoir
    }

    /// The configured sample size `k`.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Number of items fed since construction.
    pub fn stream_size(&self) -> u64 {
        self.stream_size
    }

    /// Tear the sampler down into its sampled items.
    pub(crate) fn into_items(self) -> Vec<T> {
        self.reservoir
    }
}
