//! The strictly proportional weighted engine.
//!
//! Chao's scheme keeps the first-order inclusion probability of every
//! fed item equal to `k·wᵢ/Σw`, clipped to 1. Items whose current
//! inclusion probability reaches 1 are "overweight" and forced into the
//! sample; the rest of the reservoir is an unordered feasible bag.
//!
//! ## References
//!
//! - Chao (1982): *A general purpose unequal probability sampling plan*.
//! - Sugden (1996): *Chao's list sequential scheme for unequal
//!   probability sampling*.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::error::{Result, SampleError};
use crate::util::weighted_random_selection;
use crate::weighted::Weighted;

const WEIGHT_RANGE: &str = "(0,+Inf)";

/// A weighted reservoir sampler with strictly proportional inclusion
/// probabilities.
///
/// # Example
///
/// ```rust
/// use tameike::ChaoSampler;
///
/// let mut sampler = ChaoSampler::<_>::new(5).unwrap();
/// for i in 0..10u32 {
///     sampler.feed_weighted(i, (i + 1) as f64).unwrap();
/// }
/// assert_eq!(sampler.sample().count(), 5);
/// ```
#[derive(Debug)]
pub struct ChaoSampler<T, R: Rng = ThreadRng> {
    sample_size: usize,
    rng: R,
    /// Items selected from the non-overweight remainder of the stream.
    feasible: Vec<T>,
    /// Forced-in items, sorted ascending by `(weight, seq)`.
    overweight: Vec<Weighted<T>>,
    stream_size: u64,
    weight_sum: f64,
}

impl<T, R: Rng + Default> ChaoSampler<T, R> {
    /// Create a sampler that keeps `sample_size` items, using a default
    /// source of randomness.
    pub fn new(sample_size: usize) -> Result<Self> {
        Self::with_rng(sample_size, R::default())
    }
}

impl<T, R: Rng> ChaoSampler<T, R> {
    /// Weight used when an item is fed without an explicit weight.
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// Create a sampler that keeps `sample_size` items, using a
    /// caller-supplied RNG.
    pub fn with_rng(sample_size: usize, rng: R) -> Result<Self> {
        if sample_size == 0 {
            return Err(SampleError::InvalidSampleSize(sample_size));
        }
        Ok(Self {
            sample_size,
            rng,
            feasible: Vec::with_capacity(sample_size),
            overweight: Vec::new(),
            stream_size: 0,
            weight_sum: 0.0,
        })
    }

    /// Feed one item along with its weight.
    ///
    /// Returns `true` iff the sample changed. Fails with
    /// [`SampleError::StreamOverflow`] once the weight sum leaves the
    /// finite range; the instance is unusable afterwards.
    pub fn feed_weighted(&mut self, item: T, weight: f64) -> Result<bool> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(SampleError::IllegalWeight {
                weight,
                range: WEIGHT_RANGE,
            });
        }
        if self.stream_size == u64::MAX {
            return Err(SampleError::StreamOverflow);
        }
        if !(self.weight_sum + weight).is_finite() {
            return Err(SampleError::StreamOverflow);
        }
        self.stream_size += 1;
        self.weight_sum += weight;

        // The first k items are forced in.
        if self.stream_size <= self.sample_size as u64 {
            self.insert_overweight(Weighted::new(item, weight));
            return Ok(true);
        }

        // First-order inclusion probability of the new item.
        let k = self.sample_size as f64;
        let w = weight * k / self.weight_sum;
        let new_is_overweight = w >= 1.0;

        // Re-evaluate the overweight set from the largest weight down.
        // Entries whose revised inclusion probability has dropped below
        // 1 are demoted, carrying a drop density for the eviction draw.
        let mut impossible_count: f64 = if new_is_overweight { 1.0 } else { 0.0 };
        let mut impossible_sum: f64 = if new_is_overweight { weight } else { 0.0 };
        let mut retained: Vec<Weighted<T>> = Vec::with_capacity(self.overweight.len());
        let mut possible: Vec<T> = Vec::new();
        let mut possible_dist: Vec<f64> = Vec::new();

        for entry in self.overweight.drain(..).rev() {
            let revised =
                entry.weight * (k - impossible_count) / (self.weight_sum - impossible_sum);
            if revised >= 1.0 {
                impossible_count += 1.0;
                impossible_sum += entry.weight;
                retained.push(entry);
            } else {
                possible_dist.push((1.0 - revised) / w.min(1.0));
                possible.push(entry.item);
            }
        }
        retained.reverse();
        self.overweight = retained;

        // Drop densities are positive by construction. Their sum stays
        // within [0, 1] for proportional weight profiles but can exceed
        // it when a light item arrives while the forced-in window still
        // holds entries far below inclusion probability 1; the
        // prefix-sum selection below saturates in that case.
        debug_assert!(possible_dist.iter().all(|&p| p >= 0.0));

        // Inclusion draw.
        let add: f64 = self.rng.random();

        // If the new item enters, one current member must leave: a
        // demoted entry chosen by drop density, or failing that a
        // uniform member of the feasible bag.
        if w > add {
            let u: f64 = self.rng.random();
            match weighted_random_selection(&possible_dist, u) {
                Some(index) => {
                    possible.swap_remove(index);
                }
                None => {
                    debug_assert!(!self.feasible.is_empty());
                    let evict = self.rng.random_range(0..self.feasible.len());
                    self.feasible.swap_remove(evict);
                }
            }
        }

        if new_is_overweight {
            self.insert_overweight(Weighted::new(item, weight));
        } else if w > add {
            self.feasible.push(item);
        }

        // Demoted entries rejoin the feasible bag.
        self.feasible.append(&mut possible);

        debug_assert_eq!(
            self.overweight.len() + self.feasible.len(),
            self.sample_size
        );

        Ok(w > add)
    }

    /// Feed one item with weight `1.0`.
    pub fn feed(&mut self, item: T) -> Result<bool> {
        self.feed_weighted(item, Self::DEFAULT_WEIGHT)
    }

    /// Feed every item of a sequence with weight `1.0`.
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

    /// Feed paired items and weights.
    ///
    /// Fails with [`SampleError::MismatchedLengths`] if one sequence is
    /// exhausted before the other; pairs fed before the mismatch was
    /// detected remain fed.
    pub fn feed_weighted_many<I, W>(&mut self, items: I, weights: W) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
        W: IntoIterator<Item = f64>,
    {
        let mut items = items.into_iter();
        let mut weights = weights.into_iter();
        let mut changed = false;
        loop {
            match (items.next(), weights.next()) {
                (Some(item), Some(weight)) => {
                    changed |= self.feed_weighted(item, weight)?;
                }
                (None, None) => return Ok(changed),
                _ => return Err(SampleError::MismatchedLengths),
            }
        }
    }

    /// The current sample: the feasible bag followed by the overweight
    /// items, as a read-only view.
    pub fn sample(&self) -> impl Iterator<Item = &T> {
        self.feasible
            .iter()
            .chain(self.overweight.iter().map(|entry| &entry.item))
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
        let mut items = self.feasible;
        items.extend(self.overweight.into_iter().map(|entry| entry.item));
        items
    }

    fn insert_overweight(&mut self, entry: Weighted<T>) {
        let pos = self.overweight.partition_point(|e| e < &entry);
        self.overweight.insert(pos, entry);
    }
}
