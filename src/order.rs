//! The key-ordered weighted engine ("order sampling").
//!
//! Each unit of the population is assigned an independent key drawn
//! from a weight-dependent distribution and the items with the largest
//! keys form the sample. The engines differ only in the key's
//! distribution given the weight, which determines the
//! inclusion-probability profile.
//!
//! ## References
//!
//! - Efraimidis & Spirakis (2006): *Weighted random sampling with a
//!   reservoir* (A-Res).
//! - Ohlsson (1998): *Sequential Poisson Sampling*.
//! - Rosén (1997): *On sampling with probability proportional to size*
//!   (Pareto sampling).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::error::{Result, SampleError};
use crate::util::random_exclusive;
use crate::weighted::Weighted;

/// Key generation policy of an order-sampling engine.
///
/// A policy validates weights, documents the accepted range, and maps a
/// weight to a random sort key. Keys are drawn so that a larger key is
/// always better; the engine keeps the `k` largest.
pub trait OrderKey {
    /// Weight used when an item is fed without an explicit weight.
    const DEFAULT_WEIGHT: f64;

    /// The accepted weight range, in interval notation, for error
    /// messages.
    const WEIGHT_RANGE: &'static str;

    /// Whether the weight is acceptable for this policy.
    fn is_weight_valid(weight: f64) -> bool;

    /// Draw the sort key for a valid weight.
    ///
    /// Keys are non-negative; exact `0` (and `+inf` for extreme legal
    /// weights) can occur through floating-point rounding and is
    /// tolerated.
    fn key<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64;
}

/// Efraimidis–Spirakis A-Res: `key = r^(1/w)`, weights in `(0,+Inf)`.
#[derive(Debug, Clone, Copy)]
pub struct EfraimidisKey;

impl OrderKey for EfraimidisKey {
    const DEFAULT_WEIGHT: f64 = 1.0;
    const WEIGHT_RANGE: &'static str = "(0,+Inf)";

    fn is_weight_valid(weight: f64) -> bool {
        weight > 0.0 && weight.is_finite()
    }

    fn key<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64 {
        // r^(1/w) written through the log to stay stable for huge w.
        (random_exclusive(rng).ln() / weight).exp()
    }
}

/// Ohlsson's sequential Poisson sampling: `key = w/r`, weights in
/// `(0,+Inf)`.
#[derive(Debug, Clone, Copy)]
pub struct SequentialPoissonKey;

impl OrderKey for SequentialPoissonKey {
    const DEFAULT_WEIGHT: f64 = 1.0;
    const WEIGHT_RANGE: &'static str = "(0,+Inf)";

    fn is_weight_valid(weight: f64) -> bool {
        weight > 0.0 && weight.is_finite()
    }

    fn key<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64 {
        weight / random_exclusive(rng)
    }
}

/// Rosén's Pareto sampling: `key = (r·w)/((1−r)(1−w))`, weights in
/// `(0,1)`.
///
/// Weights are target inclusion probabilities; the realized inclusion
/// probabilities approximate them. The default weight `0.5` keeps
/// unweighted feeding legal but assigns every item an identically
/// distributed key.
#[derive(Debug, Clone, Copy)]
pub struct ParetoKey;

impl OrderKey for ParetoKey {
    const DEFAULT_WEIGHT: f64 = 0.5;
    const WEIGHT_RANGE: &'static str = "(0,1)";

    fn is_weight_valid(weight: f64) -> bool {
        weight > 0.0 && weight < 1.0
    }

    fn key<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64 {
        let r = random_exclusive(rng);
        (r * weight) / ((1.0 - r) * (1.0 - weight))
    }
}

/// A weighted reservoir sampler that keeps the `k` items with the
/// largest generated keys.
///
/// The reservoir is a min-root priority queue over `(key, tie-breaker)`,
/// so each incoming item is compared against the smallest retained key
/// in O(log k).
///
/// # Example
///
/// ```rust
/// use tameike::EfraimidisSampler;
///
/// let mut sampler = EfraimidisSampler::<_>::new(2).unwrap();
/// for (word, weight) in [("rare", 1.0), ("common", 10.0), ("typical", 5.0)] {
///     sampler.feed_weighted(word, weight).unwrap();
/// }
/// assert_eq!(sampler.sample().count(), 2);
/// ```
#[derive(Debug)]
pub struct OrderSampler<T, K: OrderKey, R: Rng = ThreadRng> {
    sample_size: usize,
    rng: R,
    heap: BinaryHeap<Reverse<Weighted<T>>>,
    stream_size: u64,
    _policy: PhantomData<K>,
}

/// Efraimidis–Spirakis A-Res sampler.
pub type EfraimidisSampler<T, R = ThreadRng> = OrderSampler<T, EfraimidisKey, R>;

/// Sequential Poisson sampler.
pub type SequentialPoissonSampler<T, R = ThreadRng> =
    OrderSampler<T, SequentialPoissonKey, R>;

/// Pareto sampler.
pub type ParetoSampler<T, R = ThreadRng> = OrderSampler<T, ParetoKey, R>;

impl<T, K: OrderKey, R: Rng + Default> OrderSampler<T, K, R> {
    /// Create a sampler that keeps `sample_size` items, using a default
    /// source of randomness.
    pub fn new(sample_size: usize) -> Result<Self> {
        Self::with_rng(sample_size, R::default())
    }
}

impl<T, K: OrderKey, R: Rng> OrderSampler<T, K, R> {
    /// Create a sampler that keeps `sample_size` items, using a
    /// caller-supplied RNG.
    pub fn with_rng(sample_size: usize, rng: R) -> Result<Self> {
        if sample_size == 0 {
            return Err(SampleError::InvalidSampleSize(sample_size));
        }
        Ok(Self {
            sample_size,
            rng,
            heap: BinaryHeap::with_capacity(sample_size),
            stream_size: 0,
            _policy: PhantomData,
        })
    }

    /// Feed one item along with its weight.
    ///
    /// Returns `true` iff the sample changed. Runs in O(log k) and
    /// draws exactly one random key.
    pub fn feed_weighted(&mut self, item: T, weight: f64) -> Result<bool> {
        if !K::is_weight_valid(weight) {
            return Err(SampleError::IllegalWeight {
                weight,
                range: K::WEIGHT_RANGE,
            });
        }
        if self.stream_size == u64::MAX {
            return Err(SampleError::StreamOverflow);
        }
        self.stream_size += 1;

        let entry = Weighted::new(item, K::key(weight, &mut self.rng));

        if self.heap.len() < self.sample_size {
            self.heap.push(Reverse(entry));
            return Ok(true);
        }

        // The root holds the smallest retained key. Ties fall back to
        // the construction sequence, so an equal-keyed latecomer still
        // displaces the incumbent.
        let displaces = match self.heap.peek() {
            Some(Reverse(root)) => root < &entry,
            None => true,
        };
        if displaces {
            self.heap.pop();
            self.heap.push(Reverse(entry));
            return Ok(true);
        }

        Ok(false)
    }

    /// Feed one item with the policy's default weight.
    pub fn feed(&mut self, item: T) -> Result<bool> {
        self.feed_weighted(item, K::DEFAULT_WEIGHT)
    }

    /// Feed every item of a sequence with the policy's default weight.
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

    /// The current sample, as a read-only view over the priority queue.
    ///
    /// Iteration order is the queue's internal order, which is
    /// unspecified beyond holding exactly `min(sample_size,
    /// stream_size)` items.
    pub fn sample(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|Reverse(entry)| &entry.item)
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
        self.heap
            .into_iter()
            .map(|Reverse(entry)| entry.item)
            .collect()
    }
}
