//! Fold-style collector adapter around the samplers.
//!
//! Lets a sampler act as the accumulator of an unordered reduction:
//! create an empty sampler, fold every stream item into it, extract the
//! sample. The reduction is non-combinable (merging two partial
//! reservoirs is not a meaningful operation), so [`Collector::combine`]
//! always fails.

use rand::Rng;

use crate::chao::ChaoSampler;
use crate::concurrent::ConcurrentLiLSampler;
use crate::error::{Result, SampleError};
use crate::order::{OrderKey, OrderSampler};
use crate::reservoir::ReservoirSampler;
use crate::skip::SkipGenerator;

/// An accumulator that folds stream items into a bounded sample.
pub trait Collector<T>: Sized {
    /// The extracted sample type.
    type Sample;

    /// Fold one item into the sampler.
    ///
    /// Returns `true` iff the sample changed.
    fn fold(&mut self, item: T) -> Result<bool>;

    /// Consume the sampler and extract the sample.
    fn finish(self) -> Self::Sample;

    /// Merge another partial sampler into this one.
    ///
    /// Always fails with [`SampleError::CannotCombine`]: two reservoirs
    /// cannot be merged without re-weighting against their full
    /// streams.
    fn combine(self, _other: Self) -> Result<Self> {
        Err(SampleError::CannotCombine)
    }
}

/// An accumulator that folds weighted stream items into a bounded
/// sample.
pub trait WeightedCollector<T>: Collector<T> {
    /// Fold one item with its weight into the sampler.
    fn fold_weighted(&mut self, item: T, weight: f64) -> Result<bool>;
}

impl<T, S: SkipGenerator, R: Rng> Collector<T> for ReservoirSampler<T, S, R> {
    type Sample = Vec<T>;

    fn fold(&mut self, item: T) -> Result<bool> {
        self.feed(item)
    }

    fn finish(self) -> Vec<T> {
        self.into_items()
    }
}

impl<T, K: OrderKey, R: Rng> Collector<T> for OrderSampler<T, K, R> {
    type Sample = Vec<T>;

    fn fold(&mut self, item: T) -> Result<bool> {
        self.feed(item)
    }

    fn finish(self) -> Vec<T> {
        self.into_items()
    }
}

impl<T, K: OrderKey, R: Rng> WeightedCollector<T> for OrderSampler<T, K, R> {
    fn fold_weighted(&mut self, item: T, weight: f64) -> Result<bool> {
        self.feed_weighted(item, weight)
    }
}

impl<T, R: Rng> Collector<T> for ChaoSampler<T, R> {
    type Sample = Vec<T>;

    fn fold(&mut self, item: T) -> Result<bool> {
        self.feed(item)
    }

    fn finish(self) -> Vec<T> {
        self.into_items()
    }
}

impl<T, R: Rng> WeightedCollector<T> for ChaoSampler<T, R> {
    fn fold_weighted(&mut self, item: T, weight: f64) -> Result<bool> {
        self.feed_weighted(item, weight)
    }
}

impl<T> Collector<T> for ConcurrentLiLSampler<T> {
    type Sample = Vec<T>;

    fn fold(&mut self, item: T) -> Result<bool> {
        self.feed(item)
    }

    fn finish(self) -> Vec<T> {
        self.into_items()
    }
}

/// Fold an entire sequence into a sampler and extract the sample.
pub fn collect_sample<I, C>(items: I, mut sampler: C) -> Result<C::Sample>
where
    I: IntoIterator,
    C: Collector<I::Item>,
{
    for item in items {
        sampler.fold(item)?;
    }
    Ok(sampler.finish())
}

/// Fold an entire sequence of `(item, weight)` pairs into a sampler and
/// extract the sample.
pub fn collect_weighted_sample<I, C, T>(pairs: I, mut sampler: C) -> Result<C::Sample>
where
    I: IntoIterator<Item = (T, f64)>,
    C: WeightedCollector<T>,
{
    for (item, weight) in pairs {
        sampler.fold_weighted(item, weight)?;
    }
    Ok(sampler.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EfraimidisSampler, WatermanSampler};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn collects_a_bounded_sample() {
        let sampler = WatermanSampler::with_rng(5, ChaCha8Rng::seed_from_u64(1)).unwrap();
        let sample = collect_sample(0..100, sampler).unwrap();
        assert_eq!(sample.len(), 5);
        assert!(sample.iter().all(|&i| i < 100));
    }

    #[test]
    fn collects_a_weighted_sample() {
        let sampler = EfraimidisSampler::with_rng(3, ChaCha8Rng::seed_from_u64(2)).unwrap();
        let pairs = (0..50).map(|i| (i, (i + 1) as f64));
        let sample = collect_weighted_sample(pairs, sampler).unwrap();
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn partial_samplers_cannot_be_combined() {
        let a = WatermanSampler::<u32>::new(3).unwrap();
        let b = WatermanSampler::<u32>::new(3).unwrap();
        assert_eq!(a.combine(b).err(), Some(SampleError::CannotCombine));
    }
}
