//! Thread-safe Li L reservoir sampling.
//!
//! A lock-free variant of the unweighted engine for multiple producers.
//! The reservoir is a fixed array of atomic reference slots; the fill
//! level, stream counter and pending skip are atomics; the generator's
//! `W` lives in an atomic bit pattern and is advanced with a
//! compare-exchange loop.
//!
//! Only Li's Algorithm L is offered here: its generator state between
//! two skips is a single scalar, which is what makes the protocol
//! sound. The other variants' generators carry coupled state and have
//! no thread-safe form.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use rand::Rng;

use crate::error::{Result, SampleError};
use crate::util::random_exclusive;

/// Li's Algorithm L skip generator over an atomic `W`.
#[derive(Debug)]
struct ConcurrentLiLSkip {
    sample_size_inverse: f64,
    w_bits: AtomicU64,
}

impl ConcurrentLiLSkip {
    fn create<R: Rng + ?Sized>(sample_size: usize, rng: &mut R) -> Self {
        let sample_size_inverse = 1.0 / sample_size as f64;
        let w = random_exclusive(rng).powf(sample_size_inverse);
        Self {
            sample_size_inverse,
            w_bits: AtomicU64::new(w.to_bits()),
        }
    }

    /// Same math as the single-threaded generator; the `W` update is
    /// serialized by the compare-exchange, so concurrent callers each
    /// consume a distinct `W`.
    fn next_skip<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64> {
        loop {
            let bits = self.w_bits.load(Ordering::Acquire);
            let w = f64::from_bits(bits);
            let r1 = random_exclusive(rng);
            let r2 = random_exclusive(rng);
            let skip = r1.ln() / (1.0 - w).ln();
            if !(skip >= 0.0 && skip <= u64::MAX as f64) {
                return Err(SampleError::StreamOverflow);
            }
            let next = w * r2.powf(self.sample_size_inverse);
            if self
                .w_bits
                .compare_exchange(bits, next.to_bits(), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(skip as u64);
            }
        }
    }
}

/// A thread-safe reservoir sampler using Li's Algorithm L.
///
/// Multiple producers may call [`feed`](Self::feed) concurrently; each
/// call is linearizable with respect to other feeds and concurrent
/// sample reads. Items are stored behind [`Arc`] so readers can hold
/// them without blocking writers.
///
/// # Example
///
/// ```rust
/// use tameike::ConcurrentLiLSampler;
///
/// let sampler = ConcurrentLiLSampler::new(10).unwrap();
/// std::thread::scope(|scope| {
///     for worker in 0..4 {
///         let sampler = &sampler;
///         scope.spawn(move || {
///             for i in 0..250 {
///                 sampler.feed(worker * 250 + i).unwrap();
///             }
///         });
///     }
/// });
/// assert_eq!(sampler.sample().len(), 10);
/// assert_eq!(sampler.stream_size(), 1_000);
/// ```
#[derive(Debug)]
pub struct ConcurrentLiLSampler<T> {
    sample_size: usize,
    slots: Box<[ArcSwapOption<T>]>,
    filled: AtomicUsize,
    stream_size: AtomicU64,
    skip: AtomicU64,
    generator: ConcurrentLiLSkip,
}

impl<T> ConcurrentLiLSampler<T> {
    /// Create a sampler that keeps `sample_size` items, using the
    /// thread-local source of randomness.
    pub fn new(sample_size: usize) -> Result<Self> {
        Self::with_rng(sample_size, &mut rand::rng())
    }

    /// Create a sampler that keeps `sample_size` items, drawing the
    /// initial generator state from a caller-supplied RNG.
    pub fn with_rng<R: Rng + ?Sized>(sample_size: usize, rng: &mut R) -> Result<Self> {
        if sample_size == 0 {
            return Err(SampleError::InvalidSampleSize(sample_size));
        }
        let generator = ConcurrentLiLSkip::create(sample_size, rng);
        // The first skip applies immediately after the reservoir fills.
        let skip = generator.next_skip(rng)?;
        Ok(Self {
            sample_size,
            slots: (0..sample_size).map(|_| ArcSwapOption::empty()).collect(),
            filled: AtomicUsize::new(0),
            stream_size: AtomicU64::new(0),
            skip: AtomicU64::new(skip),
            generator,
        })
    }

    /// Feed one item from the stream.
    ///
    /// Returns `true` iff the sample changed. Safe to call from many
    /// threads at once; the item is considered at the stream position
    /// assigned by its stream-counter increment.
    pub fn feed(&self, item: T) -> Result<bool> {
        self.feed_with_rng(item, &mut rand::rng())
    }

    /// Feed one item, drawing randomness from a caller-supplied RNG.
    pub fn feed_with_rng<R: Rng + ?Sized>(&self, item: T, rng: &mut R) -> Result<bool> {
        if self.stream_size.load(Ordering::Relaxed) == u64::MAX {
            return Err(SampleError::StreamOverflow);
        }
        self.stream_size.fetch_add(1, Ordering::AcqRel);

        let item = Arc::new(item);

        // Fill phase: claim the slot at the current fill level. A lost
        // race re-reads the level, which the winner bumps after its
        // store, so every thread converges on an empty slot or on the
        // steady state.
        let mut filled = self.filled.load(Ordering::Acquire);
        while filled < self.sample_size {
            let previous = self.slots[filled]
                .compare_and_swap(&None::<Arc<T>>, Some(Arc::clone(&item)));
            if previous.is_none() {
                self.filled.fetch_add(1, Ordering::AcqRel);
                return Ok(true);
            }
            filled = self.filled.load(Ordering::Acquire);
        }

        // Steady state: burn one unit of the pending skip, or accept
        // the item and install the next skip.
        loop {
            let pending = self.skip.load(Ordering::Acquire);
            if pending > 0 {
                if self
                    .skip
                    .compare_exchange(pending, pending - 1, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    return Ok(false);
                }
            } else {
                let next = self.generator.next_skip(rng)?;
                if self
                    .skip
                    .compare_exchange(0, next, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    let slot = rng.random_range(0..self.sample_size);
                    self.slots[slot].store(Some(item));
                    return Ok(true);
                }
            }
        }
    }

    /// Feed every item of a sequence.
    ///
    /// Returns `true` iff any item changed the sample.
    pub fn feed_many<I>(&self, items: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let mut rng = rand::rng();
        let mut changed = false;
        for item in items {
            changed |= self.feed_with_rng(item, &mut rng)?;
        }
        Ok(changed)
    }

    /// The current sample, as a live view over the atomic slots.
    ///
    /// Each slot read observes either its prior value or the value of a
    /// completed feed; the reported length may lag a concurrent fill by
    /// one increment.
    pub fn sample(&self) -> ConcurrentSample<'_, T> {
        ConcurrentSample {
            slots: &self.slots,
            filled: &self.filled,
        }
    }

    /// The configured sample size `k`.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Number of items fed since construction.
    pub fn stream_size(&self) -> u64 {
        self.stream_size.load(Ordering::Acquire)
    }

    /// Tear the sampler down into its sampled items.
    pub(crate) fn into_items(self) -> Vec<T> {
        self.slots
            .into_vec()
            .into_iter()
            .filter_map(|slot| slot.into_inner())
            // The sampler is owned, so each stored Arc is the last
            // reference standing.
            .filter_map(|arc| Arc::try_unwrap(arc).ok())
            .collect()
    }
}

/// Read-only live view over a [`ConcurrentLiLSampler`]'s reservoir.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentSample<'a, T> {
    slots: &'a [ArcSwapOption<T>],
    filled: &'a AtomicUsize,
}

impl<'a, T> ConcurrentSample<'a, T> {
    /// Number of items currently in the sample.
    pub fn len(&self) -> usize {
        self.filled.load(Ordering::Acquire)
    }

    /// Whether the sample is still empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the sampled items, reading each slot atomically.
    pub fn iter(&self) -> impl Iterator<Item = Arc<T>> + 'a {
        let slots = self.slots;
        let len = self.len();
        slots[..len].iter().filter_map(|slot| slot.load_full())
    }

    /// Copy the current contents out as a snapshot.
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_sample_size_is_rejected() {
        assert_eq!(
            ConcurrentLiLSampler::<u32>::new(0).err(),
            Some(SampleError::InvalidSampleSize(0))
        );
    }

    #[test]
    fn keeps_k_items_single_threaded() {
        let sampler = ConcurrentLiLSampler::new(5).unwrap();
        for i in 0..100 {
            sampler.feed(i).unwrap();
        }
        assert_eq!(sampler.sample().len(), 5);
        assert_eq!(sampler.stream_size(), 100);
        assert_eq!(sampler.sample_size(), 5);
    }

    #[test]
    fn short_streams_are_kept_whole() {
        let sampler = ConcurrentLiLSampler::new(10).unwrap();
        for i in 0..4 {
            sampler.feed(i).unwrap();
        }
        let mut sample: Vec<i32> = sampler.sample().iter().map(|arc| *arc).collect();
        sample.sort_unstable();
        assert_eq!(sample, vec![0, 1, 2, 3]);
    }

    #[test]
    fn seeded_feeding_is_deterministic() {
        let run = |seed: u64| -> Vec<u32> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sampler = ConcurrentLiLSampler::with_rng(8, &mut rng).unwrap();
            for i in 0..500 {
                sampler.feed_with_rng(i, &mut rng).unwrap();
            }
            let mut sample: Vec<u32> = sampler.sample().iter().map(|arc| *arc).collect();
            sample.sort_unstable();
            sample
        };
        assert_eq!(run(21), run(21));
    }

    #[test]
    fn concurrent_producers_fill_exactly_k_slots() {
        let sampler = ConcurrentLiLSampler::new(10).unwrap();
        std::thread::scope(|scope| {
            for worker in 0..8u64 {
                let sampler = &sampler;
                scope.spawn(move || {
                    for i in 0..1_250 {
                        sampler.feed(worker * 1_250 + i).unwrap();
                    }
                });
            }
        });
        assert_eq!(sampler.stream_size(), 10_000);
        let sample = sampler.sample().to_vec();
        assert_eq!(sample.len(), 10);
        for item in sample {
            assert!(*item < 10_000);
        }
    }

    #[test]
    fn distribution_uniform_single_threaded() {
        // Same chi-squared smoke test as the single-threaded engines.
        let n = 100;
        let k = 10;
        let trials = 10_000u64;
        let mut counts = vec![0u64; n];

        for t in 0..trials {
            let mut rng = ChaCha8Rng::seed_from_u64(t);
            let sampler = ConcurrentLiLSampler::with_rng(k, &mut rng).unwrap();
            for i in 0..n {
                sampler.feed_with_rng(i, &mut rng).unwrap();
            }
            for item in sampler.sample().iter() {
                counts[*item] += 1;
            }
        }

        let expected = trials as f64 * (k as f64 / n as f64);
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                (diff * diff) / expected
            })
            .sum();
        assert!(chi2 < 250.0, "chi2 too large (chi2={chi2:.2})");
    }

    #[test]
    fn distribution_uniform_under_concurrency() {
        // Each trial feeds 0..100 from 4 producers into one shared
        // sampler; per-element frequencies must still look uniform.
        let n = 100usize;
        let k = 10;
        let trials = 1_000;
        let mut counts = vec![0u64; n];

        for _ in 0..trials {
            let sampler = ConcurrentLiLSampler::new(k).unwrap();
            std::thread::scope(|scope| {
                for worker in 0..4 {
                    let sampler = &sampler;
                    scope.spawn(move || {
                        for i in 0..25 {
                            sampler.feed(worker * 25 + i).unwrap();
                        }
                    });
                }
            });
            assert_eq!(sampler.sample().len(), k);
            for item in sampler.sample().iter() {
                counts[*item] += 1;
            }
        }

        let expected = trials as f64 * (k as f64 / n as f64);
        let chi2: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                (diff * diff) / expected
            })
            .sum();
        assert!(chi2 < 250.0, "chi2 too large (chi2={chi2:.2}), counts={counts:?}");
    }

    #[test]
    fn sample_view_is_live() {
        let sampler = ConcurrentLiLSampler::new(3).unwrap();
        let view = sampler.sample();
        assert!(view.is_empty());
        sampler.feed(1).unwrap();
        sampler.feed(2).unwrap();
        assert_eq!(view.len(), 2);
    }
}
