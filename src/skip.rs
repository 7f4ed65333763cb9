//! Skip-count generators for the unweighted reservoir engine.
//!
//! A skip generator answers one question: after an item is accepted into
//! a full reservoir, how many stream items should be ignored before the
//! next acceptance? The first call returns the gap immediately after the
//! reservoir fills; subsequent calls return the gap between two
//! acceptances.
//!
//! Decoupling the acceptance decision from the per-item loop is what
//! reduces RNG draws from O(N) to O(k(1 + log(N/k))) for the Vitter and
//! Li variants.
//!
//! ## References
//!
//! - Knuth, TAoCP Vol. II: Algorithm R, credited to Alan Waterman.
//! - Vitter (1985): *Random Sampling with a Reservoir* (Algorithms X, Z).
//! - Li (1994): *Reservoir-sampling algorithms of time complexity
//!   O(n(1 + log(N/n)))* (Algorithm L).

use rand::Rng;

use crate::error::{Result, SampleError};
use crate::util::random_exclusive;

/// A stateful generator of skip counts for one reservoir sampler.
///
/// `create` is the factory half of the contract: a pure constructor from
/// the sample size and a source of randomness, allowing the reservoir
/// engine to be instantiated with any variant.
pub trait SkipGenerator {
    /// Build a generator for a reservoir of `sample_size` slots.
    fn create<R: Rng + ?Sized>(sample_size: usize, rng: &mut R) -> Self
    where
        Self: Sized;

    /// Produce the next skip count, advancing internal state.
    ///
    /// Fails with [`SampleError::StreamOverflow`] when the internal
    /// stream position or numeric state saturates.
    fn next_skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64>;
}

/// Waterman's Algorithm R, expressed as a skip generator.
///
/// One uniform draw per stream item: the per-item acceptance test
/// `u * t < k` is run until it succeeds and the accumulated failure
/// count is the skip.
#[derive(Debug, Clone)]
pub struct WatermanSkip {
    sample_size: u64,
    stream_size: u64,
}

impl SkipGenerator for WatermanSkip {
    fn create<R: Rng + ?Sized>(sample_size: usize, _rng: &mut R) -> Self {
        Self {
            sample_size: sample_size as u64,
            stream_size: sample_size as u64,
        }
    }

    fn next_skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        let mut count = 0u64;
        loop {
            self.stream_size = self
                .stream_size
                .checked_add(1)
                .ok_or(SampleError::StreamOverflow)?;
            let u: f64 = rng.random();
            if u * (self.stream_size as f64) < self.sample_size as f64 {
                return Ok(count);
            }
            count += 1;
        }
    }
}

/// Vitter's Algorithm X.
///
/// One uniform draw per acceptance. The running product `quot` equals
/// the probability of skipping at least the current number of items, so
/// the first position where `quot <= r` is the correct skip.
#[derive(Debug, Clone)]
pub struct VitterXSkip {
    sample_size: u64,
    stream_size: u64,
}

impl SkipGenerator for VitterXSkip {
    fn create<R: Rng + ?Sized>(sample_size: usize, _rng: &mut R) -> Self {
        Self {
            sample_size: sample_size as u64,
            stream_size: sample_size as u64,
        }
    }

    fn next_skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        let r: f64 = rng.random();
        let mut count = 0u64;

        self.stream_size = self
            .stream_size
            .checked_add(1)
            .ok_or(SampleError::StreamOverflow)?;
        let mut quot =
            (self.stream_size - self.sample_size) as f64 / self.stream_size as f64;
        while quot > r {
            count += 1;
            self.stream_size = self
                .stream_size
                .checked_add(1)
                .ok_or(SampleError::StreamOverflow)?;
            quot *= (self.stream_size - self.sample_size) as f64 / self.stream_size as f64;
        }

        Ok(count)
    }
}

/// Vitter's Algorithm Z.
///
/// Rejection sampling against an envelope derived from the running state
/// `W = U^(-1/k)`. The fast path accepts without evaluating the exact
/// density; the fallback evaluates a falling product and re-samples `W`.
#[derive(Debug, Clone)]
pub struct VitterZSkip {
    sample_size: u64,
    stream_size: u64,
    w: f64,
}

impl SkipGenerator for VitterZSkip {
    fn create<R: Rng + ?Sized>(sample_size: usize, rng: &mut R) -> Self {
        let k = sample_size as f64;
        Self {
            sample_size: sample_size as u64,
            stream_size: sample_size as u64,
            w: random_exclusive(rng).powf(-1.0 / k),
        }
    }

    fn next_skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        let k = self.sample_size as f64;
        let t = self.stream_size as f64;
        let term = t - k + 1.0;
        loop {
            let u = random_exclusive(rng);
            let x = t * (self.w - 1.0);
            let g = x as u64;
            let gf = g as f64;

            // Fast test: u <= h(g) / cg(x).
            let lhs = (((u * ((t + 1.0) / term).powi(2)) * (term + gf)) / (t + x))
                .powf(1.0 / k);
            let rhs = (((t + x) / (term + gf)) * term) / t;
            if lhs < rhs {
                self.w = rhs / lhs;
                return self.advance(g);
            }

            // Exact test: u <= f(g) / cg(x), via a falling product.
            let mut y = (((u * (t + 1.0)) / term) * (t + gf + 1.0)) / (t + x);
            let (mut denom, numer_lim) = if k < gf {
                (t, term + gf)
            } else {
                (t - k + gf, t + 1.0)
            };
            let mut numer = t + gf;
            while numer >= numer_lim {
                y = (y * numer) / denom;
                denom -= 1.0;
                numer -= 1.0;
            }

            self.w = random_exclusive(rng).powf(-1.0 / k);
            if y.powf(1.0 / k) <= (t + x) / t {
                return self.advance(g);
            }
        }
    }
}

impl VitterZSkip {
    /// Move the stream position past the skipped run and the accepted
    /// item.
    fn advance(&mut self, g: u64) -> Result<u64> {
        self.stream_size = self
            .stream_size
            .checked_add(g)
            .and_then(|t| t.checked_add(1))
            .ok_or(SampleError::StreamOverflow)?;
        Ok(g)
    }
}

/// Li's Algorithm L.
///
/// Two uniform draws per acceptance: the skip is the geometric-like
/// jump `log(r1) / log(1 - W)` and `W` shrinks by `r2^(1/k)` afterwards.
/// When `W` becomes so small that `1 - W` rounds to `1`, the jump is
/// unbounded and the generator reports overflow.
#[derive(Debug, Clone)]
pub struct LiLSkip {
    sample_size_inverse: f64,
    w: f64,
}

impl SkipGenerator for LiLSkip {
    fn create<R: Rng + ?Sized>(sample_size: usize, rng: &mut R) -> Self {
        let sample_size_inverse = 1.0 / sample_size as f64;
        Self {
            sample_size_inverse,
            w: random_exclusive(rng).powf(sample_size_inverse),
        }
    }

    fn next_skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u64> {
        let r1 = random_exclusive(rng);
        let r2 = random_exclusive(rng);
        let skip = r1.ln() / (1.0 - self.w).ln();
        if !(skip >= 0.0 && skip <= u64::MAX as f64) {
            return Err(SampleError::StreamOverflow);
        }
        self.w *= r2.powf(self.sample_size_inverse);
        Ok(skip as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn skips<S: SkipGenerator>(k: usize, n: usize, seed: u64) -> Vec<u64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut generator = S::create(k, &mut rng);
        (0..n)
            .map(|_| generator.next_skip(&mut rng).expect("skip ok"))
            .collect()
    }

    #[test]
    fn generators_are_deterministic_under_a_fixed_seed() {
        assert_eq!(skips::<WatermanSkip>(10, 50, 7), skips::<WatermanSkip>(10, 50, 7));
        assert_eq!(skips::<VitterXSkip>(10, 50, 7), skips::<VitterXSkip>(10, 50, 7));
        assert_eq!(skips::<VitterZSkip>(10, 50, 7), skips::<VitterZSkip>(10, 50, 7));
        assert_eq!(skips::<LiLSkip>(10, 50, 7), skips::<LiLSkip>(10, 50, 7));
    }

    #[test]
    fn skips_grow_with_the_stream_on_average() {
        // The expected gap between acceptances is roughly t/k, so late
        // skips should dwarf early ones. A loose sanity check on each
        // generator's drift, not a distribution test.
        fn drift<S: SkipGenerator>() -> (f64, f64) {
            let k = 5;
            let mut early = 0.0;
            let mut late = 0.0;
            for trial in 0..200 {
                let mut rng = ChaCha8Rng::seed_from_u64(trial);
                let mut generator = S::create(k, &mut rng);
                let mut first = 0.0;
                let mut last = 0.0;
                for call in 0..20 {
                    let s = generator.next_skip(&mut rng).expect("skip ok") as f64;
                    if call == 0 {
                        first = s;
                    }
                    last = s;
                }
                early += first;
                late += last;
            }
            (early, late)
        }

        let (early, late) = drift::<WatermanSkip>();
        assert!(late > early, "waterman: early={early}, late={late}");
        let (early, late) = drift::<VitterXSkip>();
        assert!(late > early, "vitter x: early={early}, late={late}");
        let (early, late) = drift::<VitterZSkip>();
        assert!(late > early, "vitter z: early={early}, late={late}");
        let (early, late) = drift::<LiLSkip>();
        assert!(late > early, "li l: early={early}, late={late}");
    }

    #[test]
    fn waterman_first_skip_is_often_zero_for_small_streams() {
        // Right after the reservoir fills, the next item is accepted with
        // probability k/(k+1), so most first skips are 0.
        let mut zeros = 0;
        for seed in 0..1_000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut generator = WatermanSkip::create(10, &mut rng);
            if generator.next_skip(&mut rng).expect("skip ok") == 0 {
                zeros += 1;
            }
        }
        assert!(zeros > 800, "zeros={zeros}");
    }
}
