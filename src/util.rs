//! Shared random-source helpers.

use rand::Rng;

/// Draw a uniform value in `(0,1)` exclusive.
///
/// Re-draws until the value is nonzero. Several algorithms compute
/// `log(u)` or `u^x` for non-integer `x` and cannot tolerate `u == 0`,
/// so they must route through this helper instead of the raw RNG.
pub fn random_exclusive<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut r = 0.0;
    while r == 0.0 {
        r = rng.random::<f64>();
    }
    debug_assert!(r > 0.0 && r < 1.0);
    r
}

/// Sample one index from a discrete probability distribution.
///
/// Returns the least index `i` such that the prefix sum of
/// `probabilities[..=i]` exceeds `u`, or `None` if `u` is not less than
/// the total sum. Each probability must be in `[0,1]` and the sum must
/// not exceed `1`; for performance reasons this is not checked.
///
/// Runs in time linear in the number of probabilities.
pub fn weighted_random_selection(probabilities: &[f64], u: f64) -> Option<usize> {
    let mut sum = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        sum += p;
        if u < sum {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn selection_picks_least_index_with_prefix_sum_above_u() {
        let probs = [0.5, 0.3];
        assert_eq!(weighted_random_selection(&probs, 0.0), Some(0));
        assert_eq!(weighted_random_selection(&probs, 0.4), Some(0));
        assert_eq!(weighted_random_selection(&probs, 0.5), Some(1));
        assert_eq!(weighted_random_selection(&probs, 0.7), Some(1));
        assert_eq!(weighted_random_selection(&probs, 0.9), None);
    }

    #[test]
    fn selection_on_empty_distribution_is_none() {
        assert_eq!(weighted_random_selection(&[], 0.0), None);
    }

    #[test]
    fn exclusive_draws_stay_in_open_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10_000 {
            let r = random_exclusive(&mut rng);
            assert!(r > 0.0 && r < 1.0);
        }
    }
}
