//! Weighted vocabulary sampling: A-Res vs Sequential Poisson.
//!
//! Both are order-sampling schemes (assign each word a random key from
//! a weight-dependent distribution, keep the top-k keys) but the key
//! distributions differ, so their inclusion-probability profiles do too.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tameike::{EfraimidisSampler, SequentialPoissonSampler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vocabulary: [(&str, f64); 6] = [
        ("collection", 1.0),
        ("algorithms", 2.0),
        ("rust", 2.0),
        ("random", 3.0),
        ("sampling", 4.0),
        ("reservoir", 5.0),
    ];

    let k = 2usize;

    let mut a_res = EfraimidisSampler::with_rng(k, ChaCha8Rng::seed_from_u64(7))?;
    let mut poisson = SequentialPoissonSampler::with_rng(k, ChaCha8Rng::seed_from_u64(7))?;
    for (word, weight) in vocabulary {
        a_res.feed_weighted(word, weight)?;
        poisson.feed_weighted(word, weight)?;
    }

    println!("vocabulary:");
    for (word, weight) in vocabulary {
        println!("  {word:<12} w={weight}");
    }
    println!();

    let picked: Vec<&str> = a_res.sample().copied().collect();
    println!("a-res (Efraimidis-Spirakis) picks:  {picked:?}");
    let picked: Vec<&str> = poisson.sample().copied().collect();
    println!("sequential poisson picks:           {picked:?}");

    // Inclusion frequencies over many runs track the weights for both
    // schemes, which is the property a single draw cannot show.
    let trials = 10_000u64;
    let mut counts = vec![0u64; vocabulary.len()];
    for t in 0..trials {
        let mut sampler = EfraimidisSampler::with_rng(k, ChaCha8Rng::seed_from_u64(t))?;
        for (word, weight) in vocabulary {
            sampler.feed_weighted(word, weight)?;
        }
        for &word in sampler.sample() {
            let slot = vocabulary.iter().position(|&(v, _)| v == word).unwrap();
            counts[slot] += 1;
        }
    }

    println!();
    println!("a-res inclusion frequency over {trials} runs:");
    for ((word, weight), count) in vocabulary.iter().zip(&counts) {
        println!(
            "  {word:<12} w={weight}  {:.3}",
            *count as f64 / trials as f64
        );
    }

    Ok(())
}
