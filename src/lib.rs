//! # tameike
//!
//! Reservoir sampling: bounded samples from streams of unknown length.
//!
//! (tameike: a small irrigation reservoir in Japanese)
//!
//! ## Modules
//!
//! - `reservoir`: Uniform sampling with pluggable skip generators
//! - `skip`: The skip-count generators (Waterman, Vitter X/Z, Li L)
//! - `order`: Weighted "order sampling" (Efraimidis–Spirakis A-Res,
//!   Sequential Poisson, Pareto)
//! - `chao`: Strictly proportional weighted sampling (Chao)
//! - `concurrent`: Lock-free multi-producer Li L
//! - `collector`: Fold-style adapter over any sampler
//!
//! ## Quick Start
//!
//! ```rust
//! use tameike::LiLSampler;
//!
//! let mut sampler = LiLSampler::<_>::new(5).unwrap();
//! for i in 0..100 {
//!     sampler.feed(i).unwrap();
//! }
//! assert_eq!(sampler.sample().len(), 5);
//! ```
//!
//! ## Research Context
//!
//! ### Uniform reservoir sampling
//!
//! - **Algorithm R** (Waterman, in Knuth TAoCP Vol. II): the $O(N)$
//!   baseline, one RNG draw per item.
//! - **Algorithms X and Z** (Vitter, 1985): skip-based variants; Z
//!   reaches $O(k(1 + \log(N/k)))$ RNG draws via rejection sampling.
//! - **Algorithm L** (Li, 1994): closed-form skips with the same bound
//!   and the simplest state, which is also what makes its lock-free
//!   variant possible.
//!
//! ### Weighted reservoir sampling
//!
//! - **Order sampling** (Rosén, 1997): give each item an independent
//!   key drawn from a weight-dependent distribution, keep the top $k$
//!   keys. A-Res (Efraimidis–Spirakis, 2006), Sequential Poisson
//!   (Ohlsson, 1998) and Pareto (Rosén, 1997) differ only in the key
//!   distribution.
//! - **Chao** (1982): strictly proportional inclusion probabilities
//!   $\min(1, k w_i / \sum w)$, maintained incrementally as the weight
//!   sum grows.
//!
//! All engines share the same surface: `feed` returns whether the
//! sample changed, `sample` is a cheap read-only view, `sample_size`
//! and `stream_size` report the configuration and progress. Samplers
//! are single-pass and hold $O(k)$ state; there is no reset.

pub mod chao;
pub mod collector;
pub mod concurrent;
pub mod error;
pub mod order;
pub mod reservoir;
pub mod skip;
pub mod util;
pub mod weighted;

pub use chao::ChaoSampler;
pub use collector::{collect_sample, collect_weighted_sample, Collector, WeightedCollector};
pub use concurrent::{ConcurrentLiLSampler, ConcurrentSample};
pub use error::{Result, SampleError};
pub use order::{
    EfraimidisKey, EfraimidisSampler, OrderKey, OrderSampler, ParetoKey, ParetoSampler,
    SequentialPoissonKey, SequentialPoissonSampler,
};
pub use reservoir::{
    LiLSampler, ReservoirSampler, VitterXSampler, VitterZSampler, WatermanSampler,
};
pub use skip::{LiLSkip, SkipGenerator, VitterXSkip, VitterZSkip, WatermanSkip};
pub use weighted::Weighted;
