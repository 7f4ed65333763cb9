//! Error types shared by all sampling engines.

use thiserror::Error;

/// The error type for sampler construction and feeding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    /// The requested sample size was zero.
    #[error("sample size must be at least 1 (got {0})")]
    InvalidSampleSize(usize),

    /// A weight was outside the range accepted by the algorithm.
    #[error("invalid weight {weight}, allowed range is {range}")]
    IllegalWeight {
        /// The offending weight.
        weight: f64,
        /// The algorithm's accepted range, in interval notation.
        range: &'static str,
    },

    /// Paired item/weight iterators disagreed in length.
    #[error("items and weights differ in length")]
    MismatchedLengths,

    /// An internal counter or accumulator has saturated.
    ///
    /// This error is fatal for the sampler instance: its state is no
    /// longer meaningful and further calls have unspecified results.
    #[error("stream counter or weight accumulator has overflown")]
    StreamOverflow,

    /// Two partial samplers cannot be combined into one.
    #[error("combining two partial samplers is not a meaningful reduction")]
    CannotCombine,
}

/// A specialized `Result` type for sampling operations.
pub type Result<T> = std::result::Result<T, SampleError>;
