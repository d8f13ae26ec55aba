#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Unique index sampling used to pick obstacle cells.
//!
//! The default rejection strategy draws candidates until enough distinct
//! values were collected. Its expected cost grows quadratically as the
//! requested count approaches the range length, which is acceptable for the
//! 225-cell grids this crate serves. [`SamplingStrategy::PartialShuffle`]
//! provides a linear alternative for dense requests.

use std::{collections::HashSet, ops::Range};

use rand::Rng;
use thiserror::Error;

/// Errors raised when a sample request cannot be satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SampleError {
    /// More distinct values were requested than the range contains.
    #[error("cannot draw {requested} distinct values from a range of {available}")]
    RangeTooSmall {
        /// Number of values requested.
        requested: usize,
        /// Number of values available in the range.
        available: usize,
    },
}

/// Algorithm used to draw distinct values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Draw, discard duplicates, repeat until the target count is reached.
    #[default]
    Rejection,
    /// Shuffle only the first `count` slots of the range.
    PartialShuffle,
}

/// Draws a required count of distinct values from a bounded range.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniqueSampler {
    strategy: SamplingStrategy,
}

impl UniqueSampler {
    /// Creates a sampler using the provided strategy.
    #[must_use]
    pub const fn new(strategy: SamplingStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy the sampler draws with.
    #[must_use]
    pub const fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Draws `count` distinct values from `range`.
    ///
    /// Values are returned in draw order; callers must not rely on any
    /// particular ordering. The caller clamps `count` beforehand: an
    /// over-large request is reported, not reinterpreted.
    pub fn sample<R>(
        &self,
        rng: &mut R,
        range: Range<usize>,
        count: usize,
    ) -> Result<Vec<usize>, SampleError>
    where
        R: Rng + ?Sized,
    {
        let available = range.len();
        if count > available {
            return Err(SampleError::RangeTooSmall {
                requested: count,
                available,
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        Ok(match self.strategy {
            SamplingStrategy::Rejection => draw_with_rejection(rng, range, count),
            SamplingStrategy::PartialShuffle => partial_shuffle(rng, range, count),
        })
    }
}

/// Draws `count` distinct values from `range` with the default strategy.
pub fn sample<R>(rng: &mut R, range: Range<usize>, count: usize) -> Result<Vec<usize>, SampleError>
where
    R: Rng + ?Sized,
{
    UniqueSampler::default().sample(rng, range, count)
}

fn draw_with_rejection<R>(rng: &mut R, range: Range<usize>, count: usize) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::with_capacity(count);
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        let candidate = rng.gen_range(range.clone());
        if seen.insert(candidate) {
            drawn.push(candidate);
        }
    }
    drawn
}

fn partial_shuffle<R>(rng: &mut R, range: Range<usize>, count: usize) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<usize> = range.collect();
    let length = pool.len();
    for index in 0..count {
        let swap_index = rng.gen_range(index..length);
        pool.swap(index, swap_index);
    }
    pool.truncate(count);
    pool
}
