//! Score matrix construction.
//!
//! Every strategy runs the same row kernel: row `i` reads only row `i - 1`
//! and the cells to its left in row `i`, so columns are computed strictly
//! left to right and a row may start as soon as its predecessor is final.
//! Strategies differ only in which thread computes which row; the resulting
//! matrices are identical.

use std::time::Instant;

use log::{debug, info};

use crate::config::{check_worker_count, AlignerConfig};
use crate::matrix::ScoreMatrix;
use crate::scoring::ScoreParams;
use crate::sequence::{Base, SequencePair};
use crate::strategy::FillStrategy;
use crate::{workers, AlignerError, Result, Role};

/// Recurrence over one row of the matrix.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowKernel<'a> {
    minor: &'a [Base],
    major: &'a [Base],
    params: &'a ScoreParams,
}

impl<'a> RowKernel<'a> {
    pub(crate) fn new(pair: &'a SequencePair, params: &'a ScoreParams) -> Self {
        Self {
            minor: pair.minor().bases(),
            major: pair.major().bases(),
            params,
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.minor.len() + 1
    }

    pub(crate) fn cols(&self) -> usize {
        self.major.len() + 1
    }

    pub(crate) fn border_row(&self) -> Vec<i32> {
        (0..self.cols()).map(|col| self.params.border(col)).collect()
    }

    /// Computes row `row` (>= 1) into `cur` from the finished row `prev`.
    #[inline]
    pub(crate) fn compute_row(&self, row: usize, prev: &[i32], cur: &mut [i32]) {
        let minor = self.minor[row - 1];
        cur[0] = self.params.border(row);
        for col in 1..cur.len() {
            let candidates = self.params.candidates(
                prev[col - 1],
                cur[col - 1],
                prev[col],
                minor,
                self.major[col - 1],
            );
            cur[col] = candidates.best();
        }
    }
}

/// Fills the matrix with the strategy and worker count from `config`.
pub fn fill(
    pair: &SequencePair,
    params: &ScoreParams,
    config: &AlignerConfig,
) -> Result<ScoreMatrix> {
    fill_with(pair, params, config.strategy(), config.workers())
}

pub fn fill_with(
    pair: &SequencePair,
    params: &ScoreParams,
    strategy: FillStrategy,
    workers: usize,
) -> Result<ScoreMatrix> {
    check_worker_count(workers)?;
    if pair.major().is_empty() {
        return Err(AlignerError::EmptySequence(Role::Major));
    }
    if pair.minor().is_empty() {
        return Err(AlignerError::EmptySequence(Role::Minor));
    }
    check_score_range(pair, params)?;

    let kernel = RowKernel::new(pair, params);
    info!(
        "filling {}x{} score matrix ({} strategy, {} workers, gap {})",
        kernel.rows(),
        kernel.cols(),
        strategy,
        workers,
        params.gap
    );

    let start = Instant::now();
    let matrix = match strategy {
        FillStrategy::Sequential => fill_sequential(&kernel, params),
        FillStrategy::RowClaim => workers::fill_row_claim(&kernel, params, workers)?,
        FillStrategy::Pipeline => workers::fill_pipeline(&kernel, params, workers)?,
    };
    debug!("score matrix filled in {:?}", start.elapsed());

    Ok(matrix)
}

/// Every cell `[i,j]` lies within `(i + j) * step` of zero, where `step` is
/// the largest weight or gap magnitude. Rejects inputs where that bound
/// leaves the `i32` range.
fn check_score_range(pair: &SequencePair, params: &ScoreParams) -> Result<()> {
    let rows = pair.minor().len() + 1;
    let cols = pair.major().len() + 1;
    let steps = i64::try_from(rows + cols - 2).unwrap_or(i64::MAX);
    let bound = steps.saturating_mul(params.step_magnitude());
    if bound > i64::from(i32::MAX) {
        return Err(AlignerError::ScoreOverflow { rows, cols, bound });
    }
    Ok(())
}

fn fill_sequential(kernel: &RowKernel<'_>, params: &ScoreParams) -> ScoreMatrix {
    let mut matrix = ScoreMatrix::with_borders(kernel.rows(), kernel.cols(), params);
    for row in 1..kernel.rows() {
        let (prev, cur) = matrix.row_pair_mut(row);
        kernel.compute_row(row, prev, cur);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{GapPenalty, WeightTable};
    use crate::{MAX_SEQUENCE_LEN, MAX_WORKERS};

    fn classic_pair() -> SequencePair {
        SequencePair::parse("AACTTA", "ACTTGA", MAX_SEQUENCE_LEN).unwrap()
    }

    #[test]
    fn test_classic_matrix() {
        let params = ScoreParams::default();
        let matrix = fill_with(&classic_pair(), &params, FillStrategy::Sequential, 1).unwrap();
        let expected: [[i32; 7]; 7] = [
            [0, 0, 0, 0, 0, 0, 0],
            [0, 1, 1, 1, 1, 1, 1],
            [0, 1, 1, 2, 2, 2, 2],
            [0, 1, 1, 2, 3, 3, 3],
            [0, 1, 1, 2, 3, 4, 4],
            [0, 1, 1, 2, 3, 4, 4],
            [0, 1, 2, 2, 3, 4, 5],
        ];
        for (row, values) in expected.iter().enumerate() {
            assert_eq!(matrix.row(row), values, "row {row}");
        }
    }

    #[test]
    fn test_gap_and_mismatch_matrix() {
        let pair = SequencePair::parse("AGT", "AT", MAX_SEQUENCE_LEN).unwrap();
        let params = ScoreParams::new(WeightTable::uniform(2, -1), GapPenalty::new(2).unwrap());
        let matrix = fill_with(&pair, &params, FillStrategy::Sequential, 1).unwrap();
        assert_eq!(matrix.row(0), &[0, -2, -4, -6]);
        assert_eq!(matrix.row(1), &[-2, 2, 0, -2]);
        assert_eq!(matrix.row(2), &[-4, 0, 1, 2]);
    }

    #[test]
    fn test_strategies_agree() {
        let pair = SequencePair::parse("GATTACAGATTACACCGT", "GCATGCATTACG", MAX_SEQUENCE_LEN)
            .unwrap();
        let params = ScoreParams::new(WeightTable::uniform(2, -1), GapPenalty::new(1).unwrap());
        let reference = fill_with(&pair, &params, FillStrategy::Sequential, 1).unwrap();

        for strategy in FillStrategy::ALL {
            for workers in [1, 2, 3, 7, MAX_WORKERS] {
                let matrix = fill_with(&pair, &params, strategy, workers).unwrap();
                assert_eq!(matrix, reference, "{strategy} with {workers} workers");
            }
        }
    }

    #[test]
    fn test_rejects_worker_count() {
        let pair = classic_pair();
        let params = ScoreParams::default();
        assert!(matches!(
            fill_with(&pair, &params, FillStrategy::RowClaim, 0),
            Err(AlignerError::InvalidWorkerCount { .. })
        ));
        assert!(matches!(
            fill_with(&pair, &params, FillStrategy::Pipeline, MAX_WORKERS + 1),
            Err(AlignerError::InvalidWorkerCount { .. })
        ));
    }

    #[test]
    fn test_rejects_scores_beyond_i32() {
        let long = "A".repeat(MAX_SEQUENCE_LEN);
        let pair = SequencePair::parse(&long, &long, MAX_SEQUENCE_LEN).unwrap();
        let params = ScoreParams::new(WeightTable::default(), GapPenalty::new(5_000_000).unwrap());
        for strategy in FillStrategy::ALL {
            assert!(matches!(
                fill_with(&pair, &params, strategy, 4),
                Err(AlignerError::ScoreOverflow { rows: 1001, cols: 1001, .. })
            ));
        }

        let pair = SequencePair::parse("AAA", "AAA", MAX_SEQUENCE_LEN).unwrap();
        let weights = WeightTable::uniform(i32::MAX / 2, 0);
        let params = ScoreParams::new(weights, GapPenalty::default());
        for strategy in FillStrategy::ALL {
            assert!(matches!(
                fill_with(&pair, &params, strategy, 2),
                Err(AlignerError::ScoreOverflow { bound, .. })
                    if bound == 6 * i64::from(i32::MAX / 2)
            ));
        }
    }

    #[test]
    fn test_accepts_scores_at_i32_limit() {
        let pair = SequencePair::parse("A", "A", MAX_SEQUENCE_LEN).unwrap();
        let weights = WeightTable::uniform(i32::MAX / 2, 0);
        let params = ScoreParams::new(weights, GapPenalty::default());
        let matrix = fill_with(&pair, &params, FillStrategy::RowClaim, 1).unwrap();
        assert_eq!(matrix.get(1, 1), i32::MAX / 2);

        let weights = WeightTable::uniform(-(i32::MAX / 2), 0);
        let params = ScoreParams::new(weights, GapPenalty::default());
        let matrix = fill_with(&pair, &params, FillStrategy::Pipeline, 1).unwrap();
        assert_eq!(matrix.get(1, 1), 0);
    }
}
