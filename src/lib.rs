use std::fmt;
use std::path::PathBuf;

use log::info;
use thiserror::Error;

pub mod config;
pub mod extremum;
pub mod fill;
pub mod generator;
pub mod matrix;
pub mod scoring;
pub mod sequence;
pub mod strategy;
pub mod traceback;
mod workers;

pub use crate::config::AlignerConfig;
pub use crate::extremum::{Extrema, ExtremumRecord};
pub use crate::generator::{generate_pair, GenerationReport};
pub use crate::matrix::ScoreMatrix;
pub use crate::scoring::{AlignmentStats, GapPenalty, Position, ScoreParams, WeightTable};
pub use crate::sequence::{Base, Sequence, SequencePair, Symbol};
pub use crate::strategy::{FillStrategy, StartCell};
pub use crate::traceback::{Alignment, EditOp, Traceback};

// Capacity and concurrency ceilings
pub const MAX_SEQUENCE_LEN: usize = 1000;
pub const MAX_WORKERS: usize = 20;

// Default DNA scoring parameters (identity table)
pub const DNA_MATCH: i32 = 1;
pub const DNA_MISMATCH: i32 = 0;
pub const DNA_GAP: i32 = 0;

/// Which of the two input sequences a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Major,
    Minor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Major => f.write_str("major"),
            Role::Minor => f.write_str("minor"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("invalid base {found:?} at position {position} of the {role} sequence")]
    InvalidBase {
        role: Role,
        position: usize,
        found: char,
    },
    #[error("the {0} sequence is empty")]
    EmptySequence(Role),
    #[error("the {role} sequence has {len} bases, the limit is {max}")]
    SequenceTooLong { role: Role, len: usize, max: usize },
    #[error("minor sequence ({minor}) is longer than the major sequence ({major})")]
    MinorLongerThanMajor { minor: usize, major: usize },
    #[error("no line for the {role} sequence in {path}")]
    MissingSequence { role: Role, path: PathBuf },
    #[error("invalid weight entry: {0}")]
    InvalidWeightEntry(String),
    #[error("gap penalty must be >= 0, got {0}")]
    NegativeGapPenalty(i32),
    #[error("mutation rate must be within 0..=100, got {0}")]
    InvalidMutationRate(u32),
    #[error("worker count must be within 1..={max}, got {requested}")]
    InvalidWorkerCount { requested: usize, max: usize },
    #[error("traceback count must be within 1..={max}, got {requested}")]
    InvalidTracebackCount { requested: usize, max: usize },
    #[error("scores of a {rows}x{cols} matrix can reach magnitude {bound}, beyond i32")]
    ScoreOverflow { rows: usize, cols: usize, bound: i64 },
    #[error("position {position} is outside the {role} sequence of length {len}")]
    PositionOutOfRange {
        role: Role,
        position: usize,
        len: usize,
    },
    #[error("start cell [{row},{col}] is outside [1..={rows}]x[1..={cols}]")]
    StartCellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("no sequences have been defined")]
    SequencesNotSet,
    #[error("the score matrix has not been filled")]
    MatrixNotFilled,
    #[error("worker failure: {0}")]
    WorkerError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlignerError>;

/// Filled matrix together with its extremum records.
#[derive(Debug, Clone)]
struct FilledMatrix {
    matrix: ScoreMatrix,
    extrema: Extrema,
}

/// Alignment session: sequences, scoring, and the last filled matrix.
///
/// Redefining the sequences or the scoring drops the stored matrix, so an
/// alignment is always reconstructed from a matrix that matches the current
/// inputs.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignerConfig,
    score_params: ScoreParams,
    pair: Option<SequencePair>,
    filled: Option<FilledMatrix>,
}

impl Aligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_score_params(mut self, params: ScoreParams) -> Self {
        self.score_params = params;
        self
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    pub fn score_params(&self) -> &ScoreParams {
        &self.score_params
    }

    pub fn sequences(&self) -> Option<&SequencePair> {
        self.pair.as_ref()
    }

    /// Replaces the configuration. The stored pair must fit the new
    /// capacity; the filled matrix is dropped.
    pub fn set_config(&mut self, config: AlignerConfig) -> Result<()> {
        if let Some(pair) = &self.pair {
            pair.check_capacity(config.max_sequence_len())?;
        }
        self.config = config;
        self.filled = None;
        Ok(())
    }

    pub fn set_sequences(&mut self, pair: SequencePair) -> Result<()> {
        pair.check_capacity(self.config.max_sequence_len())?;
        self.pair = Some(pair);
        self.filled = None;
        Ok(())
    }

    pub fn set_weights(&mut self, weights: WeightTable) {
        self.score_params.weights = weights;
        self.filled = None;
    }

    pub fn set_gap_penalty(&mut self, gap: GapPenalty) {
        self.score_params.gap = gap;
        self.filled = None;
    }

    /// Fills the score matrix for the current sequences and locates its
    /// first and last maximal cells.
    pub fn fill_matrix(&mut self) -> Result<&ScoreMatrix> {
        let pair = self.pair.as_ref().ok_or(AlignerError::SequencesNotSet)?;
        let matrix = fill::fill(pair, &self.score_params, &self.config)?;
        let extrema = extremum::locate(&matrix)?;

        info!(
            "first max {} at [{},{}], last max {} at [{},{}]",
            extrema.first.score,
            extrema.first.position.row,
            extrema.first.position.col,
            extrema.last.score,
            extrema.last.position.row,
            extrema.last.position.col,
        );

        let filled = self.filled.insert(FilledMatrix { matrix, extrema });
        Ok(&filled.matrix)
    }

    pub fn matrix(&self) -> Option<&ScoreMatrix> {
        self.filled.as_ref().map(|f| &f.matrix)
    }

    pub fn extrema(&self) -> Option<&Extrema> {
        self.filled.as_ref().map(|f| &f.extrema)
    }

    pub fn start_position(&self, start: StartCell) -> Result<Position> {
        let extrema = self.extrema().ok_or(AlignerError::MatrixNotFilled)?;
        Ok(start.select(extrema).position)
    }

    fn traceback(&self) -> Result<Traceback<'_>> {
        let pair = self.pair.as_ref().ok_or(AlignerError::SequencesNotSet)?;
        let filled = self.filled.as_ref().ok_or(AlignerError::MatrixNotFilled)?;
        Ok(Traceback::new(&filled.matrix, pair, &self.score_params))
    }

    pub fn align(&self, start: StartCell) -> Result<Alignment> {
        let position = self.start_position(start)?;
        self.traceback()?.reconstruct(position)
    }

    pub fn align_from(&self, position: Position) -> Result<Alignment> {
        self.traceback()?.reconstruct(position)
    }

    /// Runs the configured number of concurrent tracebacks from the same
    /// start cell. The policy is deterministic, so every result is equal.
    pub fn align_many(&self, start: StartCell) -> Result<Vec<Alignment>> {
        let position = self.start_position(start)?;
        self.traceback()?
            .reconstruct_many(position, self.config.tracebacks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_pair() -> SequencePair {
        SequencePair::parse("AACTTA", "ACTTGA", MAX_SEQUENCE_LEN).unwrap()
    }

    #[test]
    fn test_align_requires_fill() {
        let mut aligner = Aligner::default();
        assert!(matches!(
            aligner.align(StartCell::FirstMax),
            Err(AlignerError::MatrixNotFilled)
        ));
        assert!(matches!(
            aligner.fill_matrix(),
            Err(AlignerError::SequencesNotSet)
        ));

        aligner.set_sequences(classic_pair()).unwrap();
        aligner.fill_matrix().unwrap();
        assert!(aligner.align(StartCell::LastMax).is_ok());
    }

    #[test]
    fn test_redefinition_invalidates_matrix() {
        let mut aligner = Aligner::default();
        aligner.set_sequences(classic_pair()).unwrap();
        aligner.fill_matrix().unwrap();
        assert!(aligner.matrix().is_some());

        aligner.set_gap_penalty(GapPenalty::new(2).unwrap());
        assert!(aligner.matrix().is_none());
        assert!(aligner.extrema().is_none());

        aligner.fill_matrix().unwrap();
        aligner.set_weights(WeightTable::uniform(2, -1));
        assert!(aligner.matrix().is_none());
    }

    #[test]
    fn test_capacity_checked_on_set() {
        let config = AlignerConfig::default().with_max_sequence_len(4);
        let mut aligner = Aligner::new(config);
        let result = aligner.set_sequences(classic_pair());
        assert!(matches!(
            result,
            Err(AlignerError::SequenceTooLong { role: Role::Major, len: 6, max: 4 })
        ));
    }

    #[test]
    fn test_set_config_rechecks_stored_pair() {
        let mut aligner = Aligner::default();
        aligner.set_sequences(classic_pair()).unwrap();
        aligner.fill_matrix().unwrap();

        let narrow = AlignerConfig::default().with_max_sequence_len(5);
        assert!(matches!(
            aligner.set_config(narrow),
            Err(AlignerError::SequenceTooLong { role: Role::Major, len: 6, max: 5 })
        ));
        assert_eq!(aligner.config().max_sequence_len(), MAX_SEQUENCE_LEN);
        assert!(aligner.matrix().is_some());

        let pipeline = AlignerConfig::default()
            .with_strategy(FillStrategy::Pipeline)
            .with_workers(3)
            .unwrap();
        aligner.set_config(pipeline).unwrap();
        assert!(aligner.matrix().is_none());
        assert_eq!(aligner.config().workers(), 3);
        aligner.fill_matrix().unwrap();
        assert_eq!(aligner.extrema().unwrap().first.score, 5);
    }

    #[test]
    fn test_align_many_returns_configured_count() {
        let config = AlignerConfig::default()
            .with_workers(3)
            .unwrap()
            .with_tracebacks(4)
            .unwrap();
        let mut aligner = Aligner::new(config);
        aligner.set_sequences(classic_pair()).unwrap();
        aligner.fill_matrix().unwrap();

        let alignments = aligner.align_many(StartCell::FirstMax).unwrap();
        assert_eq!(alignments.len(), 4);
        assert!(alignments.windows(2).all(|w| w[0] == w[1]));
    }
}
