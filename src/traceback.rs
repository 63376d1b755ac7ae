use std::fmt;
use std::thread;

use log::{debug, warn};

use crate::matrix::ScoreMatrix;
use crate::scoring::{AlignmentStats, Move, Position, ScoreParams};
use crate::sequence::{Base, SequencePair, Symbol};
use crate::{AlignerError, Result, MAX_WORKERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Match,
    Mismatch,
    Insertion, // major base against a gap
    Deletion,  // minor base against a gap
}

impl EditOp {
    pub fn classify(major: Symbol, minor: Symbol) -> Option<EditOp> {
        match (major, minor) {
            (Symbol::Base(a), Symbol::Base(b)) if a == b => Some(EditOp::Match),
            (Symbol::Base(_), Symbol::Base(_)) => Some(EditOp::Mismatch),
            (Symbol::Base(_), Symbol::Gap) => Some(EditOp::Insertion),
            (Symbol::Gap, Symbol::Base(_)) => Some(EditOp::Deletion),
            (Symbol::Gap, Symbol::Gap) => None,
        }
    }
}

/// A global alignment: two equal-length rows of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    major: Vec<Symbol>,
    minor: Vec<Symbol>,
    start: Position,
    anomalies: u32,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.major.len()
    }

    pub fn is_empty(&self) -> bool {
        self.major.is_empty()
    }

    pub fn major(&self) -> &[Symbol] {
        &self.major
    }

    pub fn minor(&self) -> &[Symbol] {
        &self.minor
    }

    /// Cell the traceback started from.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Number of diagonal steps that were split into two gap columns.
    pub fn anomalies(&self) -> u32 {
        self.anomalies
    }

    pub fn columns(&self) -> impl Iterator<Item = (Symbol, Symbol)> + '_ {
        self.major.iter().copied().zip(self.minor.iter().copied())
    }

    pub fn operations(&self) -> Vec<EditOp> {
        self.columns()
            .filter_map(|(major, minor)| EditOp::classify(major, minor))
            .collect()
    }

    pub fn major_string(&self) -> String {
        self.major.iter().map(|s| s.to_char()).collect()
    }

    pub fn minor_string(&self) -> String {
        self.minor.iter().map(|s| s.to_char()).collect()
    }

    /// Same columns in the opposite order.
    pub fn reversed(&self) -> Alignment {
        let mut reversed = self.clone();
        reversed.major.reverse();
        reversed.minor.reverse();
        reversed
    }

    /// Counts columns by kind and rescores them with `params`: paired
    /// columns add their weight, gap columns subtract the gap penalty.
    pub fn stats(&self, params: &ScoreParams) -> AlignmentStats {
        let mut stats = AlignmentStats {
            anomalies: self.anomalies,
            ..AlignmentStats::default()
        };
        for (major, minor) in self.columns() {
            match (major, minor) {
                (Symbol::Base(a), Symbol::Base(b)) => {
                    if a == b {
                        stats.matches += 1;
                    } else {
                        stats.mismatches += 1;
                    }
                    stats.score += params.weights.weight(b, a);
                }
                (Symbol::Gap, Symbol::Gap) => {}
                _ => {
                    stats.gaps += 1;
                    stats.score -= params.gap.value();
                }
            }
        }
        stats
    }

    pub fn score(&self, params: &ScoreParams) -> i32 {
        self.stats(params).score
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alignment, len = {}:", self.len())?;
        writeln!(f, "{}", self.major_string())?;
        writeln!(f, "{}", self.minor_string())
    }
}

/// Columns emitted while walking back, last column first.
#[derive(Default)]
struct ColumnBuffer {
    major: Vec<Symbol>,
    minor: Vec<Symbol>,
}

impl ColumnBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            major: Vec::with_capacity(capacity),
            minor: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, major: Symbol, minor: Symbol) {
        self.major.push(major);
        self.minor.push(minor);
    }

    fn len(&self) -> usize {
        self.major.len()
    }

    fn finish(mut self, start: Position, anomalies: u32) -> Alignment {
        self.major.reverse();
        self.minor.reverse();
        Alignment {
            major: self.major,
            minor: self.minor,
            start,
            anomalies,
        }
    }
}

/// Reconstructs alignments from a filled, read-only score matrix.
#[derive(Debug, Clone, Copy)]
pub struct Traceback<'a> {
    matrix: &'a ScoreMatrix,
    pair: &'a SequencePair,
    params: &'a ScoreParams,
}

impl<'a> Traceback<'a> {
    pub fn new(matrix: &'a ScoreMatrix, pair: &'a SequencePair, params: &'a ScoreParams) -> Self {
        Self {
            matrix,
            pair,
            params,
        }
    }

    fn check_start(&self, start: Position) -> Result<()> {
        let minor_len = self.pair.minor().len();
        let major_len = self.pair.major().len();
        if self.matrix.rows() != minor_len + 1 || self.matrix.cols() != major_len + 1 {
            return Err(AlignerError::MatrixNotFilled);
        }
        if !(1..=minor_len).contains(&start.row) || !(1..=major_len).contains(&start.col) {
            return Err(AlignerError::StartCellOutOfBounds {
                row: start.row,
                col: start.col,
                rows: minor_len,
                cols: major_len,
            });
        }
        Ok(())
    }

    /// Walks from `start` back to `[0,0]`.
    ///
    /// Each step recomputes the three candidates of the fill recurrence. A
    /// diagonal that is strictly greater than both gaps pairs the two bases;
    /// if those bases differ, the step is split into a major-only column and
    /// a minor-only column instead. Otherwise left beats up on a tie. Once
    /// the walk reaches row 0 or column 0 the remaining bases are drained
    /// against gaps.
    pub fn reconstruct(&self, start: Position) -> Result<Alignment> {
        self.check_start(start)?;

        let minor = self.pair.minor().bases();
        let major = self.pair.major().bases();
        let matrix = self.matrix;

        let mut columns = ColumnBuffer::with_capacity(start.row + start.col);
        let mut anomalies = 0;
        let (mut i, mut j) = (start.row, start.col);

        loop {
            let (minor_base, major_base) = (minor[i - 1], major[j - 1]);
            let candidates = self.params.candidates(
                matrix.get(i - 1, j - 1),
                matrix.get(i, j - 1),
                matrix.get(i - 1, j),
                minor_base,
                major_base,
            );

            match candidates.traceback_move() {
                Move::Diagonal if minor_base == major_base => {
                    columns.push(major_base.into(), minor_base.into());
                    i -= 1;
                    j -= 1;
                }
                Move::Diagonal => {
                    warn!(
                        "traceback: diagonal at [{i},{j}] (pos {}) pairs {} with {}, split",
                        columns.len(),
                        minor_base,
                        major_base
                    );
                    columns.push(major_base.into(), Symbol::Gap);
                    j -= 1;
                    columns.push(Symbol::Gap, minor_base.into());
                    i -= 1;
                    anomalies += 1;
                }
                Move::Left => {
                    columns.push(major_base.into(), Symbol::Gap);
                    j -= 1;
                }
                Move::Up => {
                    columns.push(Symbol::Gap, minor_base.into());
                    i -= 1;
                }
            }

            if i == 0 || j == 0 {
                break;
            }
        }

        drain(&mut columns, minor, major, i, j);
        Ok(columns.finish(start, anomalies))
    }

    /// Runs `count` independent tracebacks from the same cell, one thread
    /// each. The walk is deterministic, so all results are identical.
    pub fn reconstruct_many(&self, start: Position, count: usize) -> Result<Vec<Alignment>> {
        if count == 0 || count > MAX_WORKERS {
            return Err(AlignerError::InvalidTracebackCount {
                requested: count,
                max: MAX_WORKERS,
            });
        }
        self.check_start(start)?;
        debug!("running {count} tracebacks from {start}");

        thread::scope(|s| {
            let handles: Vec<_> = (0..count)
                .map(|_| s.spawn(move || self.reconstruct(start)))
                .collect();
            let outcomes: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

            outcomes
                .into_iter()
                .enumerate()
                .map(|(worker, outcome)| {
                    outcome.map_err(|_| {
                        AlignerError::WorkerError(format!("traceback worker {worker} panicked"))
                    })?
                })
                .collect()
        })
    }
}

fn drain(columns: &mut ColumnBuffer, minor: &[Base], major: &[Base], mut i: usize, mut j: usize) {
    while i > 0 {
        columns.push(Symbol::Gap, minor[i - 1].into());
        i -= 1;
    }
    while j > 0 {
        columns.push(major[j - 1].into(), Symbol::Gap);
        j -= 1;
    }
}
