use std::fmt;

use crate::sequence::Base;
use crate::{AlignerError, Result, DNA_GAP, DNA_MATCH, DNA_MISMATCH};

/// Matrix cell coordinates: `row` indexes the minor sequence, `col` the major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row, self.col)
    }
}

/// 4x4 substitution scores indexed by (minor base, major base).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightTable {
    weights: [[i32; 4]; 4],
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::uniform(DNA_MATCH, DNA_MISMATCH)
    }
}

impl WeightTable {
    pub fn new(weights: [[i32; 4]; 4]) -> Self {
        Self { weights }
    }

    /// Same score on the diagonal, another everywhere else.
    pub fn uniform(match_score: i32, mismatch_score: i32) -> Self {
        let mut weights = [[mismatch_score; 4]; 4];
        for (i, row) in weights.iter_mut().enumerate() {
            row[i] = match_score;
        }
        Self { weights }
    }

    /// Parses 16 integers separated by whitespace or commas, row-major with
    /// the minor base as the row.
    pub fn parse(text: &str) -> Result<Self> {
        let values = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<i32>().map_err(|_| {
                    AlignerError::InvalidWeightEntry(format!("'{token}' is not an integer"))
                })
            })
            .collect::<Result<Vec<i32>>>()?;

        if values.len() != 16 {
            return Err(AlignerError::InvalidWeightEntry(format!(
                "expected 16 values, got {}",
                values.len()
            )));
        }

        let mut weights = [[0; 4]; 4];
        for (i, value) in values.into_iter().enumerate() {
            weights[i / 4][i % 4] = value;
        }
        Ok(Self { weights })
    }

    #[inline]
    pub fn weight(&self, minor: Base, major: Base) -> i32 {
        self.weights[minor.index()][major.index()]
    }

    pub fn set(&mut self, minor: Base, major: Base, value: i32) {
        self.weights[minor.index()][major.index()] = value;
    }

    pub fn is_symmetric(&self) -> bool {
        (0..4).all(|i| (0..4).all(|j| self.weights[i][j] == self.weights[j][i]))
    }

    /// Largest absolute value in the table.
    pub fn max_magnitude(&self) -> i64 {
        self.weights
            .iter()
            .flatten()
            .map(|w| i64::from(w.unsigned_abs()))
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}", ' ')?;
        for base in Base::ALL {
            write!(f, "{:>4}", base.to_char())?;
        }
        writeln!(f)?;
        for minor in Base::ALL {
            write!(f, "{:>4}", minor.to_char())?;
            for major in Base::ALL {
                write!(f, "{:>4}", self.weight(minor, major))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Non-negative penalty subtracted for every gap column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapPenalty(i32);

impl GapPenalty {
    pub fn new(value: i32) -> Result<Self> {
        if value < 0 {
            return Err(AlignerError::NegativeGapPenalty(value));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for GapPenalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreParams {
    pub weights: WeightTable,
    pub gap: GapPenalty,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            weights: WeightTable::default(),
            gap: GapPenalty(DNA_GAP),
        }
    }
}

impl ScoreParams {
    pub fn new(weights: WeightTable, gap: GapPenalty) -> Self {
        Self { weights, gap }
    }

    /// Border value of row 0 / column 0 at distance `k` from the origin.
    #[inline]
    pub fn border(&self, k: usize) -> i32 {
        -(k as i32) * self.gap.value()
    }

    /// Largest amount a single alignment column can move a score by.
    pub fn step_magnitude(&self) -> i64 {
        self.weights
            .max_magnitude()
            .max(i64::from(self.gap.value()))
    }

    /// The three predecessor scores of a cell.
    #[inline]
    pub(crate) fn candidates(
        &self,
        diagonal: i32,
        left: i32,
        up: i32,
        minor: Base,
        major: Base,
    ) -> Candidates {
        let gap = self.gap.value();
        Candidates {
            diagonal: diagonal + self.weights.weight(minor, major),
            left: left - gap,
            up: up - gap,
        }
    }
}

/// Direction of the predecessor a cell's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    Diagonal,
    Left, // consumes a major base against a gap
    Up,   // consumes a minor base against a gap
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidates {
    pub diagonal: i32,
    pub left: i32,
    pub up: i32,
}

impl Candidates {
    /// Fill precedence: diagonal when it is >= both others, then left over
    /// up on a tie.
    #[inline]
    pub fn fill_move(&self) -> Move {
        if self.diagonal >= self.left && self.diagonal >= self.up {
            Move::Diagonal
        } else if self.left >= self.up {
            Move::Left
        } else {
            Move::Up
        }
    }

    /// Traceback precedence: diagonal only when strictly greater than both
    /// others, then left over up on a tie.
    #[inline]
    pub fn traceback_move(&self) -> Move {
        if self.diagonal > self.left && self.diagonal > self.up {
            Move::Diagonal
        } else if self.left >= self.up {
            Move::Left
        } else {
            Move::Up
        }
    }

    #[inline]
    pub fn score(&self, mv: Move) -> i32 {
        match mv {
            Move::Diagonal => self.diagonal,
            Move::Left => self.left,
            Move::Up => self.up,
        }
    }

    /// Value stored in the matrix cell.
    #[inline]
    pub fn best(&self) -> i32 {
        self.score(self.fill_move())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: u32,
    pub mismatches: u32,
    pub gaps: u32,
    pub anomalies: u32,
    pub score: i32,
}
