use std::fmt;
use std::ops::Range;

use crate::scoring::{Position, ScoreParams};
use crate::sequence::{SequencePair, GAP_CHAR};

/// Dynamic-programming score matrix, stored row-major.
///
/// Rows index the minor sequence (plus the border row 0) and columns index
/// the major sequence (plus the border column 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMatrix {
    data: Vec<i32>,
    rows: usize,
    cols: usize,
}

impl ScoreMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Allocates a matrix with row 0 and column 0 holding the gap border.
    pub fn with_borders(rows: usize, cols: usize, params: &ScoreParams) -> Self {
        let mut matrix = Self::new(rows, cols);
        for col in 0..cols {
            matrix.set(0, col, params.border(col));
        }
        for row in 0..rows {
            matrix.set(row, 0, params.border(row));
        }
        matrix
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn at(&self, position: Position) -> i32 {
        self.get(position.row, position.col)
    }

    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [i32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Contiguous block of whole rows.
    pub(crate) fn rows_mut(&mut self, rows: Range<usize>) -> &mut [i32] {
        &mut self.data[rows.start * self.cols..rows.end * self.cols]
    }

    /// Previous row and current row, borrowed together.
    pub(crate) fn row_pair_mut(&mut self, row: usize) -> (&[i32], &mut [i32]) {
        let (head, tail) = self.data.split_at_mut(row * self.cols);
        (&head[(row - 1) * self.cols..], &mut tail[..self.cols])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row- and column-labeled rendering of the matrix.
    pub fn grid<'a>(&'a self, pair: &'a SequencePair) -> MatrixGrid<'a> {
        MatrixGrid { matrix: self, pair }
    }
}

/// Text dump of a [`ScoreMatrix`]: column indices, the major bases, then
/// one line per row prefixed by its index and minor base.
pub struct MatrixGrid<'a> {
    matrix: &'a ScoreMatrix,
    pair: &'a SequencePair,
}

impl fmt::Display for MatrixGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matrix = self.matrix;
        let major = self.pair.major().bases();
        let minor = self.pair.minor().bases();

        write!(f, "{:>4}{:>4}", ' ', ' ')?;
        for col in 0..matrix.cols() {
            write!(f, "{:>4}", col)?;
        }
        writeln!(f)?;

        write!(f, "{:>4}{:>4}{:>4}", ' ', ' ', GAP_CHAR)?;
        for base in major.iter().take(matrix.cols().saturating_sub(1)) {
            write!(f, "{:>4}", base.to_char())?;
        }
        writeln!(f)?;

        for row in 0..matrix.rows() {
            let label = match row {
                0 => GAP_CHAR,
                _ => minor.get(row - 1).map_or('?', |b| b.to_char()),
            };
            write!(f, "{:>4}{:>4}", row, label)?;
            for value in matrix.row(row) {
                write!(f, "{:>4}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{GapPenalty, WeightTable};
    use crate::MAX_SEQUENCE_LEN;

    #[test]
    fn test_borders() {
        let params = ScoreParams::new(WeightTable::default(), GapPenalty::new(3).unwrap());
        let matrix = ScoreMatrix::with_borders(3, 4, &params);
        assert_eq!(matrix.row(0), &[0, -3, -6, -9]);
        assert_eq!(matrix.get(1, 0), -3);
        assert_eq!(matrix.get(2, 0), -6);
        assert_eq!(matrix.get(2, 3), 0);
    }

    #[test]
    fn test_row_pair_mut_borrows_adjacent_rows() {
        let mut matrix = ScoreMatrix::new(3, 2);
        matrix.set(1, 0, 7);
        matrix.set(1, 1, 8);
        let (prev, cur) = matrix.row_pair_mut(2);
        assert_eq!(prev, &[7, 8]);
        cur[1] = 9;
        assert_eq!(matrix.get(2, 1), 9);
    }

    #[test]
    fn test_grid_layout() {
        let pair = SequencePair::parse("AG", "T", MAX_SEQUENCE_LEN).unwrap();
        let params = ScoreParams::new(WeightTable::default(), GapPenalty::new(1).unwrap());
        let matrix = ScoreMatrix::with_borders(2, 3, &params);
        let text = matrix.grid(&pair).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "           0   1   2");
        assert_eq!(lines[1], "           -   A   G");
        assert_eq!(lines[2], "   0   -   0  -1  -2");
        assert_eq!(lines[3], "   1   T  -1   0   0");
    }
}
