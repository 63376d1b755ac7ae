use crate::matrix::ScoreMatrix;
use crate::scoring::Position;
use crate::{AlignerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremumRecord {
    pub position: Position,
    pub score: i32,
}

/// First and last maximal interior cells in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrema {
    pub first: ExtremumRecord,
    pub last: ExtremumRecord,
}

/// Scans rows `1..rows` and columns `1..cols` in row-major order. The first
/// record only moves on a strictly greater score, the last record on any
/// score greater or equal.
pub fn locate(matrix: &ScoreMatrix) -> Result<Extrema> {
    if matrix.rows() < 2 || matrix.cols() < 2 {
        return Err(AlignerError::MatrixNotFilled);
    }

    let origin = ExtremumRecord {
        position: Position::new(1, 1),
        score: matrix.get(1, 1),
    };
    let mut first = origin;
    let mut last = origin;

    for row in 1..matrix.rows() {
        for (col, &score) in matrix.row(row).iter().enumerate().skip(1) {
            if score > first.score {
                first = ExtremumRecord {
                    position: Position::new(row, col),
                    score,
                };
            }
            if score >= last.score {
                last = ExtremumRecord {
                    position: Position::new(row, col),
                    score,
                };
            }
        }
    }

    Ok(Extrema { first, last })
}
