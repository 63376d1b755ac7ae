use std::fmt;
use std::str::FromStr;

use crate::extremum::{Extrema, ExtremumRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStrategy {
    Sequential, // one thread, rows in order
    #[default]
    RowClaim,   // workers claim the next row from a shared counter
    Pipeline,   // contiguous row ranges, boundary row handed to the next range
}

impl FillStrategy {
    pub const ALL: [FillStrategy; 3] = [
        FillStrategy::Sequential,
        FillStrategy::RowClaim,
        FillStrategy::Pipeline,
    ];
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FillStrategy::Sequential => "sequential",
            FillStrategy::RowClaim => "row-claim",
            FillStrategy::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

impl FromStr for FillStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(FillStrategy::Sequential),
            "row-claim" => Ok(FillStrategy::RowClaim),
            "pipeline" => Ok(FillStrategy::Pipeline),
            other => Err(format!(
                "unknown fill strategy '{other}' (expected sequential, row-claim or pipeline)"
            )),
        }
    }
}

/// Which maximal cell a traceback starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartCell {
    #[default]
    FirstMax,
    LastMax,
}

impl StartCell {
    pub fn select(self, extrema: &Extrema) -> ExtremumRecord {
        match self {
            StartCell::FirstMax => extrema.first,
            StartCell::LastMax => extrema.last,
        }
    }
}

impl fmt::Display for StartCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartCell::FirstMax => f.write_str("first"),
            StartCell::LastMax => f.write_str("last"),
        }
    }
}

impl FromStr for StartCell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(StartCell::FirstMax),
            "last" => Ok(StartCell::LastMax),
            other => Err(format!("unknown start cell '{other}' (expected first or last)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in FillStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<FillStrategy>(), Ok(strategy));
        }
        assert!("diagonal".parse::<FillStrategy>().is_err());
    }

    #[test]
    fn test_start_cell_parse() {
        assert_eq!("first".parse::<StartCell>(), Ok(StartCell::FirstMax));
        assert_eq!("last".parse::<StartCell>(), Ok(StartCell::LastMax));
        assert!("middle".parse::<StartCell>().is_err());
    }
}
