//! Property-based tests for the score matrix engine, the extremum tracker
//! and the traceback.
//!
//! Every parallel strategy is checked against a plain nested-loop fill.

use nw_aligner::extremum::locate;
use nw_aligner::fill::fill_with;
use nw_aligner::{
    Base, FillStrategy, GapPenalty, Position, Role, ScoreMatrix, ScoreParams, Sequence,
    SequencePair, Symbol, Traceback, WeightTable, MAX_SEQUENCE_LEN, MAX_WORKERS,
};
use proptest::prelude::*;

fn to_bases(codes: &[u8]) -> Vec<Base> {
    codes.iter().map(|&c| Base::ALL[c as usize]).collect()
}

fn arb_pair() -> impl Strategy<Value = SequencePair> {
    (
        prop::collection::vec(0u8..4, 1..40),
        prop::collection::vec(0u8..4, 1..40),
    )
        .prop_map(|(a, b)| {
            let (major, minor) = if a.len() >= b.len() { (a, b) } else { (b, a) };
            SequencePair::new(
                Sequence::from_bases(Role::Major, to_bases(&major), MAX_SEQUENCE_LEN).unwrap(),
                Sequence::from_bases(Role::Minor, to_bases(&minor), MAX_SEQUENCE_LEN).unwrap(),
            )
            .unwrap()
        })
}

fn arb_params() -> impl Strategy<Value = ScoreParams> {
    (
        prop::array::uniform4(prop::array::uniform4(-4i32..5)),
        0i32..4,
    )
        .prop_map(|(weights, gap)| {
            ScoreParams::new(WeightTable::new(weights), GapPenalty::new(gap).unwrap())
        })
}

fn arb_strategy() -> impl Strategy<Value = FillStrategy> {
    prop_oneof![
        Just(FillStrategy::Sequential),
        Just(FillStrategy::RowClaim),
        Just(FillStrategy::Pipeline),
    ]
}

/// Textbook nested-loop fill.
fn naive_fill(pair: &SequencePair, params: &ScoreParams) -> Vec<Vec<i32>> {
    let minor = pair.minor().bases();
    let major = pair.major().bases();
    let gap = params.gap.value();
    let mut m = vec![vec![0; major.len() + 1]; minor.len() + 1];

    for (j, cell) in m[0].iter_mut().enumerate() {
        *cell = -(j as i32) * gap;
    }
    for i in 0..=minor.len() {
        m[i][0] = -(i as i32) * gap;
    }
    for i in 1..=minor.len() {
        for j in 1..=major.len() {
            let diagonal = m[i - 1][j - 1] + params.weights.weight(minor[i - 1], major[j - 1]);
            let left = m[i][j - 1] - gap;
            let up = m[i - 1][j] - gap;
            m[i][j] = diagonal.max(left).max(up);
        }
    }
    m
}

fn assert_matches_reference(matrix: &ScoreMatrix, reference: &[Vec<i32>]) {
    assert_eq!(matrix.rows(), reference.len());
    for (row, expected) in reference.iter().enumerate() {
        assert_eq!(matrix.row(row), expected.as_slice(), "row {row}");
    }
}

fn ungapped(symbols: &[Symbol]) -> Vec<Base> {
    symbols
        .iter()
        .filter_map(|s| match s {
            Symbol::Base(b) => Some(*b),
            Symbol::Gap => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_strategy_matches_reference(
        pair in arb_pair(),
        params in arb_params(),
        strategy in arb_strategy(),
        workers in 1usize..=MAX_WORKERS,
    ) {
        let reference = naive_fill(&pair, &params);
        let matrix = fill_with(&pair, &params, strategy, workers).unwrap();
        assert_matches_reference(&matrix, &reference);
    }

    #[test]
    fn prop_borders_hold_gap_penalties(
        pair in arb_pair(),
        params in arb_params(),
        strategy in arb_strategy(),
        workers in 1usize..=8,
    ) {
        let matrix = fill_with(&pair, &params, strategy, workers).unwrap();
        let gap = params.gap.value();
        for j in 0..matrix.cols() {
            prop_assert_eq!(matrix.get(0, j), -(j as i32) * gap);
        }
        for i in 0..matrix.rows() {
            prop_assert_eq!(matrix.get(i, 0), -(i as i32) * gap);
        }
    }

    #[test]
    fn prop_recurrence_holds(pair in arb_pair(), params in arb_params(), workers in 1usize..=8) {
        let matrix = fill_with(&pair, &params, FillStrategy::RowClaim, workers).unwrap();
        let minor = pair.minor().bases();
        let major = pair.major().bases();
        let gap = params.gap.value();
        for i in 1..matrix.rows() {
            for j in 1..matrix.cols() {
                let weight = params.weights.weight(minor[i - 1], major[j - 1]);
                let expected = (matrix.get(i - 1, j - 1) + weight)
                    .max(matrix.get(i, j - 1) - gap)
                    .max(matrix.get(i - 1, j) - gap);
                prop_assert_eq!(matrix.get(i, j), expected);
            }
        }
    }

    #[test]
    fn prop_extrema_are_first_and_last_maximum(pair in arb_pair(), params in arb_params()) {
        let matrix = fill_with(&pair, &params, FillStrategy::Sequential, 1).unwrap();
        let extrema = locate(&matrix).unwrap();

        let interior: Vec<(Position, i32)> = (1..matrix.rows())
            .flat_map(|i| (1..matrix.cols()).map(move |j| Position::new(i, j)))
            .map(|p| (p, matrix.at(p)))
            .collect();
        let best = interior.iter().map(|(_, s)| *s).max().unwrap();
        let first = interior.iter().find(|(_, s)| *s == best).unwrap().0;
        let last = interior.iter().rev().find(|(_, s)| *s == best).unwrap().0;

        prop_assert_eq!(extrema.first.score, best);
        prop_assert_eq!(extrema.last.score, best);
        prop_assert_eq!(extrema.first.position, first);
        prop_assert_eq!(extrema.last.position, last);
    }

    #[test]
    fn prop_full_traceback_is_a_global_alignment(pair in arb_pair(), params in arb_params()) {
        let matrix = fill_with(&pair, &params, FillStrategy::Pipeline, 4).unwrap();
        let m = pair.minor().len();
        let n = pair.major().len();
        let alignment = Traceback::new(&matrix, &pair, &params)
            .reconstruct(Position::new(m, n))
            .unwrap();

        prop_assert_eq!(alignment.major().len(), alignment.minor().len());
        prop_assert!(alignment.len() >= m.max(n));
        prop_assert!(alignment.len() <= m + n);
        prop_assert_eq!(ungapped(alignment.major()), pair.major().bases().to_vec());
        prop_assert_eq!(ungapped(alignment.minor()), pair.minor().bases().to_vec());
        prop_assert!(alignment.columns().all(|(a, b)| !(a.is_gap() && b.is_gap())));

        if alignment.anomalies() == 0 {
            prop_assert_eq!(alignment.score(&params), matrix.get(m, n));
        }
    }

    #[test]
    fn prop_reversing_twice_restores_order(pair in arb_pair(), params in arb_params()) {
        let matrix = fill_with(&pair, &params, FillStrategy::Sequential, 1).unwrap();
        let start = locate(&matrix).unwrap().last.position;
        let alignment = Traceback::new(&matrix, &pair, &params).reconstruct(start).unwrap();
        prop_assert_eq!(alignment.reversed().reversed(), alignment);
    }
}
