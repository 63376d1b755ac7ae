//! Random pair generation.
//!
//! The major sequence is uniform over the alphabet. The minor sequence is a
//! window of the major one with a bounded number of point mutations, so the
//! two are similar but not identical.

use log::info;
use rand::Rng;

use crate::sequence::{Base, Sequence, SequencePair};
use crate::{AlignerError, Result, Role};

/// Where the minor sequence was cut from and how many bases were mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub reference_index: usize,
    pub mutations: usize,
}

/// Generates a pair with `major_len` and `minor_len` bases.
///
/// At most `mutation_rate * minor_len / 100` minor positions are replaced by
/// a different base, each with probability `mutation_rate`%.
pub fn generate_pair<R: Rng + ?Sized>(
    rng: &mut R,
    major_len: usize,
    minor_len: usize,
    mutation_rate: u32,
    capacity: usize,
) -> Result<SequencePair> {
    if mutation_rate > 100 {
        return Err(AlignerError::InvalidMutationRate(mutation_rate));
    }
    if major_len == 0 {
        return Err(AlignerError::EmptySequence(Role::Major));
    }
    if minor_len == 0 {
        return Err(AlignerError::EmptySequence(Role::Minor));
    }
    if minor_len > major_len {
        return Err(AlignerError::MinorLongerThanMajor {
            minor: minor_len,
            major: major_len,
        });
    }

    let mut major = Sequence::with_capacity(capacity);
    for _ in 0..major_len {
        major.push(Role::Major, random_base(rng))?;
    }

    let spread = major_len - minor_len;
    let reference_index = if spread > 0 { rng.gen_range(0..spread) } else { 0 };

    let window = major.bases()[reference_index..reference_index + minor_len].to_vec();
    let mut minor = Sequence::from_bases(Role::Minor, window, capacity)?;

    let limit = mutation_rate as usize * minor_len / 100;
    let mut mutations = 0;
    let mut position = 0;
    while position < minor_len && mutations < limit {
        if rng.gen_range(1..=100) <= mutation_rate {
            let original = minor.bases()[position];
            let shift = rng.gen_range(1..=3u8);
            let mutated = Base::ALL[usize::from((original.code() + shift) % 4)];
            minor.set(Role::Minor, position, mutated)?;
            mutations += 1;
        }
        position += 1;
    }

    info!(
        "generated pair: spread = {spread}, reference index = {reference_index}, \
         mutations = {mutations}"
    );

    Ok(SequencePair::new(major, minor)?.with_report(GenerationReport {
        reference_index,
        mutations,
    }))
}

fn random_base<R: Rng + ?Sized>(rng: &mut R) -> Base {
    Base::ALL[rng.gen_range(0..Base::ALL.len())]
}
