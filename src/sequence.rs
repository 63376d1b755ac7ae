//! Input sequences over the four-letter DNA alphabet.
//!
//! Bases are stored as [`Base`] values whose discriminants are the symbol
//! codes 0..=3 used to index the weight table. The gap marker only exists in
//! aligned output ([`Symbol::Gap`], code 4) and can never reach the table.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::generator::GenerationReport;
use crate::{AlignerError, Result, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Base {
    A = 0,
    T = 1,
    G = 2,
    C = 3,
}

pub const GAP_CODE: u8 = 4;
pub const GAP_CHAR: char = '-';

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::G, Base::C];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_char(c: char) -> Option<Base> {
        match c {
            'A' => Some(Base::A),
            'T' => Some(Base::T),
            'G' => Some(Base::G),
            'C' => Some(Base::C),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::G => 'G',
            Base::C => 'C',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// One column entry of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Base(Base),
    Gap,
}

impl Symbol {
    pub fn code(self) -> u8 {
        match self {
            Symbol::Base(base) => base.code(),
            Symbol::Gap => GAP_CODE,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Symbol::Base(base) => base.to_char(),
            Symbol::Gap => GAP_CHAR,
        }
    }

    pub fn is_gap(self) -> bool {
        self == Symbol::Gap
    }
}

impl From<Base> for Symbol {
    fn from(base: Base) -> Self {
        Symbol::Base(base)
    }
}

/// Bounded sequence of bases.
///
/// The capacity is fixed at construction; every mutation checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    bases: Vec<Base>,
    capacity: usize,
}

impl Sequence {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bases: Vec::with_capacity(capacity.min(crate::MAX_SEQUENCE_LEN)),
            capacity,
        }
    }

    pub fn from_bases(role: Role, bases: Vec<Base>, capacity: usize) -> Result<Self> {
        if bases.len() > capacity {
            return Err(AlignerError::SequenceTooLong {
                role,
                len: bases.len(),
                max: capacity,
            });
        }
        Ok(Self { bases, capacity })
    }

    /// Parses a line of `A`, `T`, `G`, `C`. A trailing newline is stripped;
    /// any other character is rejected.
    pub fn parse(role: Role, text: &str, capacity: usize) -> Result<Self> {
        let line = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let mut sequence = Self::with_capacity(capacity);
        for (position, c) in line.chars().enumerate() {
            let base = Base::from_char(c).ok_or(AlignerError::InvalidBase {
                role,
                position,
                found: c,
            })?;
            sequence.push(role, base)?;
        }
        Ok(sequence)
    }

    pub fn push(&mut self, role: Role, base: Base) -> Result<()> {
        if self.bases.len() >= self.capacity {
            return Err(AlignerError::SequenceTooLong {
                role,
                len: self.bases.len() + 1,
                max: self.capacity,
            });
        }
        self.bases.push(base);
        Ok(())
    }

    /// Replaces the base at `index`, which must already be in the sequence.
    pub fn set(&mut self, role: Role, index: usize, base: Base) -> Result<()> {
        let len = self.bases.len();
        let slot = self
            .bases
            .get_mut(index)
            .ok_or(AlignerError::PositionOutOfRange {
                role,
                position: index,
                len,
            })?;
        *slot = base;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn codes(&self) -> Vec<u8> {
        self.bases.iter().map(|b| b.code()).collect()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.bases {
            write!(f, "{}", base)?;
        }
        Ok(())
    }
}

/// The major and minor sequences of one alignment problem.
///
/// Construction guarantees `1 <= minor.len() <= major.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePair {
    major: Sequence,
    minor: Sequence,
    report: Option<GenerationReport>,
}

impl SequencePair {
    pub fn new(major: Sequence, minor: Sequence) -> Result<Self> {
        if major.is_empty() {
            return Err(AlignerError::EmptySequence(Role::Major));
        }
        if minor.is_empty() {
            return Err(AlignerError::EmptySequence(Role::Minor));
        }
        if minor.len() > major.len() {
            return Err(AlignerError::MinorLongerThanMajor {
                minor: minor.len(),
                major: major.len(),
            });
        }
        Ok(Self {
            major,
            minor,
            report: None,
        })
    }

    pub fn parse(major: &str, minor: &str, capacity: usize) -> Result<Self> {
        Self::new(
            Sequence::parse(Role::Major, major, capacity)?,
            Sequence::parse(Role::Minor, minor, capacity)?,
        )
    }

    /// Loads a pair from a text file: the major sequence on the first line,
    /// the minor sequence on the second.
    pub fn from_file<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut lines = contents.lines();

        let major = lines.next().ok_or_else(|| AlignerError::MissingSequence {
            role: Role::Major,
            path: path.to_path_buf(),
        })?;
        let minor = lines.next().ok_or_else(|| AlignerError::MissingSequence {
            role: Role::Minor,
            path: path.to_path_buf(),
        })?;

        Self::parse(major, minor, capacity)
    }

    pub(crate) fn with_report(mut self, report: GenerationReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn major(&self) -> &Sequence {
        &self.major
    }

    pub fn minor(&self) -> &Sequence {
        &self.minor
    }

    pub fn report(&self) -> Option<&GenerationReport> {
        self.report.as_ref()
    }

    pub(crate) fn check_capacity(&self, max: usize) -> Result<()> {
        for (role, sequence) in [(Role::Major, &self.major), (Role::Minor, &self.minor)] {
            if sequence.len() > max {
                return Err(AlignerError::SequenceTooLong {
                    role,
                    len: sequence.len(),
                    max,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for SequencePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Major sequence, len = {}", self.major.len())?;
        writeln!(f, "{}", self.major)?;

        if let Some(report) = &self.report {
            let marker: String = (0..self.major.len())
                .map(|i| if i == report.reference_index { '^' } else { ' ' })
                .collect();
            writeln!(f, "{}", marker.trim_end())?;
            writeln!(f, "Reference index = {}", report.reference_index)?;
        }

        writeln!(f, "Minor sequence, len = {}", self.minor.len())?;
        writeln!(f, "{}", self.minor)?;

        if let Some(report) = &self.report {
            let source = &self.major.bases()[report.reference_index..];
            let marker: String = self
                .minor
                .bases()
                .iter()
                .zip(source)
                .map(|(m, s)| if m != s { '^' } else { ' ' })
                .collect();
            writeln!(f, "{}", marker.trim_end())?;
            writeln!(f, "Mutations = {}", report.mutations)?;
        }
        Ok(())
    }
}
