pub mod benchmark;
mod divide_and_conquer;
mod dp_substate_vec;
pub mod evaluation;
mod gotoh;
pub mod hashing;
mod profile;
pub mod scoring;


use serde::Serialize;
use std::fmt::{self, Display, Write as _};
use std::ops::Deref;

use crate::error::AlignResult;

pub use self::{
    divide_and_conquer::{DivideAndConquerAligner, DivideAndConquerOptions},
    gotoh::GotohAligner,
    profile::optimal_score,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentElement {
    Match,
    Insertion,
    Deletion,
}

impl AlignmentElement {
    /// How many elements of the first and the second sequence this step consumes.
    pub fn movement(&self) -> [usize; 2] {
        match self {
            AlignmentElement::Deletion => [1, 0],
            AlignmentElement::Insertion => [0, 1],
            AlignmentElement::Match => [1, 1],
        }
    }

    pub fn swapped(self) -> AlignmentElement {
        match self {
            AlignmentElement::Deletion => AlignmentElement::Insertion,
            AlignmentElement::Insertion => AlignmentElement::Deletion,
            AlignmentElement::Match => AlignmentElement::Match,
        }
    }

    /// The substate an alignment is in right after this step.
    pub fn substate(self) -> Substate {
        match self {
            AlignmentElement::Match => Substate::Match,
            AlignmentElement::Deletion => Substate::Deletion,
            AlignmentElement::Insertion => Substate::Insertion,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            AlignmentElement::Match => 'M',
            AlignmentElement::Insertion => 'I',
            AlignmentElement::Deletion => 'D',
        }
    }
}

/// The state an alignment is in right after a step. A gap run touching a
/// neighbouring run of the same kind continues it instead of opening a new one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Substate {
    #[default]
    Match,
    Deletion,
    Insertion,
}

impl Substate {
    pub const ALL: [Substate; 3] = [Substate::Match, Substate::Deletion, Substate::Insertion];
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Substate::Match => 0,
            Substate::Deletion => 1,
            Substate::Insertion => 2,
        }
    }

    pub fn element(self) -> AlignmentElement {
        match self {
            Substate::Match => AlignmentElement::Match,
            Substate::Deletion => AlignmentElement::Deletion,
            Substate::Insertion => AlignmentElement::Insertion,
        }
    }

    pub fn is_gap(self) -> bool {
        self != Substate::Match
    }
}

/// Boundary conditions of a subproblem: the substate right before its first
/// step and right after its last one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct GapContext {
    pub before: Substate,
    pub after: Substate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alignment(Vec<AlignmentElement>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedPair {
    Match(usize, usize),
    Insertion(usize),
    Deletion(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCounts {
    pub matches: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl Alignment {
    pub fn new() -> Alignment {
        Alignment(Vec::new())
    }

    /// Number of elements of each input sequence the script walks over.
    pub fn consumed(&self) -> [usize; 2] {
        let mut result = [0, 0];
        for element in &self.0 {
            for side in 0..2 {
                result[side] += element.movement()[side];
            }
        }
        result
    }

    pub fn counts(&self) -> ElementCounts {
        let mut counts = ElementCounts::default();
        for element in &self.0 {
            match element {
                AlignmentElement::Match => counts.matches += 1,
                AlignmentElement::Insertion => counts.insertions += 1,
                AlignmentElement::Deletion => counts.deletions += 1,
            }
        }
        counts
    }

    /// The same script read as an alignment of the second sequence against the first.
    pub fn swapped(&self) -> Alignment {
        self.0.iter().map(|element| element.swapped()).collect()
    }

    pub fn pairs(&self) -> impl Iterator<Item = AlignedPair> + '_ {
        let mut position = [0, 0];
        self.0.iter().map(move |element| {
            let pair = match element {
                AlignmentElement::Match => AlignedPair::Match(position[0], position[1]),
                AlignmentElement::Insertion => AlignedPair::Insertion(position[1]),
                AlignmentElement::Deletion => AlignedPair::Deletion(position[0]),
            };
            for side in 0..2 {
                position[side] += element.movement()[side];
            }
            pair
        })
    }

    /// Compact form such as `M1 I1 M8`.
    pub fn run_length(&self) -> String {
        let mut result = String::new();
        let mut iter = self.0.iter().peekable();
        while let Some(&element) = iter.next() {
            let mut count = 1;
            while iter.peek() == Some(&&element) {
                iter.next();
                count += 1;
            }
            if !result.is_empty() {
                result.push(' ');
            }
            // Writing to a String never fails.
            let _ = write!(result, "{}{}", element.symbol(), count);
        }
        result
    }
}

impl Deref for Alignment {
    type Target = [AlignmentElement];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<AlignmentElement>> for Alignment {
    fn from(elements: Vec<AlignmentElement>) -> Self {
        Alignment(elements)
    }
}

impl FromIterator<AlignmentElement> for Alignment {
    fn from_iter<I: IntoIterator<Item = AlignmentElement>>(iter: I) -> Self {
        Alignment(iter.into_iter().collect())
    }
}

impl Extend<AlignmentElement> for Alignment {
    fn extend<I: IntoIterator<Item = AlignmentElement>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            f.write_char(element.symbol())?;
        }
        Ok(())
    }
}

/// Renders a symbolic alignment as three rows: the first sequence, a marker
/// row (`|` for equal matches, `.` for unequal ones, blank for gaps) and the
/// second sequence. Gaps are shown as `-`.
///
/// Panics if the alignment does not consume exactly `a` and `b`.
pub fn format_side_by_side<T: Display + PartialEq>(alignment: &Alignment, a: &[T], b: &[T]) -> [String; 3] {
    assert_eq!(
        alignment.consumed(),
        [a.len(), b.len()],
        "alignment does not fit the sequences"
    );
    let mut rows: [String; 3] = Default::default();
    for pair in alignment.pairs() {
        let (top, marker, bottom) = match pair {
            AlignedPair::Match(i, j) => {
                let marker = if a[i] == b[j] { "|" } else { "." };
                (a[i].to_string(), marker, b[j].to_string())
            }
            AlignedPair::Insertion(j) => ("-".to_owned(), " ", b[j].to_string()),
            AlignedPair::Deletion(i) => (a[i].to_string(), " ", "-".to_owned()),
        };
        let width = top.chars().count().max(bottom.chars().count());
        let _ = write!(rows[0], "{top:<width$}");
        let _ = write!(rows[1], "{marker:<width$}");
        let _ = write!(rows[2], "{bottom:<width$}");
    }
    rows
}

/// Produces an edit script turning the first sequence into the second.
pub trait AlignmentAlgorithm<T> {
    fn align(&self, a: &[T], b: &[T]) -> AlignResult<Alignment> {
        self.align_in_context(a, b, GapContext::default())
    }

    /// Aligns a piece of a larger problem whose neighbouring steps are described by `context`.
    fn align_in_context(&self, a: &[T], b: &[T], context: GapContext) -> AlignResult<Alignment>;
}
