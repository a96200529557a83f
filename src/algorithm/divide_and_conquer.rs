use std::ops::Range;

use log::{debug, trace};
use rayon::prelude::*;

use super::{
    hashing::{ContentHasher, Fingerprint},
    profile::{ScoreRows, SliceView},
    scoring::{AffineScoring, GapPenalties, TScore, PERFECT_SCORE},
    Alignment, AlignmentAlgorithm, AlignmentElement, GapContext, Substate,
};
use crate::error::AlignResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivideAndConquerOptions {
    /// Subproblems whose shorter side has at most this many elements go to the inner aligner.
    pub base_case_size: usize,
    /// Recursion levels that still fork onto the rayon pool. 0 runs everything on the calling thread.
    pub parallel_depth: usize,
}

impl DivideAndConquerOptions {
    pub const DEFAULT_BASE_CASE_SIZE: usize = 16;

    /// One level more than needed to give every pool thread its own subproblem.
    pub fn default_parallel_depth() -> usize {
        let threads = rayon::current_num_threads().max(1);
        (usize::BITS - threads.leading_zeros()) as usize
    }
}

impl Default for DivideAndConquerOptions {
    fn default() -> Self {
        DivideAndConquerOptions {
            base_case_size: Self::DEFAULT_BASE_CASE_SIZE,
            parallel_depth: Self::default_parallel_depth(),
        }
    }
}

/// Linear-space aligner finding the same optimum as its inner aligner.
///
/// Runs of elements with equal fingerprints and a perfect metric score are
/// matched directly. What remains is split at the middle row of the first
/// sequence, at the column where an optimal path crosses it, until the pieces
/// are small enough for the inner aligner.
pub struct DivideAndConquerAligner<A, H> {
    inner: A,
    hasher: H,
    options: DivideAndConquerOptions,
}

impl<A, H> DivideAndConquerAligner<A, H> {
    pub fn new(inner: A, hasher: H) -> Self {
        Self::with_options(inner, hasher, DivideAndConquerOptions::default())
    }

    pub fn with_options(inner: A, hasher: H, options: DivideAndConquerOptions) -> Self {
        DivideAndConquerAligner { inner, hasher, options }
    }
}

impl<T, A: AffineScoring<T>, H> AffineScoring<T> for DivideAndConquerAligner<A, H> {
    fn match_score(&self, a: &T, b: &T) -> TScore {
        self.inner.match_score(a, b)
    }

    fn gap_penalties(&self) -> GapPenalties {
        self.inner.gap_penalties()
    }
}

impl<T, A, H> AlignmentAlgorithm<T> for DivideAndConquerAligner<A, H>
where
    T: Sync,
    A: AlignmentAlgorithm<T> + AffineScoring<T> + Sync,
    H: ContentHasher<T> + Sync,
{
    fn align_in_context(&self, a: &[T], b: &[T], context: GapContext) -> AlignResult<Alignment> {
        let fingerprint = |element: &T| self.hasher.fingerprint(element);
        let fingerprints = [a, b].map(|sequence| -> Vec<Fingerprint> {
            if self.options.parallel_depth == 0 {
                sequence.iter().map(fingerprint).collect()
            } else {
                sequence.par_iter().map(fingerprint).collect()
            }
        });
        let solver = Solver {
            inner: &self.inner,
            options: self.options,
            sequences: [a, b],
            fingerprints,
        };

        let mut scratch = Scratch::default();
        let mut result = Vec::with_capacity(a.len() + b.len());
        solver.solve(
            Subproblem {
                a: 0..a.len(),
                b: 0..b.len(),
                context,
                depth: 0,
            },
            &mut scratch,
            &mut result,
        )?;
        Ok(result.into())
    }
}

struct Subproblem {
    a: Range<usize>,
    b: Range<usize>,
    context: GapContext,
    depth: usize,
}

/// Profile rows reused by every subproblem one branch of the recursion visits.
#[derive(Default)]
struct Scratch {
    forward: ScoreRows,
    backward: ScoreRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    /// The path leaves the upper half through a match or deletion and enters the lower half afresh.
    Plain,
    /// One deletion run covers the last element of the upper half and the first of the lower half.
    Deletion,
}

struct Solver<'a, T, A> {
    inner: &'a A,
    options: DivideAndConquerOptions,
    sequences: [&'a [T]; 2],
    fingerprints: [Vec<Fingerprint>; 2],
}

impl<'a, T, A> Solver<'a, T, A>
where
    T: Sync,
    A: AlignmentAlgorithm<T> + AffineScoring<T> + Sync,
{
    fn is_identical(&self, i: usize, j: usize) -> bool {
        self.fingerprints[0][i] == self.fingerprints[1][j]
            && self.inner.match_score(&self.sequences[0][i], &self.sequences[1][j]) == PERFECT_SCORE
    }

    fn solve(&self, problem: Subproblem, scratch: &mut Scratch, out: &mut Vec<AlignmentElement>) -> AlignResult<()> {
        let Subproblem {
            mut a,
            mut b,
            context,
            depth,
        } = problem;

        let mut prefix = 0;
        if context.before == Substate::Match {
            while a.start + prefix < a.end
                && b.start + prefix < b.end
                && self.is_identical(a.start + prefix, b.start + prefix)
            {
                prefix += 1;
            }
        }
        a.start += prefix;
        b.start += prefix;

        let mut suffix = 0;
        if context.after == Substate::Match {
            while a.end - suffix > a.start
                && b.end - suffix > b.start
                && self.is_identical(a.end - suffix - 1, b.end - suffix - 1)
            {
                suffix += 1;
            }
        }
        a.end -= suffix;
        b.end -= suffix;

        if prefix + suffix > 0 {
            debug!("matched {prefix} leading and {suffix} trailing identical elements, {}x{} remain", a.len(), b.len());
        }

        out.extend(std::iter::repeat(AlignmentElement::Match).take(prefix));
        self.solve_interior(Subproblem { a, b, context, depth }, scratch, out)?;
        out.extend(std::iter::repeat(AlignmentElement::Match).take(suffix));
        Ok(())
    }

    fn solve_interior(
        &self,
        problem: Subproblem,
        scratch: &mut Scratch,
        out: &mut Vec<AlignmentElement>,
    ) -> AlignResult<()> {
        let Subproblem { a, b, context, depth } = problem;
        if a.len().min(b.len()) <= self.options.base_case_size.max(1) {
            let [first, second] = self.sequences;
            let alignment = self.inner.align_in_context(&first[a], &second[b], context)?;
            out.extend_from_slice(&alignment);
            return Ok(());
        }

        let split_row = a.start + a.len() / 2;
        let (split_column, crossing) = self.find_split(&a, &b, split_row, context, depth, scratch);
        let split_column = b.start + split_column;
        trace!("split {a:?}x{b:?} at row {split_row}, column {split_column} ({crossing:?})");

        let (left, middle, right) = match crossing {
            Crossing::Plain => (
                Subproblem {
                    a: a.start..split_row,
                    b: b.start..split_column,
                    context: GapContext {
                        before: context.before,
                        after: Substate::Match,
                    },
                    depth: depth + 1,
                },
                &[][..],
                Subproblem {
                    a: split_row..a.end,
                    b: split_column..b.end,
                    context: GapContext {
                        before: Substate::Match,
                        after: context.after,
                    },
                    depth: depth + 1,
                },
            ),
            Crossing::Deletion => (
                Subproblem {
                    a: a.start..split_row - 1,
                    b: b.start..split_column,
                    context: GapContext {
                        before: context.before,
                        after: Substate::Deletion,
                    },
                    depth: depth + 1,
                },
                &[AlignmentElement::Deletion, AlignmentElement::Deletion][..],
                Subproblem {
                    a: split_row + 1..a.end,
                    b: split_column..b.end,
                    context: GapContext {
                        before: Substate::Deletion,
                        after: context.after,
                    },
                    depth: depth + 1,
                },
            ),
        };

        if depth < self.options.parallel_depth {
            let mut right_scratch = Scratch::default();
            let mut right_out = Vec::new();
            let (left_result, right_result) = rayon::join(
                || self.solve(left, scratch, out),
                || self.solve(right, &mut right_scratch, &mut right_out),
            );
            left_result?;
            right_result?;
            out.extend_from_slice(middle);
            out.append(&mut right_out);
        } else {
            self.solve(left, scratch, out)?;
            out.extend_from_slice(middle);
            self.solve(right, scratch, out)?;
        }
        Ok(())
    }

    /// Column (relative to `b.start`) where an optimal path crosses from row
    /// `split_row - 1` into `split_row`, and how it crosses.
    fn find_split(
        &self,
        a: &Range<usize>,
        b: &Range<usize>,
        split_row: usize,
        context: GapContext,
        depth: usize,
        scratch: &mut Scratch,
    ) -> (usize, Crossing) {
        let [first, second] = self.sequences;
        let upper = &first[a.start..split_row];
        let lower = &first[split_row..a.end];
        let columns = &second[b.clone()];
        let Scratch { forward, backward } = scratch;
        let compute_forward = |rows: &mut ScoreRows| {
            rows.compute(self.inner, SliceView::forward(upper), SliceView::forward(columns), context.before)
        };
        let compute_backward = |rows: &mut ScoreRows| {
            rows.compute(self.inner, SliceView::backward(lower), SliceView::backward(columns), context.after)
        };
        if depth < self.options.parallel_depth {
            rayon::join(|| compute_forward(forward), || compute_backward(backward));
        } else {
            compute_forward(forward);
            compute_backward(backward);
        }

        let bonus = self.inner.gap_penalties().continuation_bonus();
        let deletion = Substate::Deletion.index();
        let max = |scores: [TScore; Substate::COUNT]| scores.into_iter().fold(TScore::NEG_INFINITY, TScore::max);
        let width = columns.len();
        let mut best = (TScore::NEG_INFINITY, 0, Crossing::Plain);
        for j in 0..=width {
            let upper_scores = scratch.forward.at(j);
            let lower_scores = scratch.backward.at(width - j);
            let plain = max(upper_scores) + max(lower_scores);
            if plain > best.0 {
                best = (plain, j, Crossing::Plain);
            }
            let merged = upper_scores[deletion] + lower_scores[deletion] + bonus;
            if merged > best.0 {
                best = (merged, j, Crossing::Deletion);
            }
        }
        (best.1, best.2)
    }
}
