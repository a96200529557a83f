use log::trace;

use super::{
    dp_substate_vec::{DpStateMatrix, DpSubstate},
    scoring::{AffineScoring, DistanceMetric, GapPenalties, TScore},
    Alignment, AlignmentAlgorithm, GapContext, Substate,
};
use crate::error::AlignResult;

/// Full affine-gap aligner over three `(n + 1) x (m + 1)` matrices.
///
/// `M` ends in a match, `X` in a deletion and `Y` in an insertion. A gap run
/// may directly follow a run of the other kind; each run pays its own
/// opening penalty.
#[derive(Debug, Clone)]
pub struct GotohAligner<D> {
    metric: D,
    gaps: GapPenalties,
}

impl<D> GotohAligner<D> {
    pub fn new(metric: D, gaps: GapPenalties) -> GotohAligner<D> {
        GotohAligner { metric, gaps }
    }
}

impl<T, D: DistanceMetric<T>> AffineScoring<T> for GotohAligner<D> {
    fn match_score(&self, a: &T, b: &T) -> TScore {
        self.metric.score(a, b)
    }

    fn gap_penalties(&self) -> GapPenalties {
        self.gaps
    }
}

impl<D> GotohAligner<D> {
    fn compute_dp_matrix<T>(&self, a: &[T], b: &[T], before: Substate) -> AlignResult<DpStateMatrix>
    where
        D: DistanceMetric<T>,
    {
        let sizes = [a.len(), b.len()];
        let mut matrix = DpStateMatrix::try_new(sizes[0] + 1, sizes[1] + 1)?;
        matrix[[0, 0]][before.index()] = DpSubstate {
            score: 0.0,
            previous: before,
        };

        for i in 0..=sizes[0] {
            for j in 0..=sizes[1] {
                for substate in Substate::ALL {
                    let movement = substate.element().movement();
                    if i < movement[0] || j < movement[1] {
                        continue;
                    }
                    let from = [i - movement[0], j - movement[1]];
                    let mut best = DpSubstate::UNREACHABLE;
                    for previous in Substate::ALL {
                        let candidate = matrix[from][previous.index()].score + self.gaps.transition(previous, substate);
                        if candidate > best.score {
                            best = DpSubstate {
                                score: candidate,
                                previous,
                            };
                        }
                    }
                    if substate == Substate::Match && best.score > TScore::NEG_INFINITY {
                        best.score += self.metric.score(&a[i - 1], &b[j - 1]);
                    }
                    matrix[[i, j]][substate.index()] = best;
                }
            }
        }

        Ok(matrix)
    }
}

/// Best final substate of a filled matrix, ties broken towards Match, then Deletion.
fn final_substate(scores: [TScore; Substate::COUNT], gaps: GapPenalties, after: Substate) -> (Substate, TScore) {
    let mut best = (Substate::Match, TScore::NEG_INFINITY);
    for substate in Substate::ALL {
        let mut score = scores[substate.index()];
        if substate.is_gap() && substate == after {
            score += gaps.continuation_bonus();
        }
        if score > best.1 {
            best = (substate, score);
        }
    }
    best
}

impl<T, D: DistanceMetric<T>> AlignmentAlgorithm<T> for GotohAligner<D> {
    fn align_in_context(&self, a: &[T], b: &[T], context: GapContext) -> AlignResult<Alignment> {
        let sizes = [a.len(), b.len()];
        let matrix = self.compute_dp_matrix(a, b, context.before)?;

        let last = &matrix[sizes];
        let scores = Substate::ALL.map(|substate| last[substate.index()].score);
        let (mut substate, score) = final_substate(scores, self.gaps, context.after);
        trace!("gotoh {}x{} in {:?}: score {}", sizes[0], sizes[1], context, score);

        let mut result = Vec::with_capacity(sizes[0] + sizes[1]);
        let mut indices = sizes;
        while indices != [0, 0] {
            let element = substate.element();
            substate = matrix[indices][substate.index()].previous;
            result.push(element);
            for side in 0..2 {
                indices[side] -= element.movement()[side];
            }
        }
        result.reverse();
        Ok(result.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algorithm::{scoring::ExactMatchMetric, AlignmentElement::*};

    fn aligner(open: TScore, extension: TScore) -> GotohAligner<ExactMatchMetric> {
        GotohAligner::new(ExactMatchMetric::default(), GapPenalties::new(open, extension).unwrap())
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn empty_inputs() {
        let aligner = aligner(-0.5, 0.0);
        assert!(aligner.align(&chars(""), &chars("")).unwrap().is_empty());
        assert_eq!(*aligner.align(&chars(""), &chars("ab")).unwrap(), [Insertion, Insertion]);
        assert_eq!(*aligner.align(&chars("abc"), &chars("")).unwrap(), [Deletion, Deletion, Deletion]);
    }

    #[test]
    fn single_gap_run_is_preferred() {
        let aligner = aligner(-1.0, -0.1);
        let a = chars("abcxyzdef");
        let b = chars("abcdef");
        let alignment = aligner.align(&a, &b).unwrap();
        assert_eq!(alignment.run_length(), "M3 D3 M3");
        let score = aligner.alignment_score(&alignment, &a, &b).unwrap();
        assert!((score + 1.2).abs() < 1e-9);
    }

    #[test]
    fn deletion_run_directly_followed_by_insertion_run() {
        let aligner = aligner(-0.3, -0.1);
        let a = chars("aa");
        let b = chars("az");
        let alignment = aligner.align(&a, &b).unwrap();
        assert_eq!(*alignment, [Match, Insertion, Deletion]);
        assert_eq!(aligner.alignment_score(&alignment, &a, &b), Some(-0.6));
    }

    #[test]
    fn context_continues_boundary_gap_runs() {
        let metric = ExactMatchMetric::new(-5.0).unwrap();
        let aligner = GotohAligner::new(metric, GapPenalties::new(-2.0, -0.1).unwrap());
        let a = chars("xab");
        let b = chars("ab");
        let plain = aligner.align(&a, &b).unwrap();
        assert_eq!(*plain, [Deletion, Match, Match]);

        // A run continuing past the end is cheaper than one in the middle.
        let a = chars("axb");
        let context = GapContext {
            before: Substate::Match,
            after: Substate::Insertion,
        };
        let b = chars("ab");
        let alignment = aligner.align_in_context(&a, &b, context).unwrap();
        assert_eq!(*alignment, [Match, Deletion, Match]);
        let b = chars("abq");
        let alignment = aligner.align_in_context(&a, &b, context).unwrap();
        assert_eq!(*alignment, [Match, Deletion, Match, Insertion]);
        let score = aligner.alignment_score_in_context(&alignment, &a, &b, context).unwrap();
        assert!((score - (-2.0 - 0.1)).abs() < 1e-9);
    }

    #[test]
    fn context_start_state() {
        let aligner = aligner(-2.0, 0.0);
        let context = GapContext {
            before: Substate::Insertion,
            after: Substate::Match,
        };
        // The insertion run started before this piece, so extending it is free.
        let alignment = aligner.align_in_context(&chars("bc"), &chars("abc"), context).unwrap();
        assert_eq!(*alignment, [Insertion, Match, Match]);
        let alignment = aligner.align(&chars("bc"), &chars("abc")).unwrap();
        assert_eq!(aligner.alignment_score(&alignment, &chars("bc"), &chars("abc")), Some(-2.0));
    }
}
