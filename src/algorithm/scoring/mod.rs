pub mod exact_match;
pub mod pixel_count;

use crate::error::{ConfigError, ConfigResult};

use super::{AlignmentElement, GapContext, Substate};

pub use self::{
    exact_match::ExactMatchMetric,
    pixel_count::{Mask, PixelCountMetric},
};

pub type TScore = f64;

/// Score of two elements that are identical for the purposes of alignment.
pub const PERFECT_SCORE: TScore = 0.0;

/// Similarity of two elements: higher is better, never positive, and
/// `PERFECT_SCORE` for equal elements.
pub trait DistanceMetric<T> {
    fn score(&self, a: &T, b: &T) -> TScore;
}

impl<T, D: DistanceMetric<T> + ?Sized> DistanceMetric<T> for &D {
    fn score(&self, a: &T, b: &T) -> TScore {
        (**self).score(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapPenalties {
    open: TScore,
    extension: TScore,
}

impl GapPenalties {
    pub fn new(open: TScore, extension: TScore) -> ConfigResult<GapPenalties> {
        if !(open.is_finite() && extension.is_finite() && open <= extension && extension <= 0.0) {
            return Err(ConfigError::InvalidGapPenalties { open, extension });
        }
        Ok(GapPenalties { open, extension })
    }

    /// Cost of a step ending in `to` taken right after a step ending in `from`.
    pub fn transition(&self, from: Substate, to: Substate) -> TScore {
        match to {
            Substate::Match => 0.0,
            gap if gap == from => self.extension,
            _ => self.open,
        }
    }

    /// Gained when two runs of the same gap kind turn out to be one run.
    pub fn continuation_bonus(&self) -> TScore {
        self.extension - self.open
    }
}

impl Default for GapPenalties {
    fn default() -> Self {
        GapPenalties {
            open: -0.5,
            extension: 0.0,
        }
    }
}

/// The affine scoring model of an aligner: a metric for matched pairs plus gap penalties.
pub trait AffineScoring<T> {
    fn match_score(&self, a: &T, b: &T) -> TScore;

    fn gap_penalties(&self) -> GapPenalties;

    /// Score of an arbitrary script, `None` if it does not walk exactly over both inputs.
    fn alignment_score(&self, alignment: &[AlignmentElement], a: &[T], b: &[T]) -> Option<TScore> {
        self.alignment_score_in_context(alignment, a, b, GapContext::default())
    }

    fn alignment_score_in_context(
        &self,
        alignment: &[AlignmentElement],
        a: &[T],
        b: &[T],
        context: GapContext,
    ) -> Option<TScore> {
        let gaps = self.gap_penalties();
        let mut score = 0.0;
        let mut substate = context.before;
        let mut position = [0, 0];
        for &element in alignment {
            let next = element.substate();
            score += match element {
                AlignmentElement::Match => self.match_score(a.get(position[0])?, b.get(position[1])?),
                AlignmentElement::Deletion => {
                    a.get(position[0])?;
                    gaps.transition(substate, next)
                }
                AlignmentElement::Insertion => {
                    b.get(position[1])?;
                    gaps.transition(substate, next)
                }
            };
            for side in 0..2 {
                position[side] += element.movement()[side];
            }
            substate = next;
        }
        if position != [a.len(), b.len()] {
            return None;
        }
        if substate.is_gap() && substate == context.after {
            score += gaps.continuation_bonus();
        }
        Some(score)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use AlignmentElement::*;

    struct Plain(GapPenalties);

    impl AffineScoring<char> for Plain {
        fn match_score(&self, a: &char, b: &char) -> TScore {
            ExactMatchMetric::default().score(a, b)
        }

        fn gap_penalties(&self) -> GapPenalties {
            self.0
        }
    }

    #[test]
    fn gap_penalties_are_validated() {
        assert!(GapPenalties::new(-0.5, 0.0).is_ok());
        assert!(GapPenalties::new(-1.0, -1.0).is_ok());
        assert!(GapPenalties::new(0.0, 0.0).is_ok());
        assert!(matches!(
            GapPenalties::new(-0.1, -0.5),
            Err(ConfigError::InvalidGapPenalties { .. })
        ));
        assert!(GapPenalties::new(0.5, 0.5).is_err());
        assert!(GapPenalties::new(TScore::NEG_INFINITY, 0.0).is_err());
        assert!(GapPenalties::new(TScore::NAN, 0.0).is_err());
    }

    #[test]
    fn script_score() {
        let scoring = Plain(GapPenalties::new(-2.0, -0.5).unwrap());
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "axd".chars().collect();
        let score = scoring.alignment_score(&[Match, Match, Deletion, Match], &a, &b);
        assert_eq!(score, Some(-1.0 - 2.0));
        let score = scoring.alignment_score(&[Match, Deletion, Deletion, Insertion, Match], &a, &b);
        assert_eq!(score, Some(-2.0 - 0.5 - 2.0));
    }

    #[test]
    fn script_that_does_not_fit() {
        let scoring = Plain(GapPenalties::default());
        let a: Vec<char> = "ab".chars().collect();
        let b: Vec<char> = "a".chars().collect();
        assert_eq!(scoring.alignment_score(&[Match], &a, &b), None);
        assert_eq!(scoring.alignment_score(&[Match, Match], &a, &b), None);
        assert_eq!(scoring.alignment_score(&[Match, Insertion, Deletion], &a, &b), None);
        assert_eq!(scoring.alignment_score(&[Match, Deletion], &a, &b), Some(-0.5));
    }

    #[test]
    fn context_continues_gap_runs() {
        let scoring = Plain(GapPenalties::new(-2.0, -0.5).unwrap());
        let a: Vec<char> = "ab".chars().collect();
        let b: Vec<char> = vec![];
        let alignment = [Deletion, Deletion];
        assert_eq!(scoring.alignment_score(&alignment, &a, &b), Some(-2.5));
        let context = GapContext {
            before: Substate::Deletion,
            after: Substate::Match,
        };
        assert_eq!(scoring.alignment_score_in_context(&alignment, &a, &b, context), Some(-1.0));
        let context = GapContext {
            before: Substate::Deletion,
            after: Substate::Deletion,
        };
        assert_eq!(scoring.alignment_score_in_context(&alignment, &a, &b, context), Some(0.5));
        let context = GapContext {
            before: Substate::Insertion,
            after: Substate::Insertion,
        };
        assert_eq!(scoring.alignment_score_in_context(&alignment, &a, &b, context), Some(-2.5));
    }
}
