use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{
    evaluation::edit_distance,
    profile::optimal_score,
    scoring::{AffineScoring, TScore},
    Alignment, AlignmentAlgorithm, AlignmentElement, GapContext,
};
use crate::error::AlignResult;

/// Per-element probabilities of the random edits applied to the base sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditRates {
    pub insertion: f64,
    pub deletion: f64,
    pub mutation: f64,
}

impl Default for EditRates {
    fn default() -> Self {
        EditRates {
            insertion: 0.05,
            deletion: 0.05,
            mutation: 0.05,
        }
    }
}

/// Two related sequences and the script that produced one from the other.
#[derive(Debug, Clone)]
pub struct Testcase {
    pub a: Vec<u32>,
    pub b: Vec<u32>,
    pub expected: Alignment,
}

pub struct TestcaseGenerator {
    rng: ChaCha8Rng,
    rates: EditRates,
    next_symbol: u32,
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

impl TestcaseGenerator {
    pub fn new(seed: u64, rates: EditRates) -> TestcaseGenerator {
        TestcaseGenerator {
            rng: ChaCha8Rng::seed_from_u64(seed),
            rates: EditRates {
                insertion: probability(rates.insertion),
                deletion: probability(rates.deletion),
                mutation: probability(rates.mutation),
            },
            next_symbol: 0,
        }
    }

    fn fresh_symbol(&mut self) -> u32 {
        self.next_symbol = self.next_symbol.wrapping_add(1);
        self.next_symbol
    }

    /// Builds a base sequence of `length` distinct symbols and edits it.
    /// Every symbol ever produced by one generator is distinct unless copied.
    pub fn generate(&mut self, length: usize) -> Testcase {
        let mut a = Vec::with_capacity(length);
        let mut b = Vec::with_capacity(length);
        let mut expected = Vec::with_capacity(length * 2);
        for _ in 0..length {
            if self.rng.gen_bool(self.rates.insertion) {
                let symbol = self.fresh_symbol();
                b.push(symbol);
                expected.push(AlignmentElement::Insertion);
            }
            let symbol = self.fresh_symbol();
            a.push(symbol);
            if self.rng.gen_bool(self.rates.deletion) {
                expected.push(AlignmentElement::Deletion);
            } else if self.rng.gen_bool(self.rates.mutation) {
                let mutated = self.fresh_symbol();
                b.push(mutated);
                expected.push(AlignmentElement::Match);
            } else {
                b.push(symbol);
                expected.push(AlignmentElement::Match);
            }
        }
        Testcase {
            a,
            b,
            expected: expected.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub alignment: Alignment,
    pub score: TScore,
    pub expected_score: TScore,
    pub optimal_score: TScore,
    /// Edit distance between the produced and the reference script.
    pub distance: usize,
}

pub fn compute_optimal_score<S: AffineScoring<u32> + ?Sized>(scoring: &S, testcase: &Testcase) -> TScore {
    optimal_score(scoring, &testcase.a, &testcase.b, GapContext::default())
}

pub fn evaluate<A>(aligner: &A, testcase: &Testcase) -> AlignResult<Evaluation>
where
    A: AlignmentAlgorithm<u32> + AffineScoring<u32>,
{
    let alignment = aligner.align(&testcase.a, &testcase.b)?;
    let score_of = |alignment: &Alignment| {
        aligner
            .alignment_score(alignment, &testcase.a, &testcase.b)
            .unwrap_or(TScore::NEG_INFINITY)
    };
    Ok(Evaluation {
        score: score_of(&alignment),
        expected_score: score_of(&testcase.expected),
        optimal_score: compute_optimal_score(aligner, testcase),
        distance: edit_distance(&testcase.expected, &alignment),
        alignment,
    })
}
