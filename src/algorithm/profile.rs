use super::{
    scoring::{AffineScoring, GapPenalties, TScore},
    GapContext, Substate,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum DpDirection {
    Backward,
    Forward,
}

/// A slice read either front to back or back to front.
pub(super) struct SliceView<'a, T> {
    items: &'a [T],
    direction: DpDirection,
}

impl<'a, T> SliceView<'a, T> {
    pub fn forward(items: &'a [T]) -> Self {
        SliceView {
            items,
            direction: DpDirection::Forward,
        }
    }

    pub fn backward(items: &'a [T]) -> Self {
        SliceView {
            items,
            direction: DpDirection::Backward,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, local_index: usize) -> &'a T {
        match self.direction {
            DpDirection::Forward => &self.items[local_index],
            DpDirection::Backward => &self.items[self.items.len() - 1 - local_index],
        }
    }
}

fn best_entry(previous: [TScore; Substate::COUNT], to: Substate, gaps: GapPenalties) -> TScore {
    let mut best = TScore::NEG_INFINITY;
    for substate in Substate::ALL {
        best = TScore::max(best, previous[substate.index()] + gaps.transition(substate, to));
    }
    best
}

/// The last row of the affine-gap DP, one running row per substate.
#[derive(Default)]
pub(super) struct ScoreRows {
    rows: [Vec<TScore>; Substate::COUNT],
}

impl ScoreRows {
    /// Scores of aligning all of `a` with every prefix of `b`, starting in `start`.
    /// Afterwards `self.at(j)` holds the score of each final substate against `j` elements of `b`.
    pub fn compute<T, S: AffineScoring<T> + ?Sized>(
        &mut self,
        scoring: &S,
        a: SliceView<T>,
        b: SliceView<T>,
        start: Substate,
    ) {
        let gaps = scoring.gap_penalties();
        let columns = b.len() + 1;
        for row in self.rows.iter_mut() {
            row.clear();
            row.resize(columns, TScore::NEG_INFINITY);
        }

        self.rows[start.index()][0] = 0.0;
        let insertion = Substate::Insertion.index();
        for j in 1..columns {
            self.rows[insertion][j] = best_entry(self.at(j - 1), Substate::Insertion, gaps);
        }

        for i in 1..=a.len() {
            let mut diagonal = self.at(0);
            self.rows[Substate::Match.index()][0] = TScore::NEG_INFINITY;
            self.rows[Substate::Deletion.index()][0] = best_entry(diagonal, Substate::Deletion, gaps);
            self.rows[insertion][0] = TScore::NEG_INFINITY;
            for j in 1..columns {
                let up = self.at(j);
                let left = self.at(j - 1);
                let scores = [
                    best_entry(diagonal, Substate::Match, gaps) + scoring.match_score(a.get(i - 1), b.get(j - 1)),
                    best_entry(up, Substate::Deletion, gaps),
                    best_entry(left, Substate::Insertion, gaps),
                ];
                for substate in Substate::ALL {
                    self.rows[substate.index()][j] = scores[substate.index()];
                }
                diagonal = up;
            }
        }
    }

    pub fn at(&self, column: usize) -> [TScore; Substate::COUNT] {
        Substate::ALL.map(|substate| self.rows[substate.index()][column])
    }

    #[cfg(test)]
    pub fn columns(&self) -> usize {
        self.rows[0].len()
    }
}

/// Optimal affine-gap score of aligning `a` with `b` in linear space.
pub fn optimal_score<T, S: AffineScoring<T> + ?Sized>(scoring: &S, a: &[T], b: &[T], context: GapContext) -> TScore {
    let mut rows = ScoreRows::default();
    rows.compute(scoring, SliceView::forward(a), SliceView::forward(b), context.before);
    let gaps = scoring.gap_penalties();
    let last = rows.at(b.len());
    let mut best = TScore::NEG_INFINITY;
    for substate in Substate::ALL {
        let mut score = last[substate.index()];
        if substate.is_gap() && substate == context.after {
            score += gaps.continuation_bonus();
        }
        best = TScore::max(best, score);
    }
    best
}
