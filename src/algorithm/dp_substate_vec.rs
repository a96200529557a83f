use std::ops::{Index, IndexMut};

use super::{scoring::TScore, Substate};
use crate::error::{AlignError, AlignResult};

#[derive(Clone, Copy, Debug)]
pub(super) struct DpSubstate {
    pub score: TScore,
    /// Substate of the cell this step came from.
    pub previous: Substate,
}

impl DpSubstate {
    pub const UNREACHABLE: DpSubstate = DpSubstate {
        score: TScore::NEG_INFINITY,
        previous: Substate::Match,
    };
}

/// Flat `rows x columns` matrix holding one `DpSubstate` per substate and cell.
pub(super) struct DpStateMatrix {
    columns: usize,
    internal: Vec<DpSubstate>,
}

impl DpStateMatrix {
    pub fn try_new(rows: usize, columns: usize) -> AlignResult<Self> {
        let too_large = || AlignError::MatrixTooLarge { rows, columns };
        let length = rows
            .checked_mul(columns)
            .and_then(|cells| cells.checked_mul(Substate::COUNT))
            .ok_or_else(too_large)?;
        let mut internal = Vec::new();
        internal.try_reserve_exact(length).map_err(|_| too_large())?;
        internal.resize(length, DpSubstate::UNREACHABLE);
        Ok(DpStateMatrix { columns, internal })
    }

    fn offset(&self, [row, column]: [usize; 2]) -> usize {
        (row * self.columns + column) * Substate::COUNT
    }
}

impl Index<[usize; 2]> for DpStateMatrix {
    type Output = [DpSubstate];

    fn index(&self, index: [usize; 2]) -> &Self::Output {
        let offset = self.offset(index);
        &self.internal[offset..offset + Substate::COUNT]
    }
}

impl IndexMut<[usize; 2]> for DpStateMatrix {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut Self::Output {
        let offset = self.offset(index);
        &mut self.internal[offset..offset + Substate::COUNT]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cells_are_independent() {
        let mut matrix = DpStateMatrix::try_new(2, 3).unwrap();
        matrix[[1, 2]][Substate::Deletion.index()].score = -1.5;
        assert_eq!(matrix[[1, 2]][Substate::Deletion.index()].score, -1.5);
        assert_eq!(matrix[[1, 2]][Substate::Match.index()].score, TScore::NEG_INFINITY);
        assert_eq!(matrix[[0, 2]][Substate::Deletion.index()].score, TScore::NEG_INFINITY);
    }

    #[test]
    fn too_large() {
        assert!(matches!(
            DpStateMatrix::try_new(usize::MAX / 2, 4),
            Err(AlignError::MatrixTooLarge { rows: _, columns: 4 })
        ));
        assert!(DpStateMatrix::try_new(1 << 40, 1 << 20).is_err());
    }
}
