use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Neighbour list that never spills to the heap.
pub type NeighborList = SmallVec<[Coord2; 8]>;

/// Player-visible bitmaps of a board, detachable so a search can rewind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleState {
    exposed: Array2<bool>,
    flagged: Array2<bool>,
    presses: Array2<PressCount>,
}

impl VisibleState {
    fn new(size: Coord2) -> Self {
        Self {
            exposed: Array2::default(size.to_nd_index()),
            flagged: Array2::default(size.to_nd_index()),
            presses: Array2::default(size.to_nd_index()),
        }
    }

    pub fn exposed(&self) -> &Array2<bool> {
        &self.exposed
    }

    pub fn flagged(&self) -> &Array2<bool> {
        &self.flagged
    }
}

/// Grid model: immutable truth plus the exposed, flagged and press state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    layout: MineLayout,
    visible: VisibleState,
}

impl Board {
    pub fn new(layout: MineLayout) -> Self {
        let visible = VisibleState::new(layout.size());
        Self { layout, visible }
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn in_bounds(&self, coords: Coord2) -> bool {
        self.layout.in_bounds(coords)
    }

    pub fn truth_at(&self, coords: Coord2) -> CellTruth {
        self.layout[coords]
    }

    pub fn is_exposed(&self, coords: Coord2) -> bool {
        self.visible.exposed[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.visible.flagged[coords.to_nd_index()]
    }

    pub fn press_count(&self, coords: Coord2) -> PressCount {
        self.visible.presses[coords.to_nd_index()]
    }

    pub fn exposed(&self) -> &Array2<bool> {
        &self.visible.exposed
    }

    pub fn flagged(&self) -> &Array2<bool> {
        &self.visible.flagged
    }

    pub fn exposed_count(&self) -> CellCount {
        self.visible.exposed.iter().filter(|&&exposed| exposed).count() as CellCount
    }

    pub fn flag_count(&self) -> CellCount {
        self.visible.flagged.iter().filter(|&&flagged| flagged).count() as CellCount
    }

    /// Sets or clears a flag. Flags on exposed cells are refused.
    pub fn set_flag(&mut self, coords: Coord2, flagged: bool) -> Result<MarkOutcome> {
        let coords = self.layout.validate_coords(coords)?;
        let index = coords.to_nd_index();

        if self.visible.exposed[index] || self.visible.flagged[index] == flagged {
            return Ok(MarkOutcome::NoChange);
        }
        self.visible.flagged[index] = flagged;
        Ok(MarkOutcome::Changed)
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.layout.iter_neighbors(coords)
    }

    /// Every cell is exposed or is a flagged mine.
    pub fn is_cleared(&self) -> bool {
        iter_coords(self.size()).all(|coords| {
            self.is_exposed(coords) || (self.is_flagged(coords) && self.layout.contains_mine(coords))
        })
    }

    pub fn visible_state(&self) -> &VisibleState {
        &self.visible
    }

    pub fn restore_visible_state(&mut self, visible: VisibleState) {
        debug_assert_eq!(visible.exposed.dim(), self.visible.exposed.dim());
        self.visible = visible;
    }

    /// Resets every press counter, keeping exposures and flags.
    pub fn clear_presses(&mut self) {
        self.visible.presses.fill(PressCount::Untouched);
    }

    /// Exposes a cell, dropping any flag on it.
    pub(crate) fn expose(&mut self, coords: Coord2) -> bool {
        let index = coords.to_nd_index();
        self.visible.flagged[index] = false;
        let newly_exposed = !self.visible.exposed[index];
        self.visible.exposed[index] = true;
        newly_exposed
    }

    pub(crate) fn set_press_count(&mut self, coords: Coord2, presses: PressCount) {
        self.visible.presses[coords.to_nd_index()] = presses;
    }
}
