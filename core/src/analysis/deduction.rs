use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::Observation;
use crate::*;

/// One exposed number seen as a local equation: `remaining` of the
/// `unknown` cells around `clue` hold a mine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueConstraint {
    pub clue: Coord2,
    /// Unrevealed, unflagged neighbours in compass order.
    pub unknown: NeighborList,
    /// Clue number minus flagged neighbours. Negative after over-flagging.
    pub remaining: i16,
}

impl ClueConstraint {
    pub fn from_clue(obs: &Observation, clue: Coord2) -> Option<Self> {
        let number = obs.number_at(clue)?;
        if number == 0 {
            return None;
        }

        let mut remaining = i16::from(number);
        let mut unknown = NeighborList::new();
        for neighbor in obs.iter_neighbors(clue) {
            if obs.is_flagged(neighbor) {
                remaining -= 1;
            } else if !obs.is_revealed(neighbor) {
                unknown.push(neighbor);
            }
        }

        Some(Self {
            clue,
            unknown,
            remaining,
        })
    }

    fn is_consistent(&self) -> bool {
        self.remaining >= 0 && (self.remaining as usize) <= self.unknown.len()
    }
}

/// Which passes a deduction may use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionRules {
    /// Saturation and overlap passes only. Logical boards are accepted
    /// against these.
    ClueOnly,
    /// Clue passes, then the global mine count.
    #[default]
    WithMineCount,
}

/// Constraints for every exposed number that still borders an unknown
/// cell, row-major.
pub fn build_constraints(obs: &Observation) -> Vec<ClueConstraint> {
    iter_coords(obs.size)
        .filter_map(|clue| ClueConstraint::from_clue(obs, clue))
        .filter(|constraint| !constraint.unknown.is_empty())
        .collect()
}

/// Saturation pass: a number whose remaining count equals its unknown
/// neighbours makes all of them mines. Returns the first such cell in
/// row-major clue order, then compass order.
pub fn suggest_mine_by_single_constraint(obs: &Observation) -> Option<Coord2> {
    single_constraint_mine(&build_constraints(obs))
}

fn single_constraint_mine(constraints: &[ClueConstraint]) -> Option<Coord2> {
    constraints
        .iter()
        .find(|constraint| {
            constraint.remaining > 0 && constraint.remaining as usize == constraint.unknown.len()
        })
        .map(|constraint| constraint.unknown[0])
}

/// Overlap pass over pairs of neighbouring numbers sharing unknown cells.
///
/// With `unique1`, `unique2` and `common` partitioning the two unknown sets:
/// - the shared region holds at most `min(|common|, remaining2)` of the first
///   number's mines, so if the rest exactly fills `unique1`, all of `unique1`
///   are mines;
/// - if the second number needs `remaining2 - |unique2|` mines inside
///   `common` and that equals `|common|`, all of `common` are mines.
pub fn suggest_mine_by_constraint_overlap(obs: &Observation) -> Option<Coord2> {
    constraint_overlap_mine(obs, &build_constraints(obs))
}

fn constraint_overlap_mine(obs: &Observation, constraints: &[ClueConstraint]) -> Option<Coord2> {
    let mut by_clue: Array2<Option<usize>> = Array2::from_elem(obs.size.to_nd_index(), None);
    for (index, constraint) in constraints.iter().enumerate() {
        by_clue[constraint.clue.to_nd_index()] = Some(index);
    }

    for first in constraints.iter().filter(|constraint| constraint.is_consistent()) {
        for neighbor in obs.iter_neighbors(first.clue) {
            let Some(second) = by_clue[neighbor.to_nd_index()].map(|index| &constraints[index])
            else {
                continue;
            };
            if !second.is_consistent() {
                continue;
            }
            if let Some(mine) = overlap_mine(first, second) {
                log::trace!(
                    "overlap of {:?} and {:?} proves mine at {:?}",
                    first.clue,
                    second.clue,
                    mine
                );
                return Some(mine);
            }
        }
    }
    None
}

fn overlap_mine(first: &ClueConstraint, second: &ClueConstraint) -> Option<Coord2> {
    let (unique_first, common): (NeighborList, NeighborList) = first
        .unknown
        .iter()
        .copied()
        .partition(|cell| !second.unknown.contains(cell));
    if common.is_empty() {
        return None;
    }
    let unique_second = second
        .unknown
        .iter()
        .filter(|&cell| !first.unknown.contains(cell))
        .count() as i16;

    let common_len = common.len() as i16;
    let unique_first_len = unique_first.len() as i16;

    let shared_cap = common_len.min(second.remaining);
    if unique_first_len > 0 && first.remaining - shared_cap == unique_first_len {
        return unique_first.first().copied();
    }

    if second.remaining > unique_second && second.remaining - unique_second == common_len {
        return common.first().copied();
    }

    None
}

/// Mine-count pass: when the unflagged mines left equal the unknown cells
/// left, every unknown cell is a mine.
pub fn suggest_mine_by_mine_count(obs: &Observation) -> Option<Coord2> {
    let total = obs.mine_count?;
    let remaining = total.checked_sub(obs.flag_count())?;
    if remaining == 0 {
        return None;
    }

    let mut unknown = iter_coords(obs.size).filter(|&coords| obs.is_unknown(coords));
    let first = unknown.next()?;
    let unknown_count = 1 + unknown.count() as CellCount;
    (unknown_count == remaining).then_some(first)
}

/// First provable mine from the visible state, trying the passes from
/// cheapest to broadest.
pub fn suggest_certain_mine(obs: &Observation) -> Option<Coord2> {
    suggest_certain_mine_with(obs, DeductionRules::default())
}

pub fn suggest_certain_mine_with(obs: &Observation, rules: DeductionRules) -> Option<Coord2> {
    let constraints = build_constraints(obs);
    single_constraint_mine(&constraints)
        .or_else(|| constraint_overlap_mine(obs, &constraints))
        .or_else(|| match rules {
            DeductionRules::ClueOnly => None,
            DeductionRules::WithMineCount => suggest_mine_by_mine_count(obs),
        })
}
