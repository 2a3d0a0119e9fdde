use alloc::vec::Vec;
use rand::prelude::*;

use super::*;

/// Scatters mines uniformly at random, without replacement.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let total_cells = config.total_cells() as usize;
        let mut mines = config.mines as usize;

        if mines > total_cells {
            log::warn!(
                "Minefield overfull, requested {} but only fits {}",
                mines,
                total_cells
            );
            mines = total_cells;
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let cols = config.cols as usize;
        let coords: Vec<Coord2> = rand::seq::index::sample(&mut rng, total_cells, mines)
            .into_iter()
            .map(|index| ((index / cols) as Coord, (index % cols) as Coord))
            .collect();

        // sampled indices are distinct and in bounds
        MineLayout::from_mine_coords(config.size(), &coords)
            .expect("sampled mine coordinates should be in bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_exactly_the_requested_mines() {
        for seed in 0..20 {
            let layout = RandomMinefieldGenerator::new(seed).generate(GameConfig::EXPERT);

            assert_eq!(layout.mine_count(), 99);
            assert_eq!(layout.size(), (16, 30));
            let grid_mines = layout.truth_grid().iter().filter(|truth| truth.is_mine()).count();
            assert_eq!(grid_mines, 99);
        }
    }

    #[test]
    fn numbers_agree_with_the_roster() {
        let layout = RandomMinefieldGenerator::new(7).generate(GameConfig::INTERMEDIATE);

        for coords in iter_coords(layout.size()) {
            match layout.truth_at(coords) {
                CellTruth::Mine => assert!(layout.mines().contains(&coords)),
                CellTruth::Empty => assert_eq!(layout.count_adjacent_mines(coords), 0),
                CellTruth::Number(count) => {
                    assert!(count > 0);
                    assert_eq!(layout.count_adjacent_mines(coords), count);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let first = RandomMinefieldGenerator::new(42).generate(GameConfig::BEGINNER);
        let second = RandomMinefieldGenerator::new(42).generate(GameConfig::BEGINNER);

        assert_eq!(first, second);
    }

    #[test]
    fn overfull_request_is_clamped() {
        let layout = RandomMinefieldGenerator::new(1).generate(GameConfig::new(2, 2, 9));

        assert_eq!(layout.mine_count(), 4);
    }
}
