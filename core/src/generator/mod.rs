use crate::*;
pub use logical::*;
pub use random::*;

mod logical;
mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}
