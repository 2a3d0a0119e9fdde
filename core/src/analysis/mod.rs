pub use deduction::*;
pub use hint::*;
pub use observation::*;
pub use solver::*;

mod deduction;
mod hint;
mod observation;
mod solver;
