//! Local search that produces pairs of nearby local optima worth decomposing.

pub mod hill_climb;
pub mod perturb;
pub mod two_opt;

pub use hill_climb::{ClimbConfig, ClimbStats, perturbed_hill_climb};
pub use perturb::double_bridge;
pub use two_opt::optimize;
