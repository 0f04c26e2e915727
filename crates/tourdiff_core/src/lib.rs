//! Decomposes the difference between two TSP tours into independent,
//! feasibility-preserving k-moves, with the 2-opt / double-bridge search glue
//! used to produce tours worth comparing.

pub mod diff;
mod error;
pub mod geometry;
mod io;
pub mod logging;
pub mod search;
pub mod tour;

pub(crate) use io::options;

pub use diff::{KMove, Segment, decompose, decompose_with, evaluate};
pub use error::{Error, Result};
pub use geometry::Point;
pub use io::options::{LogFormat, LogLevel, SolverOptions};
pub use io::problem::{Problem, parse_problem, read_problem};
pub use search::{ClimbConfig, ClimbStats, perturbed_hill_climb};
pub use tour::{Edge, TourDiff, tour_difference};
