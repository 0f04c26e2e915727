pub mod options;
pub mod problem;
