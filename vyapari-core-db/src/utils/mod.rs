pub mod day_range;

pub use day_range::*;
