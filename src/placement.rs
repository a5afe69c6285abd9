pub mod solver;

pub use solver::{Anchor, ConstraintAdjustment, Positioner, place};

#[cfg(test)]
mod tests;
