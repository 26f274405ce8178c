//! Long-lived business workflows built over swappable store traits.

pub mod review;
