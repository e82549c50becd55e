pub mod materialize;

pub use materialize::*;
