//! Parsing functions for CLI arguments.

mod points;

pub use points::{broadcast_point, parse_channel_vector};
