//! Argument structs shared between CLI commands.

mod tone;

pub use tone::ToneArgs;
