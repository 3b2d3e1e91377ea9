//! Command implementations for the negfix CLI.

mod analyze;
mod batch;
mod convert;
mod init;

// Re-export all command functions
pub use analyze::cmd_analyze;
pub use batch::cmd_batch;
pub use convert::cmd_convert;
pub use init::cmd_init;
