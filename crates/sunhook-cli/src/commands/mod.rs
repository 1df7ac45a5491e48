//! CLI command implementations.

pub mod regions;
pub mod status;
pub mod watch;
