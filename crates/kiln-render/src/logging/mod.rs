//! Logging setup for binaries embedding the renderer.
//!
//! The crate itself only logs through the `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
