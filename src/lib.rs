//! clipforge - interactive ffmpeg front-end
//!
//! This library crate exposes the front-end pieces for integration testing.

pub mod config;
pub mod session;
pub mod terminal;
