//! Core library components.
//!
//! Secret discovery, env file materialization and the extension lifecycle.

pub mod config;
pub mod constants;
pub mod env;
pub mod lifecycle;
pub mod secrets;
pub mod signal;
