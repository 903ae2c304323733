//! yagopherd configuration library
//!
//! Resolves the gopher daemon's runtime settings from CLI flags, environment
//! variables, an optional config file and built-in defaults.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
