//! The `utils` module provides a collection of utility functions and common
//! definitions used across the crate.
//!
//! It holds the crate-wide error type and the logging bootstrap shared by
//! both programs.

pub mod error;
pub mod logging;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
