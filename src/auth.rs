//! Credentials presented to the Buildkite API.

pub mod token;

pub use token::*;
