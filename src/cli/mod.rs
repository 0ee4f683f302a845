//! CLI module for Symbiont
//!
//! Handles command-line argument parsing and the optional configuration file.

pub mod args;
pub mod config;

pub use args::{Args, Verbosity};
pub use config::Config;
