//! Core types and utilities for the Bactim microbial ecosystem simulator.

pub mod types;
pub mod config;
pub mod error;
pub mod history;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use history::*;
