//! Ecosystem simulation engine.
//!
//! Populations of bacteria share one environment. Each cycle they gate their
//! channels, equilibrate with the bulk medium, pump resources at an ATP cost,
//! run their enzymes and finally grow or die.

pub mod organism;
pub mod environment;
pub mod ecosystem;
pub mod runner;

pub use organism::Organism;
pub use environment::Environment;
pub use ecosystem::{CycleReport, Ecosystem};
pub use runner::{PopulationRecord, RunSummary, Runner};
