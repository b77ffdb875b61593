//! Gene model for simulated bacteria.
//!
//! A genome is an ordered list of operons. Each operon either moves a species
//! across the membrane (passively or at an ATP cost), catalyses a reaction,
//! shifts a tolerance threshold, or marks a piece of replication machinery.
//! The list order is the priority order in which an organism runs its
//! transporters and enzymes.

pub mod reaction;
pub mod operon;
pub mod genome;
pub mod validation;

pub use reaction::Reaction;
pub use operon::{FunctionKind, Gate, MiscMarker, Operon, OperonFunction, ToleranceModifier};
pub use genome::Genome;
pub use validation::{validate_genome, validate_tolerances};
