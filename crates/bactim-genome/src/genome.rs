//! Genome: an ordered operon list with precomputed summaries.

use crate::operon::{FunctionKind, Gate, Operon};
use crate::validation::validate_genome;
use bactim_core::{OperonConfig, Result};

/// Base pairs one DNA polymerase copies per second
pub const BP_PER_SECOND_PER_POLYMERASE: f64 = 1000.0;
/// Simulated time covered by one cycle, in seconds
pub const SECONDS_PER_TICK: f64 = 60.0;

/// Immutable genome definition, shareable between populations.
///
/// Operons keep their registration order, both in `operons()` and inside each
/// function bucket. Organisms process transporters and enzymes in this order,
/// so an earlier operon can starve a later one.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    operons: Vec<Operon>,
    passive: Vec<usize>,
    active: Vec<usize>,
    reactions: Vec<usize>,
    modifiers: Vec<usize>,
    misc: Vec<usize>,
    size_bp: u64,
    dna_polymerases: usize,
}

impl Genome {
    pub fn new(operons: Vec<Operon>) -> Result<Self> {
        let mut genome = Self {
            operons: Vec::new(),
            passive: Vec::new(),
            active: Vec::new(),
            reactions: Vec::new(),
            modifiers: Vec::new(),
            misc: Vec::new(),
            size_bp: 0,
            dna_polymerases: 0,
        };

        for (idx, op) in operons.iter().enumerate() {
            let bucket = match op.kind() {
                FunctionKind::Passive => &mut genome.passive,
                FunctionKind::Active => &mut genome.active,
                FunctionKind::Reaction => &mut genome.reactions,
                FunctionKind::Modifier => &mut genome.modifiers,
                FunctionKind::Misc => &mut genome.misc,
            };
            bucket.push(idx);
            genome.size_bp += op.size_bp;
            if op.is_dna_polymerase() {
                genome.dna_polymerases += 1;
            }
        }
        genome.operons = operons;

        validate_genome(&genome)?;
        Ok(genome)
    }

    /// Build a genome from a gene list. The first invalid entry aborts the
    /// whole construction.
    pub fn from_config(configs: &[OperonConfig]) -> Result<Self> {
        let operons = configs
            .iter()
            .map(Operon::from_config)
            .collect::<Result<Vec<_>>>()?;
        Self::new(operons)
    }

    /// All operons in registration order
    pub fn operons(&self) -> &[Operon] {
        &self.operons
    }

    pub fn len(&self) -> usize {
        self.operons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operons.is_empty()
    }

    /// Operons of one function, in registration order
    pub fn of_kind(&self, kind: FunctionKind) -> impl Iterator<Item = &Operon> + '_ {
        let bucket = match kind {
            FunctionKind::Passive => &self.passive,
            FunctionKind::Active => &self.active,
            FunctionKind::Reaction => &self.reactions,
            FunctionKind::Modifier => &self.modifiers,
            FunctionKind::Misc => &self.misc,
        };
        bucket.iter().map(move |&idx| &self.operons[idx])
    }

    pub fn passive(&self) -> impl Iterator<Item = &Operon> + '_ {
        self.of_kind(FunctionKind::Passive)
    }

    pub fn active(&self) -> impl Iterator<Item = &Operon> + '_ {
        self.of_kind(FunctionKind::Active)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Operon> + '_ {
        self.of_kind(FunctionKind::Reaction)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &Operon> + '_ {
        self.of_kind(FunctionKind::Modifier)
    }

    pub fn misc(&self) -> impl Iterator<Item = &Operon> + '_ {
        self.of_kind(FunctionKind::Misc)
    }

    pub fn num_passive(&self) -> usize {
        self.passive.len()
    }

    /// Total genome length in base pairs
    pub fn size_bp(&self) -> u64 {
        self.size_bp
    }

    pub fn dna_polymerases(&self) -> usize {
        self.dna_polymerases
    }

    /// Fresh gate vector for a new organism, one gate per passive operon in
    /// `passive()` order
    pub fn gate_template(&self) -> Vec<Gate> {
        self.passive().map(Operon::gate).collect()
    }

    /// Fraction of the genome the polymerases can copy in one tick
    pub fn replication_factor(&self) -> f64 {
        let throughput =
            SECONDS_PER_TICK * BP_PER_SECOND_PER_POLYMERASE * self.dna_polymerases as f64;
        throughput / self.size_bp as f64
    }
}
