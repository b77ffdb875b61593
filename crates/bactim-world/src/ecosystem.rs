//! One environment, many populations, one cycle per tick.

use crate::environment::Environment;
use crate::organism::Organism;
use bactim_core::{
    Error, OrganismId, PopulationHistory, PopulationSummary, ResourceMap, Result,
    SimulationConfig, LIGHT,
};
use bactim_genome::Genome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Tick the cycle ran as
    pub tick: u64,
    /// Populations after division, in registration order
    pub summaries: Vec<PopulationSummary>,
    /// Moles returned to the medium by dying cells, summed over populations
    pub released: ResourceMap,
}

pub struct Ecosystem {
    organisms: Vec<Organism>,
    environment: Environment,
    tracker: HashMap<OrganismId, PopulationHistory>,
    tick: u64,
}

impl Ecosystem {
    pub fn new(environment: Environment) -> Self {
        Self {
            organisms: Vec::new(),
            environment,
            tracker: HashMap::new(),
            tick: 0,
        }
    }

    /// Build the environment and every population of a configuration. All
    /// populations share one genome definition.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let genome = Arc::new(Genome::from_config(&config.genome)?);
        let mut ecosystem = Self::new(Environment::from_config(&config.environment)?);

        for organism_config in &config.organisms {
            let organism = Organism::from_config(organism_config, Arc::clone(&genome))?;
            ecosystem.add_organism(organism)?;
        }

        debug!(
            environment = %ecosystem.environment.name,
            organisms = ecosystem.organisms.len(),
            genome_bp = genome.size_bp(),
            "Built ecosystem"
        );
        Ok(ecosystem)
    }

    /// Register a population. Populations are processed in registration order.
    ///
    /// Fails if a population with the same id is already registered.
    pub fn add_organism(&mut self, organism: Organism) -> Result<OrganismId> {
        let id = organism.id;
        if self.tracker.contains_key(&id) {
            return Err(Error::AlreadyExists(format!(
                "organism {} ('{}')",
                id, organism.name
            )));
        }
        self.tracker.insert(id, PopulationHistory::new());
        self.organisms.push(organism);
        Ok(id)
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn organism(&self, id: OrganismId) -> Result<&Organism> {
        self.organisms
            .iter()
            .find(|organism| organism.id == id)
            .ok_or_else(|| Error::NotFound(format!("organism {}", id)))
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Counts recorded at the start of every cycle
    pub fn history(&self, id: OrganismId) -> Result<&PopulationHistory> {
        self.tracker
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("history for organism {}", id)))
    }

    /// Number of completed cycles
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn total_volume(&self) -> f64 {
        self.organisms.iter().map(Organism::volume).sum()
    }

    /// True once every registered population has died out
    pub fn is_extinct(&self) -> bool {
        !self.organisms.is_empty() && self.organisms.iter().all(Organism::is_extinct)
    }

    /// Advance the simulation by one tick.
    ///
    /// Fails before touching any state if the populations have no volume to
    /// partition the medium over.
    pub fn cycle(&mut self) -> Result<CycleReport> {
        if !self.organisms.is_empty() {
            let total = self.total_volume();
            if !total.is_finite() || total <= 0.0 {
                return Err(Error::PartitionDomain(format!(
                    "populations have total volume {} at tick {}",
                    total, self.tick
                )));
            }
        }

        // Record counts and gate channels against the current medium
        for organism in self.organisms.iter_mut() {
            self.tracker
                .entry(organism.id)
                .or_default()
                .record(organism.count());
            organism.set_channels(self.environment.resources());
        }

        // Mix the medium with every open channel. Light is not a pooled
        // quantity and is restored at the end of the cycle.
        let light = self.environment.concentration(LIGHT);
        let pools: Vec<_> = self.organisms.iter().map(Organism::res_available).collect();
        self.environment.equilibrate(&pools);
        debug!(tick = self.tick, "Equilibrated diffusible pool");

        let bulk = self.environment.resources();
        for organism in self.organisms.iter_mut() {
            organism.diffuse_res(bulk);
        }

        let partitions = self.environment.partition(&self.organisms)?;
        let returned: Vec<ResourceMap> = self
            .organisms
            .iter_mut()
            .zip(partitions)
            .map(|(organism, partition)| organism.exchange_res(partition))
            .collect();
        self.environment.update(&returned);
        debug!(tick = self.tick, "Completed active transport");

        let mut released = ResourceMap::new();
        for organism in self.organisms.iter_mut() {
            organism.convert_res();

            let was_dying = organism.is_dying();
            let dead_matter = organism.divide();
            if organism.is_dying() && !was_dying {
                warn!(
                    tick = self.tick,
                    organism = %organism.name,
                    dying_from = ?organism.dying_from(),
                    "Population started dying"
                );
            }

            for (species, moles) in dead_matter {
                self.environment.add_res(species.as_str(), moles);
                *released.entry(species).or_insert(0.0) += moles;
            }
        }

        if let Some(light) = light {
            self.environment.set_concentration(LIGHT, light);
        }

        let report = CycleReport {
            tick: self.tick,
            summaries: self.organisms.iter().map(Organism::summary).collect(),
            released,
        };
        self.tick += 1;
        Ok(report)
    }
}
