//! Organism populations: per-cycle channel gating, transport, metabolism and
//! growth.

use bactim_core::{
    Contribution, Error, OrganismConfig, OrganismId, PopulationSummary, ResourceBounds,
    ResourceMap, Result, Species, ADP, ATP, PHOSPHATE,
};
use bactim_genome::{validate_tolerances, Gate, Genome};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Growth factor subtracted for every species outside its livable range
pub const DEATH_PENALTY: f64 = 0.1;

/// A population of identical cells.
///
/// The genome definition is shared; gates, resources and count belong to this
/// population alone.
#[derive(Debug, Clone)]
pub struct Organism {
    pub id: OrganismId,
    pub name: String,
    count: f64,
    cell_volume: f64,
    genome: Arc<Genome>,
    gates: Vec<Gate>,
    resources: BTreeMap<Species, ResourceBounds>,
    growth_factor: f64,
    dying: bool,
}

impl Organism {
    pub fn new(
        name: impl Into<String>,
        genome: Arc<Genome>,
        mut resources: BTreeMap<Species, ResourceBounds>,
        count: f64,
        cell_volume: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !count.is_finite() || count < 0.0 {
            return Err(Error::Configuration(format!(
                "organism '{}' has invalid count {}",
                name, count
            )));
        }
        if !cell_volume.is_finite() || cell_volume <= 0.0 {
            return Err(Error::Configuration(format!(
                "organism '{}' has invalid cell volume {}",
                name, cell_volume
            )));
        }

        for modifier in genome.modifiers().filter_map(|op| op.modifier()) {
            if let Some(bounds) = resources.get_mut(&modifier.species) {
                bounds.shift(modifier.bound, modifier.offset);
            }
        }
        validate_tolerances(&genome, &resources)?;
        for bounds in resources.values_mut() {
            bounds.set_current(bounds.current);
        }

        Ok(Self {
            id: OrganismId::new(),
            name,
            count,
            cell_volume,
            gates: genome.gate_template(),
            genome,
            resources,
            growth_factor: 0.0,
            dying: false,
        })
    }

    pub fn from_config(config: &OrganismConfig, genome: Arc<Genome>) -> Result<Self> {
        Self::new(
            config.name.clone(),
            genome,
            config.resources.clone(),
            config.count,
            config.cell_volume,
        )
    }

    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn cell_volume(&self) -> f64 {
        self.cell_volume
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn resources(&self) -> &BTreeMap<Species, ResourceBounds> {
        &self.resources
    }

    pub fn resource(&self, species: &str) -> Option<&ResourceBounds> {
        self.resources.get(species)
    }

    /// Current internal concentration of a species
    pub fn concentration(&self, species: &str) -> Option<f64> {
        self.resources.get(species).map(|bounds| bounds.current)
    }

    /// Gates in `Genome::passive()` order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Growth factor applied by the last division
    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_extinct(&self) -> bool {
        self.count <= 0.0
    }

    /// Total volume of the population
    pub fn volume(&self) -> f64 {
        self.cell_volume * self.count
    }

    /// Moles of ATP that can be spent without dropping below the lethal floor
    pub fn atp_available(&self) -> f64 {
        self.resources
            .get(ATP)
            .map(|atp| ((atp.current - atp.min_live) * self.volume()).max(0.0))
            .unwrap_or(0.0)
    }

    /// Add (or remove, if negative) moles of a species. The concentration
    /// never drops below zero.
    pub fn add_res(&mut self, species: &str, moles: f64) {
        let volume = self.volume();
        if volume <= 0.0 {
            return;
        }
        if let Some(bounds) = self.resources.get_mut(species) {
            bounds.set_current(bounds.current + moles / volume);
        }
    }

    /// Hydrolyse ATP into ADP and inorganic phosphate, one to one to one
    pub fn use_atp(&mut self, moles: f64) {
        self.add_res(ATP, -moles);
        self.add_res(ADP, moles);
        self.add_res(PHOSPHATE, moles);
    }

    /// Whether any open passive channel carries `species`
    pub fn can_pass(&self, species: &str) -> bool {
        self.genome
            .passive()
            .zip(&self.gates)
            .any(|(op, gate)| {
                gate.is_open()
                    && op
                        .transported_species()
                        .is_some_and(|carried| carried.as_str() == species)
            })
    }

    /// Open/closed state of every passive channel, in genome order
    pub fn channels(&self) -> Vec<(&Species, bool)> {
        self.genome
            .passive()
            .zip(&self.gates)
            .filter_map(|(op, gate)| op.transported_species().map(|s| (s, gate.is_open())))
            .collect()
    }

    pub fn can_live(&self, species: &str) -> bool {
        self.resources
            .get(species)
            .is_some_and(|bounds| bounds.can_live(bounds.current))
    }

    pub fn can_grow(&self, species: &str) -> bool {
        self.resources
            .get(species)
            .is_some_and(|bounds| bounds.can_grow(bounds.current))
    }

    /// Moles needed to reach the ideal concentration (negative for a surplus)
    pub fn moles_required(&self, species: &str) -> f64 {
        self.resources
            .get(species)
            .map(|bounds| (bounds.ideal - bounds.current) * self.volume())
            .unwrap_or(0.0)
    }

    /// Open or close passive channels for the given bulk concentrations.
    ///
    /// A channel opens only when the outside is at least as good as the
    /// range the inside has fallen out of, and closes once the inside is
    /// growable. Diffusion channels ignore closing.
    pub fn set_channels(&mut self, bulk: &ResourceMap) {
        let genome = Arc::clone(&self.genome);
        for (op, gate) in genome.passive().zip(self.gates.iter_mut()) {
            let open = match op.transported_species() {
                Some(species) => match (self.resources.get(species), bulk.get(species)) {
                    (Some(bounds), Some(&outside)) => {
                        if !bounds.can_live(bounds.current) {
                            bounds.can_live(outside)
                        } else if !bounds.can_grow(bounds.current) {
                            bounds.can_grow(outside)
                        } else {
                            false
                        }
                    }
                    _ => false,
                },
                None => false,
            };

            if open {
                gate.turn_on();
            } else {
                gate.turn_off();
            }
        }
    }

    /// What this population offers to the diffusible pool, per species
    pub fn res_available(&self) -> BTreeMap<Species, Contribution> {
        let mut pool: BTreeMap<Species, Contribution> = self
            .resources
            .keys()
            .map(|species| (species.clone(), Contribution::CLOSED))
            .collect();

        let volume = self.volume();
        for (species, open) in self.channels() {
            if !open {
                continue;
            }
            if let Some(bounds) = self.resources.get(species) {
                pool.insert(
                    species.clone(),
                    Contribution {
                        moles: bounds.current * volume,
                        volume,
                    },
                );
            }
        }
        pool
    }

    /// Snap every open-channel species to the mixed bulk concentration
    pub fn diffuse_res(&mut self, bulk: &ResourceMap) {
        for (species, &conc) in bulk {
            if !self.can_pass(species.as_str()) {
                continue;
            }
            if let Some(bounds) = self.resources.get_mut(species) {
                bounds.set_current(conc);
            }
        }
    }

    /// Run active transporters against this population's share of the
    /// environment and return what is left of the share.
    ///
    /// Transporters run in genome order. Each one moves its species toward
    /// the ideal concentration, limited by the share on import and by the ATP
    /// held above the lethal floor. Species the share does not carry are
    /// skipped.
    pub fn exchange_res(&mut self, mut partition: ResourceMap) -> ResourceMap {
        let genome = Arc::clone(&self.genome);
        for op in genome.active() {
            let Some(species) = op.transported_species() else {
                continue;
            };
            let Some(&allotment) = partition.get(species) else {
                continue;
            };

            let mut moles = self.moles_required(species.as_str());
            if moles > 0.0 && moles > allotment {
                moles = allotment.max(0.0);
            }

            let mut atp = moles.abs() * op.energy_cost_per_mole;
            let affordable = self.atp_available();
            if atp > affordable {
                moles = moles.signum() * affordable / op.energy_cost_per_mole;
                atp = affordable;
                trace!(
                    organism = %self.name,
                    operon = %op.name,
                    moles,
                    "Active transport limited by ATP"
                );
            }

            if moles == 0.0 {
                continue;
            }

            self.add_res(species.as_str(), moles);
            self.use_atp(atp);
            if let Some(left) = partition.get_mut(species) {
                *left = (*left - moles).max(0.0);
            }
        }
        partition
    }

    /// Run every catalysed reaction once, in genome order.
    ///
    /// Products are made up to the ideal concentration (or, once there, up to
    /// the top of the growable range); reactants are spent only down to the
    /// bottom of the growable range.
    pub fn convert_res(&mut self) {
        let genome = Arc::clone(&self.genome);
        for reaction in genome.reactions().filter_map(|op| op.reaction()) {
            let volume = self.volume();
            let mut desired = Vec::new();

            // One entry per species, by the side it ends up on
            for species in reaction.species() {
                let net = reaction.net_coefficient(species.as_str());
                let Some(bounds) = self.resources.get(species) else {
                    continue;
                };
                if net > 0.0 {
                    let need = (bounds.ideal - bounds.current) * volume;
                    let wanted = if need > 0.0 {
                        need
                    } else {
                        ((bounds.max_grow - bounds.current) * volume).max(0.0)
                    };
                    desired.push((species.clone(), wanted));
                } else if net < 0.0 {
                    let spare = ((bounds.current - bounds.min_grow) * volume).max(0.0);
                    desired.push((species.clone(), spare));
                }
            }

            for (species, delta) in reaction.get_moles(&desired) {
                self.add_res(species.as_str(), delta);
            }
        }
    }

    /// Growth factor when nothing limits the population: the share of the
    /// genome the polymerases can copy in one tick
    pub fn calc_growth(&self) -> f64 {
        self.genome.replication_factor()
    }

    /// Grow or die for one tick and return the moles released by dying cells.
    ///
    /// Each lethal species costs [`DEATH_PENALTY`]; any species outside the
    /// growable range suppresses growth. Concentrations are diluted by
    /// `1 + |factor|`.
    pub fn divide(&mut self) -> ResourceMap {
        let mut factor = 0.0;
        let mut dying = false;
        let mut growable = true;
        for bounds in self.resources.values() {
            if !bounds.can_live(bounds.current) {
                factor -= DEATH_PENALTY;
                dying = true;
            }
            if !bounds.can_grow(bounds.current) {
                growable = false;
            }
        }
        if !dying && growable {
            factor = self.calc_growth();
        }

        self.count = (self.count * (1.0 + factor)).max(0.0);

        let volume = self.volume();
        let dilution = 1.0 + factor.abs();
        let mut released = ResourceMap::new();
        for (species, bounds) in self.resources.iter_mut() {
            let moles = if dying {
                bounds.current * factor.abs() * volume
            } else {
                0.0
            };
            released.insert(species.clone(), moles);
            bounds.set_current(bounds.current / dilution);
        }

        self.growth_factor = factor;
        self.dying = dying;
        released
    }

    /// Species currently outside the growable range
    pub fn limited_by(&self) -> Vec<Species> {
        self.resources
            .iter()
            .filter(|(_, bounds)| !bounds.can_grow(bounds.current))
            .map(|(species, _)| species.clone())
            .collect()
    }

    /// Species currently outside the livable range
    pub fn dying_from(&self) -> Vec<Species> {
        self.resources
            .iter()
            .filter(|(_, bounds)| !bounds.can_live(bounds.current))
            .map(|(species, _)| species.clone())
            .collect()
    }

    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary {
            id: self.id,
            name: self.name.clone(),
            count: self.count,
            growth_factor: self.growth_factor,
            limited_by: self.limited_by(),
            dying_from: self.dying_from(),
        }
    }
}
