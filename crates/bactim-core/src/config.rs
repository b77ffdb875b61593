//! Configuration types for the simulation.
//!
//! Every table the model needs is plain data handed to constructors. The
//! `Default` impls describe a laboratory scenario: an LB-like medium shared by
//! two populations built from one genome definition.

use crate::error::Result;
use crate::types::{Bound, ResourceBounds, ResourceMap, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Stoichiometry of one reaction, in moles per reaction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionConfig {
    pub reactants: BTreeMap<Species, f64>,
    pub products: BTreeMap<Species, f64>,
}

impl ReactionConfig {
    pub fn new(reactants: &[(&str, f64)], products: &[(&str, f64)]) -> Self {
        Self {
            reactants: reactants.iter().map(|(s, n)| (Species::from(*s), *n)).collect(),
            products: products.iter().map(|(s, n)| (Species::from(*s), *n)).collect(),
        }
    }
}

/// Payload of a tolerance-modifier operon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    pub species: Species,
    pub bound: Bound,
    pub offset: f64,
}

/// Raw operon effect as it appears in configuration files.
///
/// Which shape is valid depends on the operon's function tag; the pairing is
/// checked when the operon is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectConfig {
    /// Species id for transporters, marker string for misc operons
    Name(String),
    Reaction(ReactionConfig),
    Tolerance(ToleranceConfig),
}

/// One operon entry of a gene list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperonConfig {
    pub name: String,
    /// Length in base pairs
    pub size_bp: u64,
    /// One of "pas", "act", "rxn", "mod", "misc"
    pub function: String,
    pub effect: EffectConfig,
    /// ATP hydrolysed per mole moved (active transport only)
    #[serde(default)]
    pub energy_cost_per_mole: f64,
}

impl OperonConfig {
    fn with(name: &str, size_bp: u64, function: &str, effect: EffectConfig, cost: f64) -> Self {
        Self {
            name: name.to_string(),
            size_bp,
            function: function.to_string(),
            effect,
            energy_cost_per_mole: cost,
        }
    }

    pub fn passive(name: &str, size_bp: u64, species: &str) -> Self {
        Self::with(name, size_bp, "pas", EffectConfig::Name(species.to_string()), 0.0)
    }

    pub fn active(name: &str, size_bp: u64, species: &str, energy_cost_per_mole: f64) -> Self {
        Self::with(
            name,
            size_bp,
            "act",
            EffectConfig::Name(species.to_string()),
            energy_cost_per_mole,
        )
    }

    pub fn reaction(name: &str, size_bp: u64, reaction: ReactionConfig) -> Self {
        Self::with(name, size_bp, "rxn", EffectConfig::Reaction(reaction), 0.0)
    }

    pub fn modifier(name: &str, size_bp: u64, species: &str, bound: Bound, offset: f64) -> Self {
        Self::with(
            name,
            size_bp,
            "mod",
            EffectConfig::Tolerance(ToleranceConfig {
                species: Species::from(species),
                bound,
                offset,
            }),
            0.0,
        )
    }

    pub fn misc(name: &str, size_bp: u64, marker: &str) -> Self {
        Self::with(name, size_bp, "misc", EffectConfig::Name(marker.to_string()), 0.0)
    }
}

/// Shared environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    /// Volume in litres
    pub volume: f64,
    /// Bulk concentrations in mol/L
    pub resources: ResourceMap,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "Lab".to_string(),
            volume: 1.0,
            resources: lb_medium(),
        }
    }
}

/// Initial state of one population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismConfig {
    pub name: String,
    /// Number of cells (fractional populations are allowed)
    pub count: f64,
    /// Volume of a single cell in litres
    pub cell_volume: f64,
    /// Tolerance table with the initial internal concentrations
    pub resources: BTreeMap<Species, ResourceBounds>,
}

impl OrganismConfig {
    pub fn new(name: &str, count: f64) -> Self {
        Self {
            name: name.to_string(),
            count,
            cell_volume: DEFAULT_CELL_VOLUME,
            resources: bacterial_cytoplasm(),
        }
    }
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self::new("E. coli", 100.0)
    }
}

/// Volume of a rod-shaped bacterium, in litres
pub const DEFAULT_CELL_VOLUME: f64 = 6.5e-16;

/// Complete description of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of cycles to run
    pub num_ticks: u64,
    /// Emit a population snapshot every this many ticks (0 disables)
    pub log_interval: u64,
    pub environment: EnvironmentConfig,
    /// Gene list shared by every population, in priority order
    pub genome: Vec<OperonConfig>,
    /// Populations in registration order
    pub organisms: Vec<OrganismConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 1_000,
            log_interval: 100,
            environment: EnvironmentConfig::default(),
            genome: default_genome(),
            organisms: vec![
                OrganismConfig::new("E. coli", 100.0),
                OrganismConfig::new("C. diff", 200.0),
            ],
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            organisms = config.organisms.len(),
            operons = config.genome.len(),
            "Loaded simulation configuration"
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Named reactions available to the default gene list
pub fn default_reactions() -> BTreeMap<String, ReactionConfig> {
    let mut reactions = BTreeMap::new();
    reactions.insert(
        "Aerobic respiration".to_string(),
        ReactionConfig::new(
            &[("Glc", 1.0), ("O2", 6.0), ("ADP", 38.0), ("P", 38.0)],
            &[("CO2", 6.0), ("ATP", 38.0)],
        ),
    );
    reactions.insert(
        "Alcohol fermentation".to_string(),
        ReactionConfig::new(
            &[("Glc", 1.0), ("ADP", 2.0), ("P", 2.0)],
            &[("EtOH", 2.0), ("CO2", 2.0), ("ATP", 2.0)],
        ),
    );
    reactions.insert(
        "ATP hydrolysis".to_string(),
        ReactionConfig::new(&[("ATP", 1.0)], &[("ADP", 1.0), ("P", 1.0)]),
    );
    reactions.insert(
        "Photosynthesis".to_string(),
        ReactionConfig::new(&[("CO2", 6.0)], &[("Glc", 1.0), ("O2", 6.0)]),
    );
    reactions.insert(
        "ADP production".to_string(),
        ReactionConfig::new(&[("N", 5.0), ("P", 2.0)], &[("ADP", 1.0)]),
    );
    reactions.insert(
        "AA degradation".to_string(),
        ReactionConfig::new(&[("AAs", 2.0)], &[("N", 3.0)]),
    );
    reactions.insert(
        "AA production".to_string(),
        ReactionConfig::new(&[("N", 3.0)], &[("AAs", 2.0)]),
    );
    reactions
}

/// Gene list of a heterotrophic bacterium.
///
/// Diffusion and irradiation entries stand for physical processes rather than
/// gene products. Transporters come before enzymes of the same resource so
/// that uptake gets first claim on ATP.
pub fn default_genome() -> Vec<OperonConfig> {
    let reactions = default_reactions();
    let reaction = |name: &str| reactions[name].clone();

    vec![
        OperonConfig::passive("CO2 diffusion", 1_000_000, "CO2"),
        OperonConfig::passive("O2 diffusion", 0, "O2"),
        OperonConfig::passive("Temp diffusion", 0, "Temp"),
        OperonConfig::passive("EtOH diffusion", 0, "EtOH"),
        OperonConfig::passive("Irradiation", 0, "Lux"),
        OperonConfig::passive("Glucose channel", 500, "Glc"),
        OperonConfig::active("Glucose transporter", 500, "Glc", 1.0),
        OperonConfig::active("H+ transporter", 500, "H+", 0.3),
        OperonConfig::active("K+ transporter", 500, "K+", 0.3),
        OperonConfig::active("Na+ transporter", 500, "Na+", 0.5),
        OperonConfig::active("Cl- transporter", 500, "Cl-", 0.5),
        OperonConfig::passive("Amino acid channel", 500, "AAs"),
        OperonConfig::active("Amino acid transporter", 500, "AAs", 1.0),
        OperonConfig::passive("Na+ channel", 500, "Na+"),
        OperonConfig::passive("K+ channel", 500, "K+"),
        OperonConfig::passive("Cl- channel", 500, "Cl-"),
        OperonConfig::passive("P channel", 500, "P"),
        OperonConfig::reaction("Aerobic respiration", 1_000, reaction("Aerobic respiration")),
        OperonConfig::reaction("ADP production", 1_000, reaction("ADP production")),
        OperonConfig::reaction("AA degradation", 1_000, reaction("AA degradation")),
        OperonConfig::reaction("AA production", 1_000, reaction("AA production")),
        OperonConfig::misc("DNA polymerase", 1_000, "DNAPol"),
    ]
}

/// Bulk concentrations of lysogeny broth, in mol/L (temperature in °C)
pub fn lb_medium() -> ResourceMap {
    [
        ("H+", 3.98e-8),
        ("CO2", 0.0),
        ("O2", 2.5e-4),
        ("EtOH", 0.0),
        ("Temp", 37.0),
        ("Lux", 0.0),
        ("Glc", 3e-3),
        ("Fru", 0.0),
        ("Lac", 0.0),
        ("AAs", 9.6e-2),
        ("N", 0.0),
        ("P", 0.0),
        ("ATP", 0.0),
        ("ADP", 0.0),
        ("Na+", 3e-3),
        ("K+", 5e-3),
        ("Cl-", 3e-3),
    ]
    .into_iter()
    .map(|(species, conc)| (Species::from(species), conc))
    .collect()
}

/// Internal tolerance table of an enteric bacterium, in mol/L
pub fn bacterial_cytoplasm() -> BTreeMap<Species, ResourceBounds> {
    // (current, min_live, min_grow, ideal, max_grow, max_live)
    [
        ("H+", (3.16e-8, 1e-8, 1.58e-8, 3.16e-8, 6.31e-8, 1e-7)),
        ("ATP", (8e-3, 5e-4, 2e-3, 8e-3, 1e-2, 2e-2)),
        ("ADP", (1e-3, 0.0, 1e-4, 1e-3, 5e-3, 1e-2)),
        ("P", (1e-3, 0.0, 0.0, 1e-3, 1e-2, 1e-1)),
        ("CO2", (0.0, 0.0, 0.0, 0.0, 1e-3, 1e-2)),
        ("O2", (0.0, 0.0, 0.0, 0.0, 1e-3, 1e-2)),
        ("EtOH", (0.0, 0.0, 0.0, 0.0, 1e-2, 1e-1)),
        ("Temp", (37.0, 10.0, 20.0, 37.0, 45.0, 55.0)),
        ("Lux", (0.0, 0.0, 0.0, 0.0, 1e5, 1e6)),
        ("Glc", (8e-3, 0.0, 1e-3, 5e-3, 1e-2, 2e-2)),
        ("AAs", (1.5e-1, 1e-2, 1e-1, 1.5e-1, 2e-1, 3e-1)),
        ("N", (0.0, 0.0, 0.0, 1e-3, 1e-2, 1e-1)),
        ("Na+", (5e-3, 0.0, 1e-3, 5e-3, 2e-2, 1e-1)),
        ("K+", (2e-1, 5e-2, 1e-1, 2e-1, 3e-1, 5e-1)),
        ("Cl-", (5e-3, 0.0, 1e-3, 5e-3, 2e-2, 1e-1)),
    ]
    .into_iter()
    .map(|(species, (cur, min_live, min_grow, ideal, max_grow, max_live))| {
        (
            Species::from(species),
            ResourceBounds::new(cur, min_live, min_grow, ideal, max_grow, max_live),
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert_eq!(config.num_ticks, 1_000);
        assert_eq!(config.organisms.len(), 2);
        assert_eq!(config.organisms[1].count, 200.0);
        assert_eq!(config.environment.volume, 1.0);
        assert_eq!(config.genome.first().map(|op| op.name.as_str()), Some("CO2 diffusion"));
    }

    #[test]
    fn test_default_tables_are_ordered() {
        for (species, bounds) in bacterial_cytoplasm() {
            assert!(bounds.validate(&species).is_ok(), "{} is out of order", species);
        }
    }

    #[test]
    fn test_default_genome_species_are_tracked() {
        let cell = bacterial_cytoplasm();
        for op in default_genome() {
            match &op.effect {
                EffectConfig::Name(name) if op.function != "misc" => {
                    assert!(cell.contains_key(name.as_str()), "{} untracked", name);
                }
                EffectConfig::Reaction(rxn) => {
                    for species in rxn.reactants.keys().chain(rxn.products.keys()) {
                        assert!(cell.contains_key(species), "{} untracked", species);
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_effect_config_shapes() {
        let name: EffectConfig = serde_json::from_str("\"Glc\"").unwrap();
        assert_eq!(name, EffectConfig::Name("Glc".to_string()));

        let rxn: EffectConfig =
            serde_json::from_str(r#"{"reactants": {"ATP": 1}, "products": {"ADP": 1, "P": 1}}"#)
                .unwrap();
        assert!(matches!(rxn, EffectConfig::Reaction(_)));

        let tol: EffectConfig =
            serde_json::from_str(r#"{"species": "H+", "bound": "max_live", "offset": 1e-8}"#)
                .unwrap();
        assert!(matches!(tol, EffectConfig::Tolerance(_)));
    }

    #[test]
    fn test_simulation_config_serialization() {
        let config = SimulationConfig::default();
        let json = config.to_json_pretty().unwrap();
        let deserialized = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_energy_cost_defaults_to_zero() {
        let op: OperonConfig = serde_json::from_str(
            r#"{"name": "Glucose channel", "size_bp": 500, "function": "pas", "effect": "Glc"}"#,
        )
        .unwrap();
        assert_eq!(op.energy_cost_per_mole, 0.0);
    }

    #[test]
    fn test_missing_config_file() {
        let result = SimulationConfig::from_json_file("/nonexistent/bactim.json");
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
