//! Operons and per-organism channel gates.

use crate::reaction::Reaction;
use bactim_core::{Bound, EffectConfig, Error, OperonConfig, Result, Species};
use std::fmt;
use std::str::FromStr;

/// Marker string identifying DNA polymerase among misc operons
pub const DNA_POLYMERASE_MARKER: &str = "DNAPol";

/// Function tag of an operon, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Passive,
    Active,
    Reaction,
    Modifier,
    Misc,
}

impl FunctionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FunctionKind::Passive => "pas",
            FunctionKind::Active => "act",
            FunctionKind::Reaction => "rxn",
            FunctionKind::Modifier => "mod",
            FunctionKind::Misc => "misc",
        }
    }
}

impl FromStr for FunctionKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "pas" => Ok(FunctionKind::Passive),
            "act" => Ok(FunctionKind::Active),
            "rxn" => Ok(FunctionKind::Reaction),
            "mod" => Ok(FunctionKind::Modifier),
            "misc" => Ok(FunctionKind::Misc),
            other => Err(Error::Configuration(format!(
                "operon function must be 'pas', 'act', 'rxn', 'mod' or 'misc', got '{}'",
                other
            ))),
        }
    }
}

/// Shift applied to one tolerance threshold of an organism
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceModifier {
    pub species: Species,
    pub bound: Bound,
    pub offset: f64,
}

/// Replication or housekeeping machinery with no transport or catalytic role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiscMarker {
    DnaPolymerase,
    Other(String),
}

impl From<&str> for MiscMarker {
    fn from(marker: &str) -> Self {
        if marker == DNA_POLYMERASE_MARKER {
            MiscMarker::DnaPolymerase
        } else {
            MiscMarker::Other(marker.to_string())
        }
    }
}

/// What an operon does, with a payload typed by function
#[derive(Debug, Clone, PartialEq)]
pub enum OperonFunction {
    /// Channel letting a species equilibrate with the environment
    Passive(Species),
    /// ATP-driven pump moving a species toward its ideal concentration
    Active(Species),
    /// Enzyme catalysing a reaction
    Reaction(Reaction),
    /// Tolerance shift applied when an organism is built
    Modifier(ToleranceModifier),
    Misc(MiscMarker),
}

impl OperonFunction {
    pub fn kind(&self) -> FunctionKind {
        match self {
            OperonFunction::Passive(_) => FunctionKind::Passive,
            OperonFunction::Active(_) => FunctionKind::Active,
            OperonFunction::Reaction(_) => FunctionKind::Reaction,
            OperonFunction::Modifier(_) => FunctionKind::Modifier,
            OperonFunction::Misc(_) => FunctionKind::Misc,
        }
    }
}

/// Immutable definition of one operon
#[derive(Debug, Clone, PartialEq)]
pub struct Operon {
    pub name: String,
    pub size_bp: u64,
    pub function: OperonFunction,
    pub energy_cost_per_mole: f64,
}

impl Operon {
    pub fn new(
        name: impl Into<String>,
        size_bp: u64,
        function: OperonFunction,
        energy_cost_per_mole: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !energy_cost_per_mole.is_finite() || energy_cost_per_mole < 0.0 {
            return Err(Error::Configuration(format!(
                "operon '{}' has invalid energy cost {}",
                name, energy_cost_per_mole
            )));
        }

        Ok(Self {
            name,
            size_bp,
            function,
            energy_cost_per_mole,
        })
    }

    /// Build an operon from a configuration entry, checking that the effect
    /// payload matches the function tag
    pub fn from_config(config: &OperonConfig) -> Result<Self> {
        let kind: FunctionKind = config.function.parse().map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("operon '{}': {}", config.name, msg))
            }
            other => other,
        })?;

        let function = match (kind, &config.effect) {
            (FunctionKind::Passive, EffectConfig::Name(species)) => {
                OperonFunction::Passive(Species::from(species.as_str()))
            }
            (FunctionKind::Active, EffectConfig::Name(species)) => {
                OperonFunction::Active(Species::from(species.as_str()))
            }
            (FunctionKind::Reaction, EffectConfig::Reaction(reaction)) => {
                OperonFunction::Reaction(Reaction::from_config(reaction)?)
            }
            (FunctionKind::Modifier, EffectConfig::Tolerance(tolerance)) => {
                if !tolerance.offset.is_finite() {
                    return Err(Error::Configuration(format!(
                        "operon '{}' has a non-finite tolerance offset",
                        config.name
                    )));
                }
                OperonFunction::Modifier(ToleranceModifier {
                    species: tolerance.species.clone(),
                    bound: tolerance.bound,
                    offset: tolerance.offset,
                })
            }
            (FunctionKind::Misc, EffectConfig::Name(marker)) => {
                OperonFunction::Misc(MiscMarker::from(marker.as_str()))
            }
            (kind, _) => {
                return Err(Error::Configuration(format!(
                    "operon '{}' has an effect that does not fit function '{}'",
                    config.name,
                    kind.tag()
                )));
            }
        };

        Self::new(
            config.name.clone(),
            config.size_bp,
            function,
            config.energy_cost_per_mole,
        )
    }

    pub fn kind(&self) -> FunctionKind {
        self.function.kind()
    }

    /// Species moved by a passive or active transporter
    pub fn transported_species(&self) -> Option<&Species> {
        match &self.function {
            OperonFunction::Passive(species) | OperonFunction::Active(species) => Some(species),
            _ => None,
        }
    }

    pub fn reaction(&self) -> Option<&Reaction> {
        match &self.function {
            OperonFunction::Reaction(reaction) => Some(reaction),
            _ => None,
        }
    }

    pub fn modifier(&self) -> Option<&ToleranceModifier> {
        match &self.function {
            OperonFunction::Modifier(modifier) => Some(modifier),
            _ => None,
        }
    }

    pub fn is_dna_polymerase(&self) -> bool {
        matches!(self.function, OperonFunction::Misc(MiscMarker::DnaPolymerase))
    }

    /// Passive channel for a diffusible species
    pub fn is_diffusion(&self) -> bool {
        matches!(&self.function, OperonFunction::Passive(species) if species.is_diffusible())
    }

    /// Initial gate for this operon: open, and locked open for diffusion
    pub fn gate(&self) -> Gate {
        if self.is_diffusion() {
            Gate::locked_open()
        } else {
            Gate::open()
        }
    }
}

impl fmt::Display for Operon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// On/off state of one passive channel, owned by a single organism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    on: bool,
    locked_open: bool,
}

impl Gate {
    pub fn open() -> Self {
        Self {
            on: true,
            locked_open: false,
        }
    }

    /// A gate that ignores `turn_off`
    pub fn locked_open() -> Self {
        Self {
            on: true,
            locked_open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.on
    }

    pub fn is_locked_open(&self) -> bool {
        self.locked_open
    }

    pub fn turn_on(&mut self) {
        self.on = true;
    }

    /// Close the gate unless it is locked open
    pub fn turn_off(&mut self) {
        if !self.locked_open {
            self.on = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bactim_core::ReactionConfig;

    #[test]
    fn test_function_tags() {
        for tag in ["pas", "act", "rxn", "mod", "misc"] {
            let kind: FunctionKind = tag.parse().unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert!(matches!(
            "xyz".parse::<FunctionKind>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let channel = Operon::from_config(&OperonConfig::passive("Glucose channel", 500, "Glc"))
            .unwrap();
        assert_eq!(channel.kind(), FunctionKind::Passive);
        assert_eq!(channel.transported_species().map(Species::as_str), Some("Glc"));

        let pump = Operon::from_config(&OperonConfig::active("K+ transporter", 500, "K+", 0.3))
            .unwrap();
        assert_eq!(pump.energy_cost_per_mole, 0.3);

        let enzyme = Operon::from_config(&OperonConfig::reaction(
            "ATP hydrolysis",
            1000,
            ReactionConfig::new(&[("ATP", 1.0)], &[("ADP", 1.0), ("P", 1.0)]),
        ))
        .unwrap();
        assert!(enzyme.reaction().is_some());

        let pol = Operon::from_config(&OperonConfig::misc("DNA polymerase", 1000, "DNAPol"))
            .unwrap();
        assert!(pol.is_dna_polymerase());

        let helicase = Operon::from_config(&OperonConfig::misc("Helicase", 1000, "Helicase"))
            .unwrap();
        assert!(!helicase.is_dna_polymerase());
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        let mut config = OperonConfig::passive("Mystery", 100, "Glc");
        config.function = "teleport".to_string();
        let err = Operon::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("Mystery"));
    }

    #[test]
    fn test_mismatched_effect_is_rejected() {
        let mut config = OperonConfig::passive("Broken", 100, "Glc");
        config.function = "rxn".to_string();
        assert!(matches!(
            Operon::from_config(&config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_negative_energy_cost_is_rejected() {
        let config = OperonConfig::active("Leaky pump", 100, "Na+", -1.0);
        assert!(Operon::from_config(&config).is_err());
    }

    #[test]
    fn test_diffusion_gate_stays_open() {
        let diffusion = Operon::from_config(&OperonConfig::passive("O2 diffusion", 0, "O2"))
            .unwrap();
        let mut gate = diffusion.gate();
        gate.turn_off();
        assert!(gate.is_open());
        assert!(gate.is_locked_open());

        let channel = Operon::from_config(&OperonConfig::passive("Na+ channel", 500, "Na+"))
            .unwrap();
        let mut gate = channel.gate();
        gate.turn_off();
        assert!(!gate.is_open());
        gate.turn_on();
        assert!(gate.is_open());
    }

    #[test]
    fn test_active_transport_of_diffusible_species_is_not_diffusion() {
        let pump = Operon::from_config(&OperonConfig::active("O2 pump", 500, "O2", 1.0)).unwrap();
        assert!(!pump.is_diffusion());
    }
}
