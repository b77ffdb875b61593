//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Adenosine triphosphate, the energy currency spent by active transport.
pub const ATP: &str = "ATP";
/// Adenosine diphosphate, produced by ATP hydrolysis.
pub const ADP: &str = "ADP";
/// Inorganic phosphate, produced by ATP hydrolysis.
pub const PHOSPHATE: &str = "P";
/// Irradiance. Held fixed by the environment across a cycle.
pub const LIGHT: &str = "Lux";
/// Temperature, modelled as a freely diffusing quantity.
pub const TEMPERATURE: &str = "Temp";

/// Species that cross membranes without a gene product. Channels carrying
/// them can never be closed.
pub const DIFFUSIBLE_SPECIES: [&str; 5] = ["CO2", "O2", "EtOH", LIGHT, TEMPERATURE];

/// Identifier of a chemical species (or physical quantity) tracked by the model
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Species(String);

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this species passes membranes freely
    pub fn is_diffusible(&self) -> bool {
        DIFFUSIBLE_SPECIES.contains(&self.0.as_str())
    }
}

impl From<&str> for Species {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Species {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for Species {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Species-keyed amounts (concentrations or moles). Ordered so that every
/// iteration over a map is deterministic.
pub type ResourceMap = BTreeMap<Species, f64>;

/// Unique identifier for an organism population
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub Uuid);

impl OrganismId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrganismId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the tolerance thresholds of a [`ResourceBounds`] record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    MinLive,
    MinGrow,
    Ideal,
    MaxGrow,
    MaxLive,
}

/// Per-organism tolerance record for one species.
///
/// Thresholds are ordered `min_live <= min_grow <= ideal <= max_grow <= max_live`.
/// Range checks are inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceBounds {
    pub current: f64,
    pub min_live: f64,
    pub min_grow: f64,
    pub ideal: f64,
    pub max_grow: f64,
    pub max_live: f64,
}

impl ResourceBounds {
    pub fn new(
        current: f64,
        min_live: f64,
        min_grow: f64,
        ideal: f64,
        max_grow: f64,
        max_live: f64,
    ) -> Self {
        Self {
            current,
            min_live,
            min_grow,
            ideal,
            max_grow,
            max_live,
        }
    }

    /// Concentration is not lethal
    pub fn can_live(&self, conc: f64) -> bool {
        self.min_live <= conc && conc <= self.max_live
    }

    /// Concentration does not limit growth
    pub fn can_grow(&self, conc: f64) -> bool {
        self.min_grow <= conc && conc <= self.max_grow
    }

    pub fn bound(&self, bound: Bound) -> f64 {
        match bound {
            Bound::MinLive => self.min_live,
            Bound::MinGrow => self.min_grow,
            Bound::Ideal => self.ideal,
            Bound::MaxGrow => self.max_grow,
            Bound::MaxLive => self.max_live,
        }
    }

    /// Move one threshold by `offset`
    pub fn shift(&mut self, bound: Bound, offset: f64) {
        let slot = match bound {
            Bound::MinLive => &mut self.min_live,
            Bound::MinGrow => &mut self.min_grow,
            Bound::Ideal => &mut self.ideal,
            Bound::MaxGrow => &mut self.max_grow,
            Bound::MaxLive => &mut self.max_live,
        };
        *slot += offset;
    }

    /// Set the current concentration, clamping negatives to zero
    pub fn set_current(&mut self, conc: f64) {
        self.current = conc.max(0.0);
    }

    /// Check that the record is finite and correctly ordered
    pub fn validate(&self, species: &Species) -> Result<()> {
        let values = [
            self.current,
            self.min_live,
            self.min_grow,
            self.ideal,
            self.max_grow,
            self.max_live,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Configuration(format!(
                "bounds for {} contain a non-finite value",
                species
            )));
        }

        let ordered = self.min_live <= self.min_grow
            && self.min_grow <= self.ideal
            && self.ideal <= self.max_grow
            && self.max_grow <= self.max_live;
        if !ordered {
            return Err(Error::Configuration(format!(
                "bounds for {} must satisfy min_live <= min_grow <= ideal <= max_grow <= max_live \
                 (got {} <= {} <= {} <= {} <= {})",
                species, self.min_live, self.min_grow, self.ideal, self.max_grow, self.max_live
            )));
        }

        Ok(())
    }
}

/// What one organism offers to the diffusible pool for one species
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub moles: f64,
    pub volume: f64,
}

impl Contribution {
    /// Closed or non-transportable species
    pub const CLOSED: Contribution = Contribution {
        moles: 0.0,
        volume: 0.0,
    };
}
