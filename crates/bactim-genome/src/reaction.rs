//! Stoichiometric reactions.

use bactim_core::{Error, ReactionConfig, ResourceMap, Result, Species};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A conversion of reactants into products.
///
/// Coefficients are moles per reaction event and are always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    reactants: BTreeMap<Species, f64>,
    products: BTreeMap<Species, f64>,
}

impl Reaction {
    pub fn new(
        reactants: BTreeMap<Species, f64>,
        products: BTreeMap<Species, f64>,
    ) -> Result<Self> {
        if reactants.is_empty() && products.is_empty() {
            return Err(Error::Configuration(
                "reaction has neither reactants nor products".to_string(),
            ));
        }

        for (species, coefficient) in reactants.iter().chain(products.iter()) {
            if !coefficient.is_finite() || *coefficient <= 0.0 {
                return Err(Error::Configuration(format!(
                    "stoichiometric coefficient for {} must be positive, got {}",
                    species, coefficient
                )));
            }
        }

        Ok(Self {
            reactants,
            products,
        })
    }

    pub fn from_config(config: &ReactionConfig) -> Result<Self> {
        Self::new(config.reactants.clone(), config.products.clone())
    }

    pub fn reactants(&self) -> &BTreeMap<Species, f64> {
        &self.reactants
    }

    pub fn products(&self) -> &BTreeMap<Species, f64> {
        &self.products
    }

    /// Every species on either side, without duplicates
    pub fn species(&self) -> BTreeSet<&Species> {
        self.reactants.keys().chain(self.products.keys()).collect()
    }

    /// Moles of `species` made per reaction event, negative when consumed.
    /// A species on both sides gets the difference; zero when absent.
    pub fn net_coefficient(&self, species: &str) -> f64 {
        self.products.get(species).copied().unwrap_or(0.0)
            - self.reactants.get(species).copied().unwrap_or(0.0)
    }

    /// Coefficient used when `species` constrains the extent: the magnitude of
    /// its net change. `None` for species outside the reaction and for species
    /// that come out as they went in.
    pub fn coefficient(&self, species: &str) -> Option<f64> {
        let net = self.net_coefficient(species).abs();
        (net > 0.0).then_some(net)
    }

    /// Number of reaction events the supplied amounts allow.
    ///
    /// The extent is the smallest `moles / coefficient` over the supplied
    /// species that belong to the reaction. Negative amounts count as zero.
    /// Fails when none of the supplied species take part in the reaction.
    pub fn extent(&self, availability: &[(Species, f64)]) -> Result<f64> {
        availability
            .iter()
            .filter_map(|(species, moles)| {
                self.coefficient(species.as_str())
                    .map(|coefficient| moles.max(0.0) / coefficient)
            })
            .reduce(f64::min)
            .ok_or_else(|| {
                Error::PartitionDomain(
                    "reaction extent requested over an empty availability set".to_string(),
                )
            })
    }

    /// Signed mole changes for every species of the reaction, consumed
    /// species negative.
    ///
    /// An empty availability set runs the reaction zero times, so the result
    /// is all zeros rather than an error.
    pub fn get_moles(&self, availability: &[(Species, f64)]) -> ResourceMap {
        let extent = self.extent(availability).unwrap_or(0.0);
        self.deltas(extent)
    }

    fn deltas(&self, extent: f64) -> ResourceMap {
        let mut deltas = ResourceMap::new();
        for (species, coefficient) in &self.reactants {
            *deltas.entry(species.clone()).or_insert(0.0) -= coefficient * extent;
        }
        for (species, coefficient) in &self.products {
            *deltas.entry(species.clone()).or_insert(0.0) += coefficient * extent;
        }
        deltas
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |terms: &BTreeMap<Species, f64>| {
            terms
                .iter()
                .map(|(species, coefficient)| format!("{}*{}", coefficient, species))
                .collect::<Vec<_>>()
                .join(" + ")
        };
        write!(f, "{} -> {}", side(&self.reactants), side(&self.products))
    }
}
