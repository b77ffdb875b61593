//! Shared bulk medium.

use crate::organism::Organism;
use bactim_core::{Contribution, EnvironmentConfig, Error, ResourceMap, Result, Species};
use std::collections::BTreeMap;

/// Well-mixed medium shared by every population
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub name: String,
    volume: f64,
    resources: ResourceMap,
}

impl Environment {
    pub fn new(name: impl Into<String>, volume: f64, mut resources: ResourceMap) -> Result<Self> {
        let name = name.into();
        if !volume.is_finite() || volume <= 0.0 {
            return Err(Error::Configuration(format!(
                "environment '{}' must have a positive volume, got {}",
                name, volume
            )));
        }
        for (species, conc) in resources.iter_mut() {
            if !conc.is_finite() {
                return Err(Error::Configuration(format!(
                    "environment '{}' has a non-finite concentration for {}",
                    name, species
                )));
            }
            *conc = conc.max(0.0);
        }

        Ok(Self {
            name,
            volume,
            resources,
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> Result<Self> {
        Self::new(config.name.clone(), config.volume, config.resources.clone())
    }

    /// Volume in litres
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Bulk concentrations
    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    pub fn concentration(&self, species: &str) -> Option<f64> {
        self.resources.get(species).copied()
    }

    /// Total moles of a species in the medium
    pub fn moles(&self, species: &str) -> Option<f64> {
        self.concentration(species).map(|conc| conc * self.volume)
    }

    pub(crate) fn set_concentration(&mut self, species: &str, conc: f64) {
        if let Some(slot) = self.resources.get_mut(species) {
            *slot = conc.max(0.0);
        }
    }

    /// Split the medium between populations in proportion to their volumes.
    ///
    /// Shares are returned in the same order as `organisms`.
    pub fn partition(&self, organisms: &[Organism]) -> Result<Vec<ResourceMap>> {
        if organisms.is_empty() {
            return Ok(Vec::new());
        }

        let total: f64 = organisms.iter().map(Organism::volume).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::PartitionDomain(format!(
                "cannot partition '{}' between populations with total volume {}",
                self.name, total
            )));
        }

        Ok(organisms
            .iter()
            .map(|organism| {
                let fraction = organism.volume() / total;
                self.resources
                    .iter()
                    .map(|(species, conc)| (species.clone(), conc * self.volume * fraction))
                    .collect()
            })
            .collect())
    }

    /// Recompute bulk concentrations from the shares handed back after
    /// transport. An empty list leaves the medium untouched.
    pub fn update(&mut self, partitions: &[ResourceMap]) {
        if partitions.is_empty() {
            return;
        }

        let mut totals: ResourceMap = self.resources.keys().map(|s| (s.clone(), 0.0)).collect();
        for partition in partitions {
            for (species, moles) in partition {
                if let Some(total) = totals.get_mut(species) {
                    *total += moles;
                }
            }
        }
        for (species, moles) in totals {
            self.set_concentration(species.as_str(), moles / self.volume);
        }
    }

    /// Add (or remove, if negative) moles of a species from outside the
    /// transport cycle
    pub fn add_res(&mut self, species: &str, moles: f64) {
        if let Some(conc) = self.concentration(species) {
            self.set_concentration(species, conc + moles / self.volume);
        }
    }

    /// Volume-weighted mix of the medium with every open channel.
    ///
    /// Species the medium does not track are ignored.
    pub fn equilibrate(&mut self, contributions: &[BTreeMap<Species, Contribution>]) {
        for (species, conc) in self.resources.iter_mut() {
            let mut moles = *conc * self.volume;
            let mut volume = self.volume;
            for pool in contributions {
                if let Some(share) = pool.get(species) {
                    moles += share.moles;
                    volume += share.volume;
                }
            }
            *conc = (moles / volume).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bactim_core::{OperonConfig, ResourceBounds};
    use bactim_genome::Genome;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn medium(entries: &[(&str, f64)], volume: f64) -> Environment {
        let resources = entries
            .iter()
            .map(|(species, conc)| (Species::from(*species), *conc))
            .collect();
        Environment::new("Flask", volume, resources).unwrap()
    }

    fn population(count: f64, cell_volume: f64) -> Organism {
        let genome = Arc::new(
            Genome::from_config(&[OperonConfig::misc("DNA polymerase", 1_000, "DNAPol")]).unwrap(),
        );
        let resources = [(
            Species::from("Glc"),
            ResourceBounds::new(1.0, 0.0, 0.0, 1.0, 2.0, 3.0),
        )]
        .into_iter()
        .collect();
        Organism::new("Cells", genome, resources, count, cell_volume).unwrap()
    }

    #[test]
    fn test_invalid_volume() {
        assert!(Environment::new("Void", 0.0, ResourceMap::new()).is_err());
        assert!(Environment::new("Void", f64::NAN, ResourceMap::new()).is_err());
    }

    #[test]
    fn test_default_config() {
        let env = Environment::from_config(&EnvironmentConfig::default()).unwrap();
        assert_eq!(env.name, "Lab");
        assert_eq!(env.concentration("Glc"), Some(3e-3));
    }

    #[test]
    fn test_partition_by_volume() {
        let env = medium(&[("Glc", 2.0)], 10.0);
        let shares = env.partition(&[population(1.0, 1.0), population(3.0, 1.0)]).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0]["Glc"], 5.0);
        assert_eq!(shares[1]["Glc"], 15.0);
    }

    #[test]
    fn test_partition_edge_cases() {
        let env = medium(&[("Glc", 2.0)], 10.0);
        assert!(env.partition(&[]).unwrap().is_empty());
        assert!(matches!(
            env.partition(&[population(0.0, 1.0)]),
            Err(Error::PartitionDomain(_))
        ));
    }

    #[test]
    fn test_update_empty_is_noop() {
        let mut env = medium(&[("Glc", 2.0)], 10.0);
        env.update(&[]);
        assert_eq!(env.concentration("Glc"), Some(2.0));
    }

    #[test]
    fn test_update_ignores_untracked_species() {
        let mut env = medium(&[("Glc", 2.0)], 10.0);
        let returned: ResourceMap = [(Species::from("Glc"), 5.0), (Species::from("N"), 1.0)]
            .into_iter()
            .collect();
        env.update(&[returned]);
        assert_eq!(env.concentration("Glc"), Some(0.5));
        assert_eq!(env.concentration("N"), None);
    }

    #[test]
    fn test_add_res_clamps() {
        let mut env = medium(&[("Glc", 2.0)], 10.0);
        env.add_res("Glc", 10.0);
        assert_eq!(env.concentration("Glc"), Some(3.0));
        env.add_res("Glc", -100.0);
        assert_eq!(env.concentration("Glc"), Some(0.0));
        env.add_res("N", 1.0);
        assert_eq!(env.concentration("N"), None);
    }

    #[test]
    fn test_equilibrate() {
        let mut env = medium(&[("CO2", 0.0), ("Glc", 1.0)], 3.0);
        let open: BTreeMap<Species, Contribution> = [
            (Species::from("CO2"), Contribution { moles: 4.0, volume: 1.0 }),
            (Species::from("Glc"), Contribution::CLOSED),
        ]
        .into_iter()
        .collect();

        env.equilibrate(&[open]);
        assert_eq!(env.concentration("CO2"), Some(1.0));
        assert_eq!(env.concentration("Glc"), Some(1.0));
    }

    proptest! {
        #[test]
        fn prop_partition_update_is_identity(
            glc in 0.0f64..1e3,
            o2 in 0.0f64..1e3,
            counts in proptest::collection::vec(0.1f64..1e6, 1..6),
        ) {
            let mut env = medium(&[("Glc", glc), ("O2", o2)], 2.5);
            let organisms: Vec<_> = counts.iter().map(|&c| population(c, 1e-3)).collect();

            let shares = env.partition(&organisms).unwrap();
            env.update(&shares);

            let glc_after = env.concentration("Glc").unwrap();
            let o2_after = env.concentration("O2").unwrap();
            prop_assert!((glc_after - glc).abs() <= 1e-9 * (1.0 + glc));
            prop_assert!((o2_after - o2).abs() <= 1e-9 * (1.0 + o2));
        }
    }
}
