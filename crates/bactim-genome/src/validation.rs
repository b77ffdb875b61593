//! Validation for genomes and the tolerance tables paired with them.

use crate::genome::Genome;
use bactim_core::{Error, ResourceBounds, Result, Species, ADP, ATP, PHOSPHATE};
use std::collections::BTreeMap;
use tracing::warn;

/// Validate that a genome is well-formed
pub fn validate_genome(genome: &Genome) -> Result<()> {
    if genome.is_empty() {
        return Err(Error::Configuration("genome has no operons".to_string()));
    }

    if genome.size_bp() == 0 {
        return Err(Error::Configuration(
            "genome has zero total size; replication rate is undefined".to_string(),
        ));
    }

    if genome.dna_polymerases() == 0 {
        warn!("Genome has no DNA polymerase; populations will never grow");
    }

    Ok(())
}

/// Validate that an organism's tolerance table covers everything its genome
/// touches and that every record is correctly ordered
pub fn validate_tolerances(
    genome: &Genome,
    resources: &BTreeMap<Species, ResourceBounds>,
) -> Result<()> {
    for (species, bounds) in resources {
        bounds.validate(species)?;
    }

    let require = |species: &str, operon: &str| -> Result<()> {
        if resources.contains_key(species) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "operon '{}' needs bounds for {}, which the organism does not track",
                operon, species
            )))
        }
    };

    for op in genome.operons() {
        if let Some(species) = op.transported_species() {
            require(species.as_str(), &op.name)?;
        }
        if let Some(reaction) = op.reaction() {
            for species in reaction.species() {
                require(species.as_str(), &op.name)?;
            }
        }
    }

    if let Some(pump) = genome.active().next() {
        for species in [ATP, ADP, PHOSPHATE] {
            require(species, &pump.name)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bactim_core::{bacterial_cytoplasm, default_genome, OperonConfig};

    fn pump_genome() -> Genome {
        Genome::from_config(&[
            OperonConfig::active("Glucose transporter", 500, "Glc", 1.0),
            OperonConfig::misc("DNA polymerase", 1_000, "DNAPol"),
        ])
        .unwrap()
    }

    #[test]
    fn test_validate_default_pairing() {
        let genome = Genome::from_config(&default_genome()).unwrap();
        assert!(validate_tolerances(&genome, &bacterial_cytoplasm()).is_ok());
    }

    #[test]
    fn test_missing_transported_species() {
        let mut table = bacterial_cytoplasm();
        table.remove("Glc");
        let err = validate_tolerances(&pump_genome(), &table).unwrap_err();
        assert!(err.to_string().contains("Glc"));
    }

    #[test]
    fn test_pumps_need_energy_species() {
        let mut table = bacterial_cytoplasm();
        table.remove("ADP");
        assert!(matches!(
            validate_tolerances(&pump_genome(), &table),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_out_of_order_bounds() {
        let mut table = bacterial_cytoplasm();
        if let Some(glc) = table.get_mut("Glc") {
            glc.max_grow = glc.max_live * 2.0;
        }
        assert!(validate_tolerances(&pump_genome(), &table).is_err());
    }
}
