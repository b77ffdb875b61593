use bactim_core::{OperonConfig, ResourceBounds, ResourceMap, SimulationConfig, Species};
use bactim_genome::Genome;
use bactim_world::{Ecosystem, Environment, Organism, Runner};
use std::collections::BTreeMap;
use std::sync::Arc;

fn table(entries: &[(&str, ResourceBounds)]) -> BTreeMap<Species, ResourceBounds> {
    entries
        .iter()
        .map(|(species, bounds)| (Species::from(*species), *bounds))
        .collect()
}

fn medium(entries: &[(&str, f64)]) -> ResourceMap {
    entries
        .iter()
        .map(|(species, conc)| (Species::from(*species), *conc))
        .collect()
}

#[test]
fn unlimited_population_grows_geometrically() {
    // One polymerase copying 60 000 bp per tick over 600 000 bp
    let genome = Arc::new(
        Genome::from_config(&[OperonConfig::misc("DNA polymerase", 600_000, "DNAPol")]).unwrap(),
    );
    let organism = Organism::new(
        "Grower",
        genome,
        table(&[("Glc", ResourceBounds::new(1.0, 0.0, 0.0, 1.0, 2.0, 3.0))]),
        50.0,
        1e-15,
    )
    .unwrap();
    let factor = organism.calc_growth();

    let environment = Environment::new("Flask", 1.0, medium(&[("Glc", 1.0)])).unwrap();
    let mut ecosystem = Ecosystem::new(environment);
    let id = ecosystem.add_organism(organism).unwrap();

    for _ in 0..100 {
        ecosystem.cycle().unwrap();
    }

    let expected = 50.0 * (1.0 + factor).powi(100);
    let count = ecosystem.organism(id).unwrap().count();
    assert!((count - expected).abs() / expected < 1e-9);

    let history = ecosystem.history(id).unwrap();
    assert_eq!(history.len(), 100);
    assert_eq!(history.counts()[0], 50.0);
    assert!(history.counts().windows(2).all(|pair| pair[1] > pair[0]));
}

#[test]
fn diffusion_and_growth_conserve_moles() {
    let genome = Arc::new(
        Genome::from_config(&[
            OperonConfig::passive("CO2 diffusion", 0, "CO2"),
            OperonConfig::misc("DNA polymerase", 600_000, "DNAPol"),
        ])
        .unwrap(),
    );
    let organism = Organism::new(
        "Breather",
        genome,
        table(&[("CO2", ResourceBounds::new(0.0, 0.0, 0.0, 0.0, 1.0, 2.0))]),
        1e12,
        1e-15,
    )
    .unwrap();

    let mut ecosystem = Ecosystem::new(Environment::new("Flask", 1.0, medium(&[("CO2", 0.5)])).unwrap());
    let id = ecosystem.add_organism(organism).unwrap();

    for _ in 0..20 {
        ecosystem.cycle().unwrap();

        let organism = ecosystem.organism(id).unwrap();
        let inside = organism.concentration("CO2").unwrap() * organism.volume();
        let outside = ecosystem.environment().moles("CO2").unwrap();
        assert!((inside + outside - 0.5).abs() < 1e-12);
    }
}

#[test]
fn default_scenario_runs_without_negative_values() {
    let config = SimulationConfig {
        num_ticks: 50,
        log_interval: 10,
        ..SimulationConfig::default()
    };
    let mut runner = Runner::new(config).unwrap();
    let summary = runner.run().unwrap();

    assert_eq!(summary.ticks_run, 50);
    assert_eq!(summary.populations.len(), 2);
    assert!(summary.environment.values().all(|conc| *conc >= 0.0));
    for record in &summary.populations {
        assert!(record.summary.count >= 0.0);
        assert_eq!(record.history.len(), 50);
    }
    for organism in runner.ecosystem().organisms() {
        assert!(organism.resources().values().all(|bounds| bounds.current >= 0.0));
    }
}

fn glucose_pump(name: &str, glc_ideal: f64, glc_max_grow: f64) -> Organism {
    let genome = Arc::new(
        Genome::from_config(&[
            OperonConfig::active("Glucose transporter", 500, "Glc", 1.0),
            OperonConfig::misc("DNA polymerase", 600_000, "DNAPol"),
        ])
        .unwrap(),
    );
    Organism::new(
        name,
        genome,
        table(&[
            ("ATP", ResourceBounds::new(10.0, 0.0, 0.0, 10.0, 20.0, 30.0)),
            ("ADP", ResourceBounds::new(0.0, 0.0, 0.0, 0.0, 100.0, 100.0)),
            ("P", ResourceBounds::new(0.0, 0.0, 0.0, 0.0, 100.0, 100.0)),
            (
                "Glc",
                ResourceBounds::new(0.0, 0.0, 0.0, glc_ideal, glc_max_grow, glc_max_grow * 2.0),
            ),
        ]),
        1.0,
        0.5,
    )
    .unwrap()
}

fn moles_inside(organism: &Organism, species: &str) -> f64 {
    organism.concentration(species).unwrap() * organism.volume()
}

#[test]
fn active_transport_draws_from_volume_shares() {
    // 1.5 mol in the medium, split 0.75 / 0.75 between two 0.5 L populations
    let mut ecosystem =
        Ecosystem::new(Environment::new("Flask", 1.0, medium(&[("Glc", 1.5)])).unwrap());
    let hungry = ecosystem.add_organism(glucose_pump("Hungry", 10.0, 20.0)).unwrap();
    let modest = ecosystem.add_organism(glucose_pump("Modest", 0.4, 1.0)).unwrap();

    let report = ecosystem.cycle().unwrap();
    assert!(report.summaries.iter().all(|summary| !summary.is_dying()));

    let hungry = ecosystem.organism(hungry).unwrap();
    let modest = ecosystem.organism(modest).unwrap();
    let outside = ecosystem.environment().moles("Glc").unwrap();

    // Capped at its share rather than its 5 mol deficit
    assert!((moles_inside(hungry, "Glc") - 0.75).abs() < 1e-12);
    assert!((moles_inside(hungry, "ADP") - 0.75).abs() < 1e-12);
    // Takes only what it needs to reach ideal, and leaves the rest
    assert!((moles_inside(modest, "Glc") - 0.2).abs() < 1e-12);
    assert!((outside - 0.55).abs() < 1e-12);

    let total = moles_inside(hungry, "Glc") + moles_inside(modest, "Glc") + outside;
    assert!((total - 1.5).abs() < 1e-12);
}
