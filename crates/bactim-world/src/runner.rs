//! Headless batch runs of a configured ecosystem.

use crate::ecosystem::Ecosystem;
use bactim_core::{PopulationSummary, ResourceMap, Result, SimulationConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Final state and count history of one population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub summary: PopulationSummary,
    pub history: Vec<f64>,
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ticks_run: u64,
    /// Whether the run stopped early because every population died out
    pub extinct: bool,
    /// Bulk concentrations at the end of the run
    pub environment: ResourceMap,
    pub populations: Vec<PopulationRecord>,
}

pub struct Runner {
    config: SimulationConfig,
    ecosystem: Ecosystem,
}

impl Runner {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let ecosystem = Ecosystem::from_config(&config)?;
        Ok(Self { config, ecosystem })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    /// Run up to `num_ticks` cycles as fast as possible
    #[instrument(skip(self), fields(num_ticks = self.config.num_ticks))]
    pub fn run(&mut self) -> Result<RunSummary> {
        let started_at = Utc::now();
        info!(
            event = "run_started",
            environment = %self.ecosystem.environment().name,
            populations = self.ecosystem.organisms().len(),
            "Starting simulation for {} ticks",
            self.config.num_ticks
        );

        let mut extinct = false;
        for _ in 0..self.config.num_ticks {
            if self.ecosystem.is_extinct() {
                extinct = true;
                info!(tick = self.ecosystem.tick(), "Every population has died out");
                break;
            }

            let report = self.ecosystem.cycle()?;
            if self.config.log_interval > 0 && report.tick % self.config.log_interval == 0 {
                self.emit_population_metrics(&report.summaries, report.tick);
            }
        }
        extinct |= self.ecosystem.is_extinct();

        let summary = self.collect_results(started_at, extinct);
        info!(
            event = "run_complete",
            ticks_run = summary.ticks_run,
            extinct = summary.extinct,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "Simulation finished"
        );
        Ok(summary)
    }

    fn emit_population_metrics(&self, summaries: &[PopulationSummary], tick: u64) {
        for summary in summaries {
            info!(
                event = "population_metrics",
                tick,
                organism = %summary.name,
                count = summary.count,
                growth_factor = summary.growth_factor,
                limited_by = ?summary.limited_by,
                dying_from = ?summary.dying_from,
                "Population snapshot"
            );
        }
    }

    fn collect_results(&self, started_at: DateTime<Utc>, extinct: bool) -> RunSummary {
        let populations = self
            .ecosystem
            .organisms()
            .iter()
            .map(|organism| PopulationRecord {
                summary: organism.summary(),
                history: self
                    .ecosystem
                    .history(organism.id)
                    .map(|history| history.counts().to_vec())
                    .unwrap_or_default(),
            })
            .collect();

        RunSummary {
            started_at,
            finished_at: Utc::now(),
            ticks_run: self.ecosystem.tick(),
            extinct,
            environment: self.ecosystem.environment().resources().clone(),
            populations,
        }
    }
}
