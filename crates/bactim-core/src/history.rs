//! Population tracking across cycles.

use crate::types::{OrganismId, Species};
use serde::{Deserialize, Serialize};

/// Counts recorded for one population, one entry per cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationHistory {
    counts: Vec<f64>,
}

impl PopulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, count: f64) {
        self.counts.push(count);
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.counts.last().copied()
    }

    /// Largest count seen so far
    pub fn peak(&self) -> Option<f64> {
        self.counts.iter().copied().reduce(f64::max)
    }

    /// Ratio between the last two recorded counts
    pub fn last_growth_ratio(&self) -> Option<f64> {
        match self.counts.as_slice() {
            [.., prev, last] if *prev > 0.0 => Some(last / prev),
            _ => None,
        }
    }
}

/// Snapshot of one population after a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub id: OrganismId,
    pub name: String,
    pub count: f64,
    /// Growth factor applied by the last division
    pub growth_factor: f64,
    /// Species outside the growable range
    pub limited_by: Vec<Species>,
    /// Species outside the livable range
    pub dying_from: Vec<Species>,
}

impl PopulationSummary {
    pub fn is_dying(&self) -> bool {
        !self.dying_from.is_empty()
    }

    pub fn is_extinct(&self) -> bool {
        self.count <= 0.0
    }
}
