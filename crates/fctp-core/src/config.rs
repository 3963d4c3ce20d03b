//! Run configuration files
//!
//! A run file carries the instance data plus the decomposition options:
//!
//! ```yaml
//! capacities: { i1: 20, i2: 30 }
//! demands: { j1: 20, j2: 30 }
//! fixed_costs:
//!   i1: { j1: 10, j2: 20 }
//!   i2: { j1: 20, j2: 30 }
//! unit_costs:
//!   i1: { j1: 1, j2: 2 }
//!   i2: { j1: 3, j2: 2 }
//! max_iterations: 10
//! tolerance: 1.0e-6
//! penalty_cost: 1000
//! ```
//!
//! Origins and destinations are ordered by id.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{FctpError, FctpResult, Instance};

/// Instance data and loop options for one decomposition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Origin id → capacity
    pub capacities: BTreeMap<String, f64>,
    /// Destination id → demand
    pub demands: BTreeMap<String, f64>,
    /// Origin id → destination id → fixed opening cost
    pub fixed_costs: BTreeMap<String, BTreeMap<String, f64>>,
    /// Origin id → destination id → per-unit cost
    pub unit_costs: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Price of one unit of unmet demand
    #[serde(default = "default_penalty_cost")]
    pub penalty_cost: f64,
}

fn default_max_iterations() -> usize {
    10
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_penalty_cost() -> f64 {
    1000.0
}

impl RunConfig {
    /// Wrap an existing instance with default loop options.
    pub fn from_instance(instance: &Instance) -> Self {
        let capacities = instance
            .origins()
            .iter()
            .map(|o| (o.id.to_string(), o.capacity))
            .collect();
        let demands = instance
            .destinations()
            .iter()
            .map(|d| (d.id.to_string(), d.demand))
            .collect();

        let mut fixed_costs: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let mut unit_costs: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for arc in instance.arcs() {
            let origin = instance.origins()[arc.origin].id.to_string();
            let destination = instance.destinations()[arc.destination].id.to_string();
            fixed_costs
                .entry(origin.clone())
                .or_default()
                .insert(destination.clone(), arc.fixed_cost);
            unit_costs
                .entry(origin)
                .or_default()
                .insert(destination, arc.unit_cost);
        }

        Self {
            capacities,
            demands,
            fixed_costs,
            unit_costs,
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            penalty_cost: default_penalty_cost(),
        }
    }

    /// Check the loop options.
    pub fn validate_options(&self) -> FctpResult<()> {
        if self.max_iterations == 0 {
            return Err(FctpError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(FctpError::Config(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.penalty_cost.is_finite() || self.penalty_cost <= 0.0 {
            return Err(FctpError::Config(format!(
                "penalty_cost must be a finite positive number, got {}",
                self.penalty_cost
            )));
        }
        Ok(())
    }

    /// Validate the data and build the [`Instance`].
    ///
    /// Logs a warning when some unit cost reaches the penalty: leaving demand
    /// unmet is then no more expensive than shipping it.
    pub fn to_instance(&self) -> FctpResult<Instance> {
        self.check_cost_table("fixed_costs", &self.fixed_costs)?;
        self.check_cost_table("unit_costs", &self.unit_costs)?;

        let mut builder = Instance::builder();
        for (id, capacity) in &self.capacities {
            builder = builder.origin(id.as_str(), *capacity);
        }
        for (id, demand) in &self.demands {
            builder = builder.destination(id.as_str(), *demand);
        }
        for (origin, row) in &self.fixed_costs {
            for (destination, fixed_cost) in row {
                let unit_cost = self
                    .unit_costs
                    .get(origin)
                    .and_then(|row| row.get(destination))
                    .copied()
                    .ok_or_else(|| {
                        FctpError::validation(
                            format!("unit_costs.{origin}.{destination}"),
                            "missing arc cost",
                        )
                    })?;
                builder = builder.arc(origin.as_str(), destination.as_str(), *fixed_cost, unit_cost);
            }
        }
        let instance = builder.build()?;

        let max_unit_cost = instance.max_unit_cost();
        if max_unit_cost >= self.penalty_cost {
            warn!(
                max_unit_cost,
                penalty_cost = self.penalty_cost,
                "unit cost reaches the unmet-demand penalty; the solver may leave demand unserved"
            );
        }
        Ok(instance)
    }

    /// Every cost table must cover exactly the declared origin/destination grid.
    fn check_cost_table(
        &self,
        name: &str,
        table: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> FctpResult<()> {
        for (origin, row) in table {
            if !self.capacities.contains_key(origin) {
                return Err(FctpError::validation(
                    format!("{name}.{origin}"),
                    "unknown origin",
                ));
            }
            for destination in row.keys() {
                if !self.demands.contains_key(destination) {
                    return Err(FctpError::validation(
                        format!("{name}.{origin}.{destination}"),
                        "unknown destination",
                    ));
                }
            }
        }
        for origin in self.capacities.keys() {
            for destination in self.demands.keys() {
                let present = table
                    .get(origin)
                    .is_some_and(|row| row.contains_key(destination));
                if !present {
                    return Err(FctpError::validation(
                        format!("{name}.{origin}.{destination}"),
                        "missing arc cost",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Serialize as YAML.
    pub fn to_yaml_string(&self) -> FctpResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Load a run configuration, picking the format from the file extension.
///
/// Unknown extensions try YAML first, then JSON.
pub fn load_config_from_path(path: &Path) -> FctpResult<RunConfig> {
    let data = fs::read_to_string(path)?;
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data)?
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(&data)?,
        _ => match serde_yaml::from_str(&data) {
            Ok(config) => config,
            Err(_) => serde_json::from_str(&data)?,
        },
    };
    Ok(config)
}
