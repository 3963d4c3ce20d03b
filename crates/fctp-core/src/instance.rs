//! FCTP instance data
//!
//! An [`Instance`] holds the static data of a fixed-charge transportation
//! problem: origins with capacities, destinations with demands, and one
//! [`TransportArc`] per (origin, destination) pair carrying a fixed opening
//! cost and a per-unit transportation cost. Everything is immutable once
//! [`InstanceBuilder::build`] has validated it.
//!
//! Arcs are stored origin-major: the arc from origin `i` to destination `j`
//! sits at index `i * num_destinations + j`. Solvers rely on this ordering
//! when they map model columns back to arcs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ArcId, DestinationId, FctpError, FctpResult, OriginId};

/// A supply point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub id: OriginId,
    /// Units available for shipping (non-negative)
    pub capacity: f64,
}

/// A demand point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    /// Units requested (non-negative)
    pub demand: f64,
}

/// A potential shipping lane between one origin and one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportArc {
    pub id: ArcId,
    /// Index into [`Instance::origins`]
    pub origin: usize,
    /// Index into [`Instance::destinations`]
    pub destination: usize,
    /// Paid once when the arc is opened
    pub fixed_cost: f64,
    /// Paid per unit shipped on the arc
    pub unit_cost: f64,
}

/// Validated fixed-charge transportation instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    origins: Vec<Origin>,
    destinations: Vec<Destination>,
    arcs: Vec<TransportArc>,
}

impl Instance {
    /// Start building an instance.
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::new()
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn arcs(&self) -> &[TransportArc] {
        &self.arcs
    }

    pub fn num_origins(&self) -> usize {
        self.origins.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.destinations.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Look up an arc by id.
    pub fn arc(&self, id: ArcId) -> Option<&TransportArc> {
        self.arcs.get(id.value())
    }

    /// The arc joining `origin` and `destination` (both positional indices).
    pub fn arc_between(&self, origin: usize, destination: usize) -> Option<&TransportArc> {
        if origin >= self.origins.len() || destination >= self.destinations.len() {
            return None;
        }
        self.arcs.get(origin * self.destinations.len() + destination)
    }

    /// Arcs leaving the origin at position `origin`.
    pub fn arcs_from(&self, origin: usize) -> impl Iterator<Item = &TransportArc> + '_ {
        self.arcs.iter().filter(move |arc| arc.origin == origin)
    }

    /// Arcs entering the destination at position `destination`.
    pub fn arcs_to(&self, destination: usize) -> impl Iterator<Item = &TransportArc> + '_ {
        self.arcs
            .iter()
            .filter(move |arc| arc.destination == destination)
    }

    /// Largest flow an open arc can ever carry: `min(capacity, demand)`.
    pub fn flow_limit(&self, arc: &TransportArc) -> f64 {
        self.origins[arc.origin]
            .capacity
            .min(self.destinations[arc.destination].demand)
    }

    /// Flow limits for every arc, in arc order.
    pub fn flow_limits(&self) -> Vec<f64> {
        self.arcs.iter().map(|arc| self.flow_limit(arc)).collect()
    }

    /// Human-readable `origin->destination` label.
    pub fn arc_label(&self, arc: &TransportArc) -> String {
        format!(
            "{}->{}",
            self.origins[arc.origin].id, self.destinations[arc.destination].id
        )
    }

    pub fn total_capacity(&self) -> f64 {
        self.origins.iter().map(|o| o.capacity).sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.destinations.iter().map(|d| d.demand).sum()
    }

    /// True when demand cannot be met in full even with every arc open.
    pub fn has_capacity_shortfall(&self) -> bool {
        self.total_capacity() < self.total_demand()
    }

    /// Largest per-unit cost across all arcs (0 for an instance without arcs).
    pub fn max_unit_cost(&self) -> f64 {
        self.arcs
            .iter()
            .map(|arc| arc.unit_cost)
            .fold(0.0, f64::max)
    }

    /// Sum of fixed costs of the arcs marked open in `pattern`.
    pub fn fixed_cost_of(&self, pattern: &[bool]) -> f64 {
        self.arcs
            .iter()
            .zip(pattern)
            .filter(|(_, open)| **open)
            .map(|(arc, _)| arc.fixed_cost)
            .sum()
    }
}

/// Builder for [`Instance`].
///
/// Origins and destinations keep insertion order. Every (origin, destination)
/// pair needs exactly one arc; [`build`](Self::build) rejects anything else.
#[derive(Debug, Default, Clone)]
pub struct InstanceBuilder {
    origins: Vec<(String, f64)>,
    destinations: Vec<(String, f64)>,
    arcs: Vec<ArcSpec>,
}

#[derive(Debug, Clone)]
struct ArcSpec {
    origin: String,
    destination: String,
    fixed_cost: f64,
    unit_cost: f64,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an origin with its capacity.
    pub fn origin(mut self, id: impl Into<String>, capacity: f64) -> Self {
        self.origins.push((id.into(), capacity));
        self
    }

    /// Add a destination with its demand.
    pub fn destination(mut self, id: impl Into<String>, demand: f64) -> Self {
        self.destinations.push((id.into(), demand));
        self
    }

    /// Add the arc between two previously (or later) declared endpoints.
    pub fn arc(
        mut self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        fixed_cost: f64,
        unit_cost: f64,
    ) -> Self {
        self.arcs.push(ArcSpec {
            origin: origin.into(),
            destination: destination.into(),
            fixed_cost,
            unit_cost,
        });
        self
    }

    /// Validate and build the instance.
    pub fn build(self) -> FctpResult<Instance> {
        if self.origins.is_empty() {
            return Err(FctpError::validation("capacities", "no origins defined"));
        }
        if self.destinations.is_empty() {
            return Err(FctpError::validation("demands", "no destinations defined"));
        }

        let mut seen = HashSet::new();
        let mut origins = Vec::with_capacity(self.origins.len());
        for (id, capacity) in self.origins {
            let field = format!("capacities.{id}");
            if id.trim().is_empty() {
                return Err(FctpError::validation(field, "origin id cannot be empty"));
            }
            if !seen.insert(id.clone()) {
                return Err(FctpError::validation(field, "duplicate origin id"));
            }
            check_quantity(&field, capacity)?;
            origins.push(Origin {
                id: OriginId::new(id),
                capacity,
            });
        }

        let mut seen = HashSet::new();
        let mut destinations = Vec::with_capacity(self.destinations.len());
        for (id, demand) in self.destinations {
            let field = format!("demands.{id}");
            if id.trim().is_empty() {
                return Err(FctpError::validation(field, "destination id cannot be empty"));
            }
            if !seen.insert(id.clone()) {
                return Err(FctpError::validation(field, "duplicate destination id"));
            }
            check_quantity(&field, demand)?;
            destinations.push(Destination {
                id: DestinationId::new(id),
                demand,
            });
        }

        let n_dest = destinations.len();
        let mut slots: Vec<Option<(f64, f64)>> = vec![None; origins.len() * n_dest];
        for spec in self.arcs {
            let field = format!("arcs.{}.{}", spec.origin, spec.destination);
            let i = origins
                .iter()
                .position(|o| o.id.as_str() == spec.origin)
                .ok_or_else(|| FctpError::validation(&field, "unknown origin"))?;
            let j = destinations
                .iter()
                .position(|d| d.id.as_str() == spec.destination)
                .ok_or_else(|| FctpError::validation(&field, "unknown destination"))?;
            if !spec.fixed_cost.is_finite() || spec.fixed_cost < 0.0 {
                return Err(FctpError::validation(
                    format!("fixed_costs.{}.{}", spec.origin, spec.destination),
                    format!("must be a finite non-negative number, got {}", spec.fixed_cost),
                ));
            }
            if !spec.unit_cost.is_finite() {
                return Err(FctpError::validation(
                    format!("unit_costs.{}.{}", spec.origin, spec.destination),
                    format!("must be finite, got {}", spec.unit_cost),
                ));
            }
            let slot = &mut slots[i * n_dest + j];
            if slot.is_some() {
                return Err(FctpError::validation(field, "arc defined more than once"));
            }
            *slot = Some((spec.fixed_cost, spec.unit_cost));
        }

        let mut arcs = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let (i, j) = (index / n_dest, index % n_dest);
            let (fixed_cost, unit_cost) = slot.ok_or_else(|| {
                FctpError::validation(
                    format!("arcs.{}.{}", origins[i].id, destinations[j].id),
                    "missing arc cost",
                )
            })?;
            arcs.push(TransportArc {
                id: ArcId::new(index),
                origin: i,
                destination: j,
                fixed_cost,
                unit_cost,
            });
        }

        Ok(Instance {
            origins,
            destinations,
            arcs,
        })
    }
}

fn check_quantity(field: &str, value: f64) -> FctpResult<()> {
    if !value.is_finite() {
        return Err(FctpError::validation(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(FctpError::validation(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}
