//! Solver-neutral linear model.

use serde::{Deserialize, Serialize};

use crate::solver::{ProblemClass, SolverError};

/// Column handle returned by [`LinearModel::add_variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(usize);

/// Row handle returned by [`LinearModel::add_constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(usize);

impl VarId {
    #[inline]
    pub fn new(value: usize) -> Self {
        VarId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl RowId {
    #[inline]
    pub fn new(value: usize) -> Self {
        RowId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Continuous,
    /// 0/1 integer
    Binary,
}

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side evaluated at `values`.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values.get(var.value()).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Minimisation model: variables with bounds and domain, named linear rows,
/// linear objective plus a constant.
///
/// Infinite bounds mean "unbounded on that side".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearModel {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Vec<f64>,
    objective_constant: f64,
}

impl LinearModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        domain: Domain,
    ) -> VarId {
        let id = VarId::new(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            lower,
            upper,
            domain,
        });
        self.objective.push(0.0);
        id
    }

    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_variable(name, lower, upper, Domain::Continuous)
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(name, 0.0, 1.0, Domain::Binary)
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        sense: Sense,
        rhs: f64,
    ) -> RowId {
        let id = RowId::new(self.constraints.len());
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
        id
    }

    /// Set (overwrite) the objective coefficient of `var`.
    pub fn set_objective(&mut self, var: VarId, coefficient: f64) {
        if let Some(slot) = self.objective.get_mut(var.value()) {
            *slot = coefficient;
        }
    }

    pub fn add_objective_constant(&mut self, constant: f64) {
        self.objective_constant += constant;
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.value())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, row: RowId) -> Option<&Constraint> {
        self.constraints.get(row.value())
    }

    /// Dense objective coefficients, indexed by variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn objective_constant(&self) -> f64 {
        self.objective_constant
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn problem_class(&self) -> ProblemClass {
        if self
            .variables
            .iter()
            .any(|v| v.domain == Domain::Binary)
        {
            ProblemClass::MixedInteger
        } else {
            ProblemClass::LinearProgram
        }
    }

    /// Objective value (constant included) at `values`.
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum::<f64>()
            + self.objective_constant
    }

    /// Reject models no backend can digest: NaN data, inverted bounds,
    /// dangling variable references.
    pub fn validate(&self) -> Result<(), SolverError> {
        for var in &self.variables {
            if var.lower.is_nan() || var.upper.is_nan() || var.lower > var.upper {
                return Err(SolverError::InvalidModel(format!(
                    "variable '{}' has bounds [{}, {}]",
                    var.name, var.lower, var.upper
                )));
            }
        }
        if let Some(pos) = self.objective.iter().position(|c| !c.is_finite()) {
            return Err(SolverError::InvalidModel(format!(
                "objective coefficient of '{}' is not finite",
                self.variables[pos].name
            )));
        }
        for row in &self.constraints {
            if !row.rhs.is_finite() {
                return Err(SolverError::InvalidModel(format!(
                    "constraint '{}' has right-hand side {}",
                    row.name, row.rhs
                )));
            }
            for (var, coeff) in &row.terms {
                if var.value() >= self.variables.len() {
                    return Err(SolverError::InvalidModel(format!(
                        "constraint '{}' references unknown variable {}",
                        row.name,
                        var.value()
                    )));
                }
                if !coeff.is_finite() {
                    return Err(SolverError::InvalidModel(format!(
                        "constraint '{}' has a non-finite coefficient",
                        row.name
                    )));
                }
            }
        }
        Ok(())
    }
}
