//! Constraint solver integration for cyclic anchor subgraphs
//!
//! This module wraps the kasuari Cassowary solver, translating the
//! per-axis equations of mutually dependent elements into the solver's
//! format and extracting solutions. Edges and sizes are REQUIRED: a
//! conflict is reported, never relaxed. Bias placement is STRONG so an
//! element wider than its span settles on its leading bound.

use std::collections::HashMap;

use kasuari::{
    Expression, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

/// Per-axis properties of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisProperty {
    /// Leading edge position
    Start,
    /// Extent along the axis
    Size,
}

/// A variable in the constraint system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolverVariable {
    pub element_id: String,
    pub property: AxisProperty,
}

impl SolverVariable {
    pub fn new(element_id: impl Into<String>, property: AxisProperty) -> Self {
        Self {
            element_id: element_id.into(),
            property,
        }
    }

    pub fn start(element_id: impl Into<String>) -> Self {
        Self::new(element_id, AxisProperty::Start)
    }

    pub fn size(element_id: impl Into<String>) -> Self {
        Self::new(element_id, AxisProperty::Size)
    }
}

/// Anchor position on the axis being solved
#[derive(Debug, Clone, PartialEq)]
pub enum PositionTerm {
    /// Already resolved position
    Constant(f64),
    /// Leading edge of an unresolved element
    Start(String),
    /// Trailing edge of an unresolved element (start + size)
    End(String),
}

/// A position term shifted by a constant offset
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub term: PositionTerm,
    pub offset: f64,
}

impl Position {
    pub fn constant(value: f64) -> Self {
        Self {
            term: PositionTerm::Constant(value),
            offset: 0.0,
        }
    }

    pub fn start(element_id: impl Into<String>) -> Self {
        Self {
            term: PositionTerm::Start(element_id.into()),
            offset: 0.0,
        }
    }

    pub fn end(element_id: impl Into<String>) -> Self {
        Self {
            term: PositionTerm::End(element_id.into()),
            offset: 0.0,
        }
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset += offset;
        self
    }
}

/// Origin of a constraint (for error messages)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintOrigin {
    /// Declared anchor edge
    Edge,
    /// Declared or derived element size
    Size,
    /// Bias placement between two anchors
    Bias,
    /// Chain member sharing
    Chain,
}

/// Tracks where a constraint came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSource {
    pub description: String,
    pub origin: ConstraintOrigin,
}

impl ConstraintSource {
    pub fn edge(description: impl Into<String>) -> Self {
        Self::new(description, ConstraintOrigin::Edge)
    }

    pub fn size(description: impl Into<String>) -> Self {
        Self::new(description, ConstraintOrigin::Size)
    }

    pub fn bias(description: impl Into<String>) -> Self {
        Self::new(description, ConstraintOrigin::Bias)
    }

    pub fn chain(description: impl Into<String>) -> Self {
        Self::new(description, ConstraintOrigin::Chain)
    }

    fn new(description: impl Into<String>, origin: ConstraintOrigin) -> Self {
        Self {
            description: description.into(),
            origin,
        }
    }
}

/// A linear equation over element positions and sizes
#[derive(Debug, Clone)]
pub enum LinearConstraint {
    /// variable = value
    Fixed {
        variable: SolverVariable,
        value: f64,
        source: ConstraintSource,
    },

    /// left = right
    Equal {
        left: Position,
        right: Position,
        source: ConstraintSource,
    },

    /// left >= right
    AtLeast {
        left: Position,
        right: Position,
        source: ConstraintSource,
    },

    /// (1 - bias) * (lead - low) = bias * (high - trail), preferred but not required
    Balanced {
        lead: Position,
        low: Position,
        trail: Position,
        high: Position,
        bias: f64,
        source: ConstraintSource,
    },

    /// size(a) = size(b)
    SameSize {
        a: String,
        b: String,
        source: ConstraintSource,
    },
}

impl LinearConstraint {
    /// Get the source of this constraint
    pub fn source(&self) -> &ConstraintSource {
        match self {
            LinearConstraint::Fixed { source, .. } => source,
            LinearConstraint::Equal { source, .. } => source,
            LinearConstraint::AtLeast { source, .. } => source,
            LinearConstraint::Balanced { source, .. } => source,
            LinearConstraint::SameSize { source, .. } => source,
        }
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable constraints: {reason}")]
    Unsatisfiable {
        conflicting: Vec<ConstraintSource>,
        reason: String,
    },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<SolverVariable, KasuariVariable>,
    /// Tracks constraint sources for error reporting
    sources: Vec<ConstraintSource>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            sources: Vec::new(),
        }
    }

    /// Get or create a kasuari variable for our variable
    fn get_or_create_var(&mut self, var: &SolverVariable) -> KasuariVariable {
        if let Some(&kvar) = self.variables.get(var) {
            kvar
        } else {
            let kvar = KasuariVariable::new();
            self.variables.insert(var.clone(), kvar);
            kvar
        }
    }

    /// Create a kasuari expression for a position
    fn get_expression(&mut self, position: &Position) -> Expression {
        let base: Expression = match &position.term {
            PositionTerm::Constant(value) => Expression::from(*value),
            PositionTerm::Start(id) => self
                .get_or_create_var(&SolverVariable::start(id.as_str()))
                .into(),
            PositionTerm::End(id) => {
                // end = start + size
                let start = self.get_or_create_var(&SolverVariable::start(id.as_str()));
                let size = self.get_or_create_var(&SolverVariable::size(id.as_str()));
                start + size
            }
        };
        base + position.offset
    }

    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        source: &ConstraintSource,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                let mut conflicting = vec![source.clone()];
                conflicting.extend(self.sources.iter().cloned());
                SolverError::Unsatisfiable {
                    conflicting,
                    reason: format!(
                        "cannot satisfy {}: conflicts with existing constraints",
                        source.description
                    ),
                }
            }
            kasuari::AddConstraintError::DuplicateConstraint => SolverError::Internal(format!(
                "duplicate constraint: {}",
                source.description
            )),
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal(
                format!("internal solver error for {}: {}", source.description, msg),
            ),
        }
    }

    /// Add a constraint to the solver
    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> Result<(), SolverError> {
        let kconstraint = match &constraint {
            LinearConstraint::Fixed {
                variable, value, ..
            } => {
                let var = self.get_or_create_var(variable);
                var | EQ(Strength::REQUIRED) | *value
            }
            LinearConstraint::Equal { left, right, .. } => {
                let left_expr = self.get_expression(left);
                let right_expr = self.get_expression(right);
                left_expr | EQ(Strength::REQUIRED) | right_expr
            }
            LinearConstraint::AtLeast { left, right, .. } => {
                let left_expr = self.get_expression(left);
                let right_expr = self.get_expression(right);
                left_expr | GE(Strength::REQUIRED) | right_expr
            }
            LinearConstraint::Balanced {
                lead,
                low,
                trail,
                high,
                bias,
                ..
            } => {
                // (1 - b) * lead + b * trail = (1 - b) * low + b * high
                let lead_expr = self.get_expression(lead);
                let low_expr = self.get_expression(low);
                let trail_expr = self.get_expression(trail);
                let high_expr = self.get_expression(high);
                (1.0 - bias) * lead_expr + *bias * trail_expr
                    | EQ(Strength::STRONG)
                    | (1.0 - bias) * low_expr + *bias * high_expr
            }
            LinearConstraint::SameSize { a, b, .. } => {
                let a_size = self.get_or_create_var(&SolverVariable::size(a.as_str()));
                let b_size = self.get_or_create_var(&SolverVariable::size(b.as_str()));
                a_size | EQ(Strength::REQUIRED) | b_size
            }
        };

        let source = constraint.source();
        match self.solver.add_constraint(kconstraint) {
            // The same equation twice is harmless
            Ok(()) | Err(kasuari::AddConstraintError::DuplicateConstraint) => {}
            Err(e) => return Err(self.convert_kasuari_error(e, source)),
        }
        self.sources.push(source.clone());
        Ok(())
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solution from the constraint solver
pub struct Solution {
    values: HashMap<SolverVariable, f64>,
}

impl Solution {
    /// Get value for a variable; variables the solver never moved are 0
    pub fn get(&self, var: &SolverVariable) -> f64 {
        self.values.get(var).copied().unwrap_or(0.0)
    }

    pub fn start(&self, element_id: &str) -> f64 {
        self.get(&SolverVariable::start(element_id))
    }

    pub fn size(&self, element_id: &str) -> f64 {
        self.get(&SolverVariable::size(element_id))
    }
}

impl ConstraintSolver {
    /// Solve the constraint system
    pub fn solve(&mut self) -> Result<Solution, SolverError> {
        let changes = self.solver.fetch_changes();

        let by_kvar: HashMap<KasuariVariable, &SolverVariable> =
            self.variables.iter().map(|(ours, k)| (*k, ours)).collect();

        let mut values = HashMap::new();
        for (kvar, value) in changes {
            if !value.is_finite() {
                return Err(SolverError::Internal(format!(
                    "non-finite solution value {value}"
                )));
            }
            if let Some(var) = by_kvar.get(kvar) {
                values.insert((*var).clone(), *value);
            }
        }

        Ok(Solution { values })
    }
}
