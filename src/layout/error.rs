//! Error types for the layout engine

use thiserror::Error;

use super::solver::SolverError;
use super::types::{Axis, MAX_PIXELS};

/// Errors that can occur while building or resolving a layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Two elements declared with the same id
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: String },

    /// Lookup of an id that was never registered
    #[error("unknown element '{id}'")]
    UnknownElement { id: String, suggestions: Vec<String> },

    /// A constraint names a target element that does not exist
    #[error("constraint '{from}' targets undefined element '{target}'")]
    DanglingReference {
        from: String,
        target: String,
        suggestions: Vec<String>,
    },

    /// A horizontal anchor connected to a vertical one or vice versa
    #[error("cannot connect '{from}' to '{to}': anchors lie on different axes")]
    AxisMismatch { from: String, to: String },

    /// Constraints that cannot all hold at once
    #[error("unsatisfiable {axis} constraints between {}: {reason}", elements.join(", "))]
    Unsatisfiable {
        axis: Axis,
        elements: Vec<String>,
        reason: String,
    },

    /// A declared or computed value beyond the supported pixel range
    #[error("{what} is {value}, outside the supported range of ±{} pixels", MAX_PIXELS)]
    OutOfRange { what: String, value: i64 },

    /// The request has no `parent` element
    #[error("layout has no 'parent' container element")]
    MissingContainer,

    /// Linear solver failure not attributable to the input
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),

    /// Broken engine invariant
    #[error("internal layout error: {0}")]
    Internal(String),
}

impl LayoutError {
    /// Create an unknown element error with suggestions
    pub fn unknown(id: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnknownElement {
            id: id.into(),
            suggestions,
        }
    }

    /// Create a dangling reference error with suggestions
    pub fn dangling(
        from: impl Into<String>,
        target: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self::DanglingReference {
            from: from.into(),
            target: target.into(),
            suggestions,
        }
    }

    /// Create an unsatisfiable constraints error
    pub fn unsatisfiable(axis: Axis, elements: Vec<String>, reason: impl Into<String>) -> Self {
        Self::Unsatisfiable {
            axis,
            elements,
            reason: reason.into(),
        }
    }

    pub fn out_of_range(what: impl Into<String>, value: i64) -> Self {
        Self::OutOfRange {
            what: what.into(),
            value,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownElement { suggestions, .. } => Some(suggestions),
            Self::DanglingReference { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }

    /// Message including "did you mean" hints, for reporting to callers
    pub fn detailed_message(&self) -> String {
        match self.suggestions() {
            Some(suggestions) if !suggestions.is_empty() => {
                format!("{} (did you mean: {}?)", self, suggestions.join(", "))
            }
            _ => self.to_string(),
        }
    }
}
