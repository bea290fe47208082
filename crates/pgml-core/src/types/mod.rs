//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the PGML engine:
//! - World and degree aliases (`World`, `Degree`)
//! - Variable identifiers (`VariableId`)
//! - The two degree tracks (`Track`) and their paired result (`Evaluation`)
//! - Error types (`PgmlError`)
//!
//! ## Two-Track Semantics
//!
//! Every proposition carries a support degree and a refutation degree.
//! The tracks are independent: they need not sum to 1, so a proposition may
//! be partially supported and partially refuted at the same time.

use std::fmt;
use thiserror::Error;

// =============================================================================
// WORLDS & DEGREES
// =============================================================================

/// Index of a world in `[0, worlds_size)`.
pub type World = usize;

/// A real-valued degree in the closed interval `[0, 1]`.
///
/// The bound is a validation invariant of the `Model`, not a property of the type.
pub type Degree = f64;

/// One row of the accessibility relation per world.
pub type Relation = Vec<Vec<Degree>>;

// =============================================================================
// VARIABLE IDENTIFIER
// =============================================================================

/// Opaque identifier of a propositional variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(pub String);

impl VariableId {
    /// Create a new variable identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariableId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VariableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TRACKS
// =============================================================================

/// The two independent degree tracks.
///
/// `Support` is "valuation 1", `Refutation` is "valuation 2".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Track {
    /// Degree to which a proposition is positively evidenced.
    Support,
    /// Degree to which a proposition is negatively evidenced.
    Refutation,
}

impl Track {
    /// The other track. Negation evaluates its operand on the dual track.
    #[must_use]
    pub const fn dual(self) -> Self {
        match self {
            Self::Support => Self::Refutation,
            Self::Refutation => Self::Support,
        }
    }

    /// Numeric name of the track: 1 for support, 2 for refutation.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Support => 1,
            Self::Refutation => 2,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "valuation {}", self.index())
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Both degrees of a formula at one world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Support degree (valuation 1).
    pub support: Degree,
    /// Refutation degree (valuation 2).
    pub refutation: Degree,
}

impl Evaluation {
    /// Create a new evaluation pair.
    #[must_use]
    pub const fn new(support: Degree, refutation: Degree) -> Self {
        Self {
            support,
            refutation,
        }
    }

    /// Degree on the given track.
    #[must_use]
    pub const fn on(&self, track: Track) -> Degree {
        match track {
            Track::Support => self.support,
            Track::Refutation => self.refutation,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.support, self.refutation)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the PGML engine.
///
/// - Validation errors come from `Model` construction and setters
/// - Lookup errors come from evaluation against an incompatible `Model`
/// - No error is ever converted into a default degree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PgmlError {
    /// The accessibility relation has the wrong shape.
    #[error("Relation error: {reason}")]
    InvalidRelation {
        /// What is wrong with the relation.
        reason: String,
    },

    /// A valuation mapping has the wrong shape.
    #[error("Valuation error: {track} {reason}")]
    InvalidValuation {
        /// The offending track.
        track: Track,
        /// What is wrong with the valuation.
        reason: String,
    },

    /// A degree lies outside `[0, 1]`.
    #[error("{structure} error: value {value} must be greater or equal than 0 and less or equal than 1")]
    DegreeOutOfRange {
        /// The structure the value was destined for.
        structure: Structure,
        /// The rejected value.
        value: Degree,
    },

    /// A formula references a variable absent from the valuation.
    #[error("Variable not found in {track}: {variable}")]
    UnknownVariable {
        /// The track that was consulted.
        track: Track,
        /// The missing variable.
        variable: VariableId,
    },

    /// A world index is outside `[0, worlds_size)`.
    #[error("World error: world {world} out of range for {worlds_size} worlds")]
    WorldOutOfRange {
        /// The rejected world.
        world: World,
        /// The model's world count.
        worlds_size: usize,
    },

    /// A modal operator was evaluated over an empty world set.
    #[error("Modal aggregation over an empty world set")]
    EmptyDomain,

    /// A formula is nested deeper than the evaluator descends.
    #[error("Formula nesting exceeds {limit} levels")]
    FormulaTooDeep {
        /// The nesting limit.
        limit: usize,
    },

    /// Evaluation configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

/// The model structure a degree belongs to, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// The accessibility relation.
    Relation,
    /// One of the two valuation mappings.
    Valuation(Track),
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relation => f.write_str("Relation"),
            Self::Valuation(track) => write!(f, "Valuation {}", track.index()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
