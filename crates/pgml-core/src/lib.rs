//! # pgml-core
//!
//! The evaluation engine for Paraconsistent Graded Modal Logic.
//!
//! Every proposition carries two independent degrees in `[0, 1]`: a support
//! degree and a refutation degree. Formulas are evaluated at a world of a
//! finite graded Kripke model, where Box and Diamond aggregate over the
//! worlds weighted by a degree-valued accessibility relation.
//!
//! ## Usage
//!
//! ```
//! use pgml_core::{Expression, Model};
//!
//! let model = Model::builder(2)
//!     .self_relation(true)
//!     .support("p", vec![0.8, 0.2])
//!     .refutation("p", vec![0.1, 0.6])
//!     .build()?;
//!
//! let formula = Expression::necessity(Expression::variable("p"));
//! assert_eq!(formula.valuation1(&model, 0)?, 0.8);
//! assert_eq!(formula.valuation2(&model, 1)?, 0.6);
//! # Ok::<(), pgml_core::PgmlError>(())
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no I/O, no async, no global state
//! - Models are validated eagerly at every entry point
//! - Connective formulas are reproduced exactly; they are not the textbook
//!   fuzzy-logic connectives
//! - The library emits `tracing` events but never installs a subscriber

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod evaluator;
pub mod expression;
pub mod model;
pub mod primitives;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Degree, Evaluation, PgmlError, Relation, Structure, Track, VariableId, World};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::{EmptyDomainPolicy, EvalConfig};
pub use evaluator::Evaluator;
pub use expression::Expression;
pub use model::{Model, ModelBuilder, Valuation};
