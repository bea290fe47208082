//! # Semantic Primitives
//!
//! Degree bounds and the shared combinators of PGML.
//!
//! These are the only places where two degrees are combined. Connectives and
//! modal operators both route through them, so each rule exists exactly once.
//!
//! ## Combinators
//!
//! 1. **Implication**: `1` when the antecedent does not exceed the consequent, else the consequent.
//! 2. **Coimplication**: `0` when the left operand does not exceed the right, else the left operand.
//! 3. **Graded conjunction**: the minimum, used inside modal aggregation.
//!
//! None of them computes a new value; every result is an input or a bound.

use crate::Degree;

/// Lowest admissible degree.
pub const DEGREE_MIN: Degree = 0.0;

/// Highest admissible degree.
pub const DEGREE_MAX: Degree = 1.0;

/// Maximum nesting level the evaluator descends into.
///
/// - Evaluation recurses once per level, so it must be bounded.
/// - Deeper formulas fail with `FormulaTooDeep` instead of overflowing the stack.
pub const MAX_FORMULA_DEPTH: usize = 512;

/// Check whether a value is an admissible degree.
///
/// Both bounds are inclusive. NaN is never a degree.
#[must_use]
pub fn is_degree(value: Degree) -> bool {
    (DEGREE_MIN..=DEGREE_MAX).contains(&value)
}

/// `1 if a <= b else b`.
///
/// The true branch is the constant 1, the false branch is `b` itself
/// (not a complement).
#[must_use]
pub fn implication(a: Degree, b: Degree) -> Degree {
    if a <= b { DEGREE_MAX } else { b }
}

/// `0 if b <= a else b`.
///
/// Operand order matters: `b` is the value that survives.
#[must_use]
pub fn coimplication(b: Degree, a: Degree) -> Degree {
    if b <= a { DEGREE_MIN } else { b }
}

/// `min(a, b)`.
#[must_use]
pub fn graded_conjunction(a: Degree, b: Degree) -> Degree {
    a.min(b)
}
