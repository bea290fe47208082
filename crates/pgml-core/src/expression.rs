//! # Expression Tree
//!
//! Formulas of PGML as a closed sum type.
//!
//! - Trees are immutable once built
//! - Construction never consults a `Model`; an undeclared variable fails at
//!   evaluation time
//! - Both degree tracks are computed by the `Evaluator`; the methods here
//!   use the default configuration

use crate::evaluator::Evaluator;
use crate::{Degree, Evaluation, Model, PgmlError, Track, VariableId, World};
use std::collections::BTreeSet;
use std::fmt;

/// A PGML formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Propositional variable (leaf).
    Variable(VariableId),
    /// Paraconsistent negation: swaps the two tracks.
    Negation(Box<Expression>),
    /// Support is the max, refutation the min.
    Conjunction(Box<Expression>, Box<Expression>),
    /// Support is the min, refutation the max.
    Disjunction(Box<Expression>, Box<Expression>),
    /// Left to right implication.
    Implication(Box<Expression>, Box<Expression>),
    /// Mirror of implication with tracks exchanged.
    Coimplication(Box<Expression>, Box<Expression>),
    /// Necessity over accessible worlds.
    Box(Box<Expression>),
    /// Possibility over accessible worlds.
    Diamond(Box<Expression>),
}

impl Expression {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// A variable leaf.
    #[must_use]
    pub fn variable(name: impl Into<VariableId>) -> Self {
        Self::Variable(name.into())
    }

    /// `¬operand`.
    #[must_use]
    pub fn negation(operand: Self) -> Self {
        Self::Negation(Box::new(operand))
    }

    /// `left ∧ right`.
    #[must_use]
    pub fn conjunction(left: Self, right: Self) -> Self {
        Self::Conjunction(Box::new(left), Box::new(right))
    }

    /// `left ∨ right`.
    #[must_use]
    pub fn disjunction(left: Self, right: Self) -> Self {
        Self::Disjunction(Box::new(left), Box::new(right))
    }

    /// `left → right`.
    #[must_use]
    pub fn implication(left: Self, right: Self) -> Self {
        Self::Implication(Box::new(left), Box::new(right))
    }

    /// `left ← right`.
    #[must_use]
    pub fn coimplication(left: Self, right: Self) -> Self {
        Self::Coimplication(Box::new(left), Box::new(right))
    }

    /// `□operand`.
    #[must_use]
    pub fn necessity(operand: Self) -> Self {
        Self::Box(Box::new(operand))
    }

    /// `◇operand`.
    #[must_use]
    pub fn possibility(operand: Self) -> Self {
        Self::Diamond(Box::new(operand))
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    /// Support degree at `world` ("valuation 1").
    pub fn valuation1(&self, model: &Model, world: World) -> Result<Degree, PgmlError> {
        Evaluator::default().degree(self, model, world, Track::Support)
    }

    /// Refutation degree at `world` ("valuation 2").
    pub fn valuation2(&self, model: &Model, world: World) -> Result<Degree, PgmlError> {
        Evaluator::default().degree(self, model, world, Track::Refutation)
    }

    /// Both degrees at `world`.
    pub fn evaluate(&self, model: &Model, world: World) -> Result<Evaluation, PgmlError> {
        Evaluator::default().evaluate(self, model, world)
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Immediate subformulas, left to right.
    fn children(&self) -> Vec<&Self> {
        match self {
            Self::Variable(_) => Vec::new(),
            Self::Negation(operand) | Self::Box(operand) | Self::Diamond(operand) => {
                vec![&**operand]
            }
            Self::Conjunction(left, right)
            | Self::Disjunction(left, right)
            | Self::Implication(left, right)
            | Self::Coimplication(left, right) => vec![&**left, &**right],
        }
    }

    /// Nesting depth; a variable has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1_usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            let next = level.saturating_add(1);
            stack.extend(node.children().into_iter().map(|child| (child, next)));
        }
        deepest
    }

    /// Maximum number of nested modal operators.
    ///
    /// Evaluation cost grows as `worlds_size ^ modal_depth` without memoization.
    #[must_use]
    pub fn modal_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0_usize)];
        while let Some((node, level)) = stack.pop() {
            let level = match node {
                Self::Box(_) | Self::Diamond(_) => level.saturating_add(1),
                _ => level,
            };
            deepest = deepest.max(level);
            stack.extend(node.children().into_iter().map(|child| (child, level)));
        }
        deepest
    }

    /// Every variable referenced by the formula, in order.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&VariableId> {
        let mut found = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Self::Variable(name) = node {
                found.insert(name);
            }
            stack.extend(node.children());
        }
        found
    }

    /// Check that every referenced variable is declared on both tracks of `model`.
    ///
    /// Optional: evaluation reports the same condition lazily.
    pub fn check_against(&self, model: &Model) -> Result<(), PgmlError> {
        for variable in self.variables() {
            for track in [Track::Support, Track::Refutation] {
                if !model.valuation(track).contains_key(variable) {
                    return Err(PgmlError::UnknownVariable {
                        track,
                        variable: variable.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// Dropping a long chain node by node would recurse once per level.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

impl Expression {
    /// Move the children onto `pending`, leaving empty leaves behind.
    fn take_children(&mut self, pending: &mut Vec<Box<Self>>) {
        let leaf = || Box::new(Self::Variable(VariableId(String::new())));
        match self {
            Self::Variable(_) => {}
            Self::Negation(operand) | Self::Box(operand) | Self::Diamond(operand) => {
                pending.push(std::mem::replace(operand, leaf()));
            }
            Self::Conjunction(left, right)
            | Self::Disjunction(left, right)
            | Self::Implication(left, right)
            | Self::Coimplication(left, right) => {
                pending.push(std::mem::replace(left, leaf()));
                pending.push(std::mem::replace(right, leaf()));
            }
        }
    }
}

impl From<VariableId> for Expression {
    fn from(name: VariableId) -> Self {
        Self::Variable(name)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "Variable({})", name),
            Self::Negation(operand) => write!(f, "Negation({})", operand),
            Self::Conjunction(left, right) => write!(f, "Conjunction({}, {})", left, right),
            Self::Disjunction(left, right) => write!(f, "Disjunction({}, {})", left, right),
            Self::Implication(left, right) => write!(f, "Implication({}, {})", left, right),
            Self::Coimplication(left, right) => write!(f, "Coimplication({}, {})", left, right),
            Self::Box(operand) => write!(f, "Box({})", operand),
            Self::Diamond(operand) => write!(f, "Diamond({})", operand),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Expression {
        Expression::variable("p")
    }

    fn q() -> Expression {
        Expression::variable("q")
    }

    /// One world, `p = <0.3, 0.6>`, `q = <0.7, 0.2>`.
    fn single_world() -> Model {
        Model::builder(1)
            .self_relation(true)
            .support("p", vec![0.3])
            .refutation("p", vec![0.6])
            .support("q", vec![0.7])
            .refutation("q", vec![0.2])
            .build()
            .expect("build")
    }

    #[test]
    fn variable_reads_both_tracks() {
        let model = single_world();
        assert_eq!(p().valuation1(&model, 0).expect("v1"), 0.3);
        assert_eq!(p().valuation2(&model, 0).expect("v2"), 0.6);
        assert_eq!(
            p().evaluate(&model, 0).expect("eval"),
            Evaluation::new(0.3, 0.6)
        );
    }

    #[test]
    fn negation_swaps_tracks() {
        let model = single_world();
        let not_p = Expression::negation(p());
        assert_eq!(not_p.valuation1(&model, 0).expect("v1"), 0.6);
        assert_eq!(not_p.valuation2(&model, 0).expect("v2"), 0.3);
    }

    #[test]
    fn conjunction_support_is_max() {
        let model = single_world();
        let expr = Expression::conjunction(p(), q());
        assert_eq!(expr.valuation1(&model, 0).expect("v1"), 0.7);
        assert_eq!(expr.valuation2(&model, 0).expect("v2"), 0.2);
    }

    #[test]
    fn disjunction_support_is_min() {
        let model = single_world();
        let expr = Expression::disjunction(p(), q());
        assert_eq!(expr.valuation1(&model, 0).expect("v1"), 0.3);
        assert_eq!(expr.valuation2(&model, 0).expect("v2"), 0.6);
    }

    #[test]
    fn implication_tracks() {
        let model = single_world();
        // support: 0.3 <= 0.7 -> 1; refutation: right 0.2 <= left 0.6 -> 0
        let pq = Expression::implication(p(), q());
        assert_eq!(pq.valuation1(&model, 0).expect("v1"), 1.0);
        assert_eq!(pq.valuation2(&model, 0).expect("v2"), 0.0);

        // support: 0.7 > 0.3 -> 0.3; refutation: right 0.6 > left 0.2 -> 0.6
        let qp = Expression::implication(q(), p());
        assert_eq!(qp.valuation1(&model, 0).expect("v1"), 0.3);
        assert_eq!(qp.valuation2(&model, 0).expect("v2"), 0.6);
    }

    #[test]
    fn coimplication_tracks() {
        let model = single_world();
        // support: left 0.3 <= right 0.7 -> 0; refutation: right 0.2 <= left 0.6 -> 1
        let pq = Expression::coimplication(p(), q());
        assert_eq!(pq.valuation1(&model, 0).expect("v1"), 0.0);
        assert_eq!(pq.valuation2(&model, 0).expect("v2"), 1.0);

        // support: left 0.7 > right 0.3 -> 0.7; refutation: right 0.6 > left 0.2 -> 0.2
        let qp = Expression::coimplication(q(), p());
        assert_eq!(qp.valuation1(&model, 0).expect("v1"), 0.7);
        assert_eq!(qp.valuation2(&model, 0).expect("v2"), 0.2);
    }

    #[test]
    fn undeclared_variable_fails_at_evaluation() {
        let model = single_world();
        let expr = Expression::variable("r");
        assert!(matches!(
            expr.valuation1(&model, 0),
            Err(PgmlError::UnknownVariable {
                track: Track::Support,
                ..
            })
        ));
        assert!(matches!(
            expr.valuation2(&model, 0),
            Err(PgmlError::UnknownVariable {
                track: Track::Refutation,
                ..
            })
        ));
    }

    #[test]
    fn world_out_of_range_fails() {
        let model = single_world();
        assert!(matches!(
            p().valuation1(&model, 1),
            Err(PgmlError::WorldOutOfRange { world: 1, .. })
        ));
        assert!(matches!(
            Expression::necessity(p()).valuation1(&model, 3),
            Err(PgmlError::WorldOutOfRange { world: 3, .. })
        ));
    }

    #[test]
    fn display_is_structural() {
        let expr = Expression::necessity(Expression::conjunction(
            p(),
            Expression::negation(q()),
        ));
        assert_eq!(
            expr.to_string(),
            "Box(Conjunction(Variable(p), Negation(Variable(q))))"
        );
        assert_eq!(
            Expression::possibility(Expression::coimplication(p(), q())).to_string(),
            "Diamond(Coimplication(Variable(p), Variable(q)))"
        );
    }

    #[test]
    fn depth_and_modal_depth() {
        assert_eq!(p().depth(), 1);
        assert_eq!(p().modal_depth(), 0);

        let expr = Expression::implication(
            Expression::necessity(Expression::possibility(p())),
            Expression::negation(Expression::necessity(q())),
        );
        assert_eq!(expr.depth(), 4);
        assert_eq!(expr.modal_depth(), 2);
    }

    #[test]
    fn structure_of_long_chain() {
        let mut expr = p();
        for level in 0..50_000 {
            expr = if level % 2 == 0 {
                Expression::necessity(expr)
            } else {
                Expression::conjunction(q(), expr)
            };
        }
        assert_eq!(expr.depth(), 50_001);
        assert_eq!(expr.modal_depth(), 25_000);
        assert_eq!(expr.variables().len(), 2);
        drop(expr);
    }

    #[test]
    fn variables_are_deduplicated() {
        let expr = Expression::conjunction(q(), Expression::disjunction(p(), q()));
        let names: Vec<&str> = expr.variables().iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["p", "q"]);
    }

    #[test]
    fn check_against_requires_both_tracks() {
        let model = Model::builder(1)
            .support("p", vec![0.5])
            .build()
            .expect("build");
        assert!(matches!(
            p().check_against(&model),
            Err(PgmlError::UnknownVariable {
                track: Track::Refutation,
                ..
            })
        ));
        assert!(p().check_against(&single_world()).is_ok());
    }
}
