//! # Evaluator
//!
//! Two-track recursive evaluation of PGML formulas.
//!
//! Evaluation is a pure function of (expression, model, world, track):
//! - Negation evaluates its operand on the dual track
//! - Binary connectives combine both operands on the same track
//! - Box and Diamond fold over every world of the model, weighting each
//!   operand degree by the accessibility of that world
//!
//! ## Modal Aggregation
//!
//! | Operator | Support                     | Refutation                  |
//! |----------|-----------------------------|-----------------------------|
//! | Box      | min over w' of impl(R, φ₁)  | max over w' of min(R, φ₂)   |
//! | Diamond  | max over w' of min(R, φ₁)   | min over w' of impl(R, φ₂)  |
//!
//! ## Memoization
//!
//! With `EvalConfig::memoize`, results are cached per `(node, world, track)`
//! for the duration of one call. The cache never outlives the borrow of the
//! Model, so it cannot observe a later mutation.
//!
//! ## Bounded Recursion
//!
//! Nesting deeper than `MAX_FORMULA_DEPTH` fails with
//! `PgmlError::FormulaTooDeep` instead of exhausting the stack.

use crate::config::{EmptyDomainPolicy, EvalConfig};
use crate::primitives::{
    DEGREE_MAX, DEGREE_MIN, MAX_FORMULA_DEPTH, coimplication, graded_conjunction, implication,
};
use crate::validation::check_world;
use crate::{Degree, Evaluation, Expression, Model, PgmlError, Track, World};
use std::collections::BTreeMap;

// =============================================================================
// QUANTIFIERS
// =============================================================================

/// The two ways a modal operator folds over worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    /// `min` of `impl(R, φ)`.
    Universal,
    /// `max` of `min(R, φ)`.
    Existential,
}

impl Quantifier {
    /// Value of the fold over an empty set of worlds.
    const fn identity(self) -> Degree {
        match self {
            Self::Universal => DEGREE_MAX,
            Self::Existential => DEGREE_MIN,
        }
    }

    fn fold(self, acc: Degree, access: Degree, degree: Degree) -> Degree {
        match self {
            Self::Universal => acc.min(implication(access, degree)),
            Self::Existential => acc.max(graded_conjunction(access, degree)),
        }
    }

    /// Box is universal on support and existential on refutation; Diamond is the dual.
    const fn of(necessity: bool, track: Track) -> Self {
        match (necessity, track) {
            (true, Track::Support) | (false, Track::Refutation) => Self::Universal,
            (true, Track::Refutation) | (false, Track::Support) => Self::Existential,
        }
    }
}

// =============================================================================
// EVALUATOR
// =============================================================================

/// Evaluates expressions against a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator with the given configuration.
    #[must_use]
    pub const fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Support degree of `expr` at `world`.
    pub fn support(
        &self,
        expr: &Expression,
        model: &Model,
        world: World,
    ) -> Result<Degree, PgmlError> {
        self.degree(expr, model, world, Track::Support)
    }

    /// Refutation degree of `expr` at `world`.
    pub fn refutation(
        &self,
        expr: &Expression,
        model: &Model,
        world: World,
    ) -> Result<Degree, PgmlError> {
        self.degree(expr, model, world, Track::Refutation)
    }

    /// Degree of `expr` at `world` on `track`.
    pub fn degree(
        &self,
        expr: &Expression,
        model: &Model,
        world: World,
        track: Track,
    ) -> Result<Degree, PgmlError> {
        let _span = tracing::debug_span!("evaluate", world, %track).entered();
        Pass::new(model, self.config).eval(expr, world, track)
    }

    /// Both degrees of `expr` at `world`.
    pub fn evaluate(
        &self,
        expr: &Expression,
        model: &Model,
        world: World,
    ) -> Result<Evaluation, PgmlError> {
        let _span = tracing::debug_span!("evaluate", world).entered();
        let mut pass = Pass::new(model, self.config);
        Ok(Evaluation::new(
            pass.eval(expr, world, Track::Support)?,
            pass.eval(expr, world, Track::Refutation)?,
        ))
    }

    /// Both degrees of `expr` at every world, in world order.
    pub fn evaluate_all(
        &self,
        expr: &Expression,
        model: &Model,
    ) -> Result<Vec<Evaluation>, PgmlError> {
        let _span =
            tracing::debug_span!("evaluate_all", worlds_size = model.worlds_size()).entered();
        let mut pass = Pass::new(model, self.config);
        (0..model.worlds_size())
            .map(|world| {
                Ok(Evaluation::new(
                    pass.eval(expr, world, Track::Support)?,
                    pass.eval(expr, world, Track::Refutation)?,
                ))
            })
            .collect()
    }
}

// =============================================================================
// EVALUATION PASS
// =============================================================================

/// Cache key: node address, world, track.
type MemoKey = (usize, World, Track);

/// State of one top-level evaluation call.
struct Pass<'m> {
    model: &'m Model,
    empty_domain: EmptyDomainPolicy,
    memo: Option<BTreeMap<MemoKey, Degree>>,
    /// Current nesting level of `eval`.
    depth: usize,
}

impl<'m> Pass<'m> {
    fn new(model: &'m Model, config: EvalConfig) -> Self {
        Self {
            model,
            empty_domain: config.empty_domain,
            memo: config.memoize.then(BTreeMap::new),
            depth: 0,
        }
    }

    fn eval(&mut self, expr: &Expression, world: World, track: Track) -> Result<Degree, PgmlError> {
        // The tree is borrowed for the whole pass, so node addresses are stable.
        let key = (std::ptr::from_ref(expr) as usize, world, track);

        if let Some(&cached) = self.memo.as_ref().and_then(|memo| memo.get(&key)) {
            tracing::trace!(world, %track, "memo hit");
            return Ok(cached);
        }

        if self.depth >= MAX_FORMULA_DEPTH {
            return Err(PgmlError::FormulaTooDeep {
                limit: MAX_FORMULA_DEPTH,
            });
        }

        self.depth = self.depth.saturating_add(1);
        let result = self.compute(expr, world, track);
        self.depth = self.depth.saturating_sub(1);
        let degree = result?;

        if let Some(memo) = self.memo.as_mut() {
            memo.insert(key, degree);
        }
        Ok(degree)
    }

    fn compute(
        &mut self,
        expr: &Expression,
        world: World,
        track: Track,
    ) -> Result<Degree, PgmlError> {
        match expr {
            Expression::Variable(name) => self.model.degree(track, name, world),

            Expression::Negation(operand) => self.eval(operand, world, track.dual()),

            Expression::Conjunction(left, right) => {
                let a = self.eval(left, world, track)?;
                let b = self.eval(right, world, track)?;
                Ok(match track {
                    Track::Support => a.max(b),
                    Track::Refutation => a.min(b),
                })
            }

            Expression::Disjunction(left, right) => {
                let a = self.eval(left, world, track)?;
                let b = self.eval(right, world, track)?;
                Ok(match track {
                    Track::Support => a.min(b),
                    Track::Refutation => a.max(b),
                })
            }

            Expression::Implication(left, right) => {
                let l = self.eval(left, world, track)?;
                let r = self.eval(right, world, track)?;
                Ok(match track {
                    Track::Support => implication(l, r),
                    Track::Refutation => coimplication(r, l),
                })
            }

            Expression::Coimplication(left, right) => {
                let l = self.eval(left, world, track)?;
                let r = self.eval(right, world, track)?;
                Ok(match track {
                    Track::Support => coimplication(l, r),
                    Track::Refutation => implication(r, l),
                })
            }

            Expression::Box(operand) => {
                self.modal(operand, world, track, Quantifier::of(true, track))
            }

            Expression::Diamond(operand) => {
                self.modal(operand, world, track, Quantifier::of(false, track))
            }
        }
    }

    /// Fold `quantifier` over every world, weighting by `relation[world][w']`.
    fn modal(
        &mut self,
        operand: &Expression,
        world: World,
        track: Track,
        quantifier: Quantifier,
    ) -> Result<Degree, PgmlError> {
        let model = self.model;
        let worlds_size = model.worlds_size();

        if worlds_size == 0 {
            return match self.empty_domain {
                EmptyDomainPolicy::Extremal => Ok(quantifier.identity()),
                EmptyDomainPolicy::Reject => Err(PgmlError::EmptyDomain),
            };
        }
        check_world(world, worlds_size)?;

        let mut acc = quantifier.identity();
        for target in 0..worlds_size {
            let access = model.relation_degree(world, target)?;
            let degree = self.eval(operand, target, track)?;
            acc = quantifier.fold(acc, access, degree);
        }
        Ok(acc)
    }
}

// =============================================================================
// TESTS
// =============================================================================
