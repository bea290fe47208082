//! # Model
//!
//! The graded Kripke model evaluated by PGML.
//!
//! A `Model` owns:
//! - the world count
//! - the graded accessibility relation (a `worlds_size x worlds_size` matrix)
//! - two valuation mappings, one per degree track
//!
//! All structural invariants are checked at construction and at every
//! mutator, never lazily. A failed call leaves the Model untouched.
//!
//! ## Concurrency
//!
//! Mutators take `&mut self`, so the borrow checker already rules out
//! mutation during an in-flight evaluation on the same thread. Callers that
//! share a Model across threads must keep the single-writer-then-readers
//! discipline themselves (e.g. build, then share behind `Arc`).

use crate::primitives::{DEGREE_MAX, DEGREE_MIN};
use crate::types::Structure;
use crate::validation::{check_degree, check_relation, check_valuation, check_values, check_world};
use crate::{Degree, PgmlError, Relation, Track, VariableId, World};
use std::collections::{BTreeMap, BTreeSet};

/// Per-variable degrees, one entry per world.
pub type Valuation = BTreeMap<VariableId, Vec<Degree>>;

// =============================================================================
// MODEL
// =============================================================================

/// A graded Kripke model with two valuation tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    worlds_size: usize,
    /// `relation[i][j]` is how strongly world `i` sees world `j`.
    relation: Relation,
    /// Support track.
    valuation1: Valuation,
    /// Refutation track.
    valuation2: Valuation,
}

impl Model {
    /// Create a model with the default relation and empty valuations.
    ///
    /// The relation is the identity matrix when `self_relation` is true,
    /// otherwise all zeros.
    #[must_use]
    pub fn new(worlds_size: usize, self_relation: bool) -> Self {
        tracing::trace!(worlds_size, self_relation, "new model");
        Self {
            worlds_size,
            relation: default_relation(worlds_size, self_relation),
            valuation1: Valuation::new(),
            valuation2: Valuation::new(),
        }
    }

    /// Start building a model with explicit structures.
    #[must_use]
    pub fn builder(worlds_size: usize) -> ModelBuilder {
        ModelBuilder::new(worlds_size)
    }

    /// Positional constructor: every structure is optional.
    ///
    /// A missing relation is synthesized from `self_relation`; missing
    /// valuations are empty. Supplied structures are validated first.
    pub fn from_parts(
        worlds_size: usize,
        relation: Option<Relation>,
        valuation1: Option<Valuation>,
        valuation2: Option<Valuation>,
        self_relation: bool,
    ) -> Result<Self, PgmlError> {
        ModelBuilder {
            worlds_size,
            relation,
            valuation1,
            valuation2,
            self_relation,
        }
        .build()
    }

    // =========================================================================
    // READERS
    // =========================================================================

    /// Number of worlds.
    #[must_use]
    pub fn worlds_size(&self) -> usize {
        self.worlds_size
    }

    /// The accessibility relation, one row per world.
    #[must_use]
    pub fn relation(&self) -> &[Vec<Degree>] {
        &self.relation
    }

    /// Accessibility of `world2` from `world1`.
    pub fn relation_degree(&self, world1: World, world2: World) -> Result<Degree, PgmlError> {
        check_world(world1, self.worlds_size)?;
        check_world(world2, self.worlds_size)?;
        Ok(self.relation[world1][world2])
    }

    /// The support valuation ("valuation 1").
    #[must_use]
    pub fn valuation1(&self) -> &Valuation {
        &self.valuation1
    }

    /// The refutation valuation ("valuation 2").
    #[must_use]
    pub fn valuation2(&self) -> &Valuation {
        &self.valuation2
    }

    /// The valuation of the given track.
    #[must_use]
    pub fn valuation(&self, track: Track) -> &Valuation {
        match track {
            Track::Support => &self.valuation1,
            Track::Refutation => &self.valuation2,
        }
    }

    /// Degree of `variable` at `world` on `track`.
    ///
    /// Fails with `UnknownVariable` if the variable is not declared on that
    /// track, or `WorldOutOfRange` if the world has no entry.
    pub fn degree(
        &self,
        track: Track,
        variable: &VariableId,
        world: World,
    ) -> Result<Degree, PgmlError> {
        let values = self
            .valuation(track)
            .get(variable)
            .ok_or_else(|| PgmlError::UnknownVariable {
                track,
                variable: variable.clone(),
            })?;
        values
            .get(world)
            .copied()
            .ok_or(PgmlError::WorldOutOfRange {
                world,
                worlds_size: self.worlds_size,
            })
    }

    /// All variables declared on either track, in order.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&VariableId> {
        self.valuation1
            .keys()
            .chain(self.valuation2.keys())
            .collect()
    }

    /// Worlds that `world` sees with a non-zero degree.
    pub fn accessible_from(&self, world: World) -> Result<Vec<World>, PgmlError> {
        check_world(world, self.worlds_size)?;
        Ok(self.relation[world]
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree > DEGREE_MIN)
            .map(|(target, _)| target)
            .collect())
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Set the accessibility of `world2` from `world1`.
    pub fn set_relation(
        &mut self,
        world1: World,
        world2: World,
        value: Degree,
    ) -> Result<(), PgmlError> {
        check_degree(value, Structure::Relation)?;
        check_world(world1, self.worlds_size)?;
        check_world(world2, self.worlds_size)?;
        tracing::trace!(world1, world2, value, "set relation");
        self.relation[world1][world2] = value;
        Ok(())
    }

    /// Insert or overwrite the support degrees of `variable`.
    pub fn set_variable_valuation1(
        &mut self,
        variable: impl Into<VariableId>,
        values: Vec<Degree>,
    ) -> Result<(), PgmlError> {
        self.set_variable_valuation(Track::Support, variable, values)
    }

    /// Insert or overwrite the refutation degrees of `variable`.
    pub fn set_variable_valuation2(
        &mut self,
        variable: impl Into<VariableId>,
        values: Vec<Degree>,
    ) -> Result<(), PgmlError> {
        self.set_variable_valuation(Track::Refutation, variable, values)
    }

    /// Insert or overwrite the degrees of `variable` on `track`.
    ///
    /// `values` must hold exactly one degree per world.
    pub fn set_variable_valuation(
        &mut self,
        track: Track,
        variable: impl Into<VariableId>,
        values: Vec<Degree>,
    ) -> Result<(), PgmlError> {
        check_values(&values, track, self.worlds_size)?;
        let variable = variable.into();
        tracing::trace!(%variable, %track, "set variable valuation");
        self.valuation_mut(track).insert(variable, values);
        Ok(())
    }

    /// Set the support degree of a declared variable at one world.
    pub fn set_support_for_world(
        &mut self,
        variable: &VariableId,
        world: World,
        value: Degree,
    ) -> Result<(), PgmlError> {
        self.set_valuation_for_world(Track::Support, variable, world, value)
    }

    /// Set the refutation degree of a declared variable at one world.
    pub fn set_refutation_for_world(
        &mut self,
        variable: &VariableId,
        world: World,
        value: Degree,
    ) -> Result<(), PgmlError> {
        self.set_valuation_for_world(Track::Refutation, variable, world, value)
    }

    /// Set the degree of a declared variable at one world on `track`.
    ///
    /// The variable must already be declared on that track; this never
    /// creates an entry.
    pub fn set_valuation_for_world(
        &mut self,
        track: Track,
        variable: &VariableId,
        world: World,
        value: Degree,
    ) -> Result<(), PgmlError> {
        check_degree(value, Structure::Valuation(track))?;
        check_world(world, self.worlds_size)?;
        let worlds_size = self.worlds_size;
        let slot = self
            .valuation_mut(track)
            .get_mut(variable)
            .ok_or_else(|| PgmlError::UnknownVariable {
                track,
                variable: variable.clone(),
            })?
            .get_mut(world)
            .ok_or(PgmlError::WorldOutOfRange { world, worlds_size })?;
        tracing::trace!(%variable, %track, world, value, "set valuation for world");
        *slot = value;
        Ok(())
    }

    fn valuation_mut(&mut self, track: Track) -> &mut Valuation {
        match track {
            Track::Support => &mut self.valuation1,
            Track::Refutation => &mut self.valuation2,
        }
    }
}

/// Identity matrix when `self_relation`, zero matrix otherwise.
fn default_relation(worlds_size: usize, self_relation: bool) -> Relation {
    (0..worlds_size)
        .map(|i| {
            (0..worlds_size)
                .map(|j| {
                    if self_relation && i == j {
                        DEGREE_MAX
                    } else {
                        DEGREE_MIN
                    }
                })
                .collect()
        })
        .collect()
}

// =============================================================================
// MODEL BUILDER
// =============================================================================

/// Builder for a `Model` with explicit structures.
///
/// Nothing is validated until `build`, which checks every supplied structure
/// before assembling the Model.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    worlds_size: usize,
    relation: Option<Relation>,
    valuation1: Option<Valuation>,
    valuation2: Option<Valuation>,
    self_relation: bool,
}

impl ModelBuilder {
    /// Create a builder for `worlds_size` worlds.
    #[must_use]
    pub fn new(worlds_size: usize) -> Self {
        Self {
            worlds_size,
            ..Self::default()
        }
    }

    /// Use an explicit accessibility relation.
    #[must_use]
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    /// Use an explicit support valuation.
    #[must_use]
    pub fn valuation1(mut self, valuation: Valuation) -> Self {
        self.valuation1 = Some(valuation);
        self
    }

    /// Use an explicit refutation valuation.
    #[must_use]
    pub fn valuation2(mut self, valuation: Valuation) -> Self {
        self.valuation2 = Some(valuation);
        self
    }

    /// Add one variable to the support valuation.
    #[must_use]
    pub fn support(mut self, variable: impl Into<VariableId>, values: Vec<Degree>) -> Self {
        self.valuation1
            .get_or_insert_with(Valuation::new)
            .insert(variable.into(), values);
        self
    }

    /// Add one variable to the refutation valuation.
    #[must_use]
    pub fn refutation(mut self, variable: impl Into<VariableId>, values: Vec<Degree>) -> Self {
        self.valuation2
            .get_or_insert_with(Valuation::new)
            .insert(variable.into(), values);
        self
    }

    /// Choose the default relation used when none is supplied.
    #[must_use]
    pub fn self_relation(mut self, self_relation: bool) -> Self {
        self.self_relation = self_relation;
        self
    }

    /// Validate every supplied structure and assemble the Model.
    pub fn build(self) -> Result<Model, PgmlError> {
        let worlds_size = self.worlds_size;

        let relation = match self.relation {
            Some(relation) => {
                check_relation(&relation, worlds_size)?;
                relation
            }
            None => default_relation(worlds_size, self.self_relation),
        };

        let valuation1 = self.valuation1.unwrap_or_default();
        check_valuation(&valuation1, Track::Support, worlds_size)?;

        let valuation2 = self.valuation2.unwrap_or_default();
        check_valuation(&valuation2, Track::Refutation, worlds_size)?;

        tracing::trace!(
            worlds_size,
            support_variables = valuation1.len(),
            refutation_variables = valuation2.len(),
            "built model"
        );

        Ok(Model {
            worlds_size,
            relation,
            valuation1,
            valuation2,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> VariableId {
        VariableId::new("p")
    }

    #[test]
    fn default_relation_empty() {
        let model = Model::new(3, false);
        assert_eq!(model.worlds_size(), 3);
        assert!(model.relation().iter().flatten().all(|&d| d == 0.0));
        assert!(model.valuation1().is_empty());
        assert!(model.valuation2().is_empty());
    }

    #[test]
    fn default_relation_reflexive() {
        let model = Model::new(3, true);
        for (i, row) in model.relation().iter().enumerate() {
            for (j, &degree) in row.iter().enumerate() {
                assert_eq!(degree, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn zero_worlds_model() {
        let model = Model::new(0, true);
        assert_eq!(model.worlds_size(), 0);
        assert!(model.relation().is_empty());
    }

    #[test]
    fn builder_rejects_bad_relation_shape() {
        let result = Model::builder(2).relation(vec![vec![0.0, 0.0]]).build();
        assert!(matches!(result, Err(PgmlError::InvalidRelation { .. })));

        let result = Model::builder(2)
            .relation(vec![vec![0.0, 0.0], vec![0.0, 0.0, 0.0]])
            .build();
        assert!(matches!(result, Err(PgmlError::InvalidRelation { .. })));
    }

    #[test]
    fn builder_validates_refutation_track() {
        let result = Model::builder(1).refutation("p", vec![1.5]).build();
        assert!(matches!(
            result,
            Err(PgmlError::DegreeOutOfRange {
                structure: Structure::Valuation(Track::Refutation),
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_short_sequence() {
        let result = Model::builder(2).support("p", vec![0.5]).build();
        assert!(matches!(
            result,
            Err(PgmlError::InvalidValuation {
                track: Track::Support,
                ..
            })
        ));
    }

    #[test]
    fn builder_explicit_relation_overrides_self_relation() {
        let model = Model::builder(2)
            .self_relation(true)
            .relation(vec![vec![0.0, 0.5], vec![0.5, 0.0]])
            .build()
            .expect("build");
        assert_eq!(model.relation_degree(0, 0).expect("degree"), 0.0);
        assert_eq!(model.relation_degree(0, 1).expect("degree"), 0.5);
    }

    #[test]
    fn from_parts_matches_builder() {
        let mut v1 = Valuation::new();
        v1.insert(p(), vec![0.8, 0.2]);
        let mut v2 = Valuation::new();
        v2.insert(p(), vec![0.1, 0.6]);

        let a = Model::from_parts(2, None, Some(v1.clone()), Some(v2.clone()), true)
            .expect("from_parts");
        let b = Model::builder(2)
            .valuation1(v1)
            .valuation2(v2)
            .self_relation(true)
            .build()
            .expect("build");
        assert_eq!(a, b);
    }

    #[test]
    fn set_relation_range() {
        let mut model = Model::new(2, false);
        assert!(model.set_relation(0, 1, 0.0).is_ok());
        assert!(model.set_relation(0, 1, 1.0).is_ok());
        assert!(model.set_relation(1, 0, 0.25).is_ok());
        assert_eq!(model.relation_degree(1, 0).expect("degree"), 0.25);

        assert!(model.set_relation(0, 1, 1.000_000_1).is_err());
        assert!(model.set_relation(0, 1, -0.000_000_1).is_err());
        // Unchanged after a rejected write.
        assert_eq!(model.relation_degree(0, 1).expect("degree"), 1.0);
    }

    #[test]
    fn set_relation_out_of_range_world() {
        let mut model = Model::new(2, false);
        assert!(matches!(
            model.set_relation(2, 0, 0.5),
            Err(PgmlError::WorldOutOfRange { world: 2, .. })
        ));
    }

    #[test]
    fn set_variable_valuations_overwrite() {
        let mut model = Model::new(2, false);
        model
            .set_variable_valuation1("p", vec![0.1, 0.2])
            .expect("set");
        model
            .set_variable_valuation1("p", vec![0.3, 0.4])
            .expect("overwrite");
        model
            .set_variable_valuation2("p", vec![0.9, 0.8])
            .expect("set");

        assert_eq!(model.degree(Track::Support, &p(), 1).expect("degree"), 0.4);
        assert_eq!(
            model.degree(Track::Refutation, &p(), 0).expect("degree"),
            0.9
        );
    }

    #[test]
    fn set_variable_valuation_rejects_wrong_length() {
        let mut model = Model::new(2, false);
        assert!(model.set_variable_valuation2("p", vec![0.1]).is_err());
        assert!(model.valuation2().is_empty());
    }

    #[test]
    fn per_world_setters_target_their_track() {
        let mut model = Model::builder(2)
            .support("p", vec![0.1, 0.1])
            .refutation("p", vec![0.2, 0.2])
            .build()
            .expect("build");

        model.set_support_for_world(&p(), 1, 0.7).expect("support");
        model
            .set_refutation_for_world(&p(), 0, 0.9)
            .expect("refutation");

        assert_eq!(model.valuation1()[&p()], vec![0.1, 0.7]);
        assert_eq!(model.valuation2()[&p()], vec![0.9, 0.2]);
    }

    #[test]
    fn per_world_setter_errors() {
        let mut model = Model::builder(2)
            .support("p", vec![0.1, 0.1])
            .build()
            .expect("build");

        assert!(matches!(
            model.set_refutation_for_world(&p(), 0, 0.5),
            Err(PgmlError::UnknownVariable {
                track: Track::Refutation,
                ..
            })
        ));
        assert!(matches!(
            model.set_support_for_world(&p(), 5, 0.5),
            Err(PgmlError::WorldOutOfRange { world: 5, .. })
        ));
        assert!(matches!(
            model.set_support_for_world(&p(), 0, 2.0),
            Err(PgmlError::DegreeOutOfRange { .. })
        ));
    }

    #[test]
    fn degree_lookup_errors() {
        let model = Model::builder(1)
            .support("p", vec![0.5])
            .build()
            .expect("build");
        assert!(matches!(
            model.degree(Track::Refutation, &p(), 0),
            Err(PgmlError::UnknownVariable { .. })
        ));
        assert!(matches!(
            model.degree(Track::Support, &p(), 1),
            Err(PgmlError::WorldOutOfRange { .. })
        ));
    }

    #[test]
    fn variables_union_ordered() {
        let model = Model::builder(1)
            .support("q", vec![0.5])
            .refutation("p", vec![0.5])
            .support("p", vec![0.5])
            .build()
            .expect("build");
        let names: Vec<&str> = model.variables().iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["p", "q"]);
    }

    #[test]
    fn accessible_from_skips_zero_degrees() {
        let model = Model::builder(3)
            .relation(vec![
                vec![0.0, 0.4, 1.0],
                vec![0.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0],
            ])
            .build()
            .expect("build");
        assert_eq!(model.accessible_from(0).expect("accessible"), vec![1, 2]);
        assert!(model.accessible_from(1).expect("accessible").is_empty());
        assert!(model.accessible_from(3).is_err());
    }
}
