//! # Validation Module
//!
//! Shape and range checks for model data.
//!
//! - Every entry point of `Model` runs these before writing
//! - Checks are pure: they never mutate, they only accept or reject
//! - The first violation found is reported

use crate::model::Valuation;
use crate::primitives::is_degree;
use crate::types::Structure;
use crate::{Degree, PgmlError, Track, World};

/// Check a single degree destined for `structure`.
pub fn check_degree(value: Degree, structure: Structure) -> Result<(), PgmlError> {
    if is_degree(value) {
        Ok(())
    } else {
        Err(PgmlError::DegreeOutOfRange { structure, value })
    }
}

/// Check that a world index is inside `[0, worlds_size)`.
pub fn check_world(world: World, worlds_size: usize) -> Result<(), PgmlError> {
    if world < worlds_size {
        Ok(())
    } else {
        Err(PgmlError::WorldOutOfRange { world, worlds_size })
    }
}

/// Check a full accessibility relation.
///
/// The relation must have exactly `worlds_size` rows of `worlds_size`
/// degrees each.
pub fn check_relation(relation: &[Vec<Degree>], worlds_size: usize) -> Result<(), PgmlError> {
    if relation.len() != worlds_size {
        return Err(PgmlError::InvalidRelation {
            reason: format!(
                "relation must be a list of size {}, got {}",
                worlds_size,
                relation.len()
            ),
        });
    }

    for (world, row) in relation.iter().enumerate() {
        if row.len() != worlds_size {
            return Err(PgmlError::InvalidRelation {
                reason: format!(
                    "relation size for world {} must be {}, got {}",
                    world,
                    worlds_size,
                    row.len()
                ),
            });
        }
        for &value in row {
            check_degree(value, Structure::Relation)?;
        }
    }

    Ok(())
}

/// Check the per-world degrees of one variable on one track.
pub fn check_values(values: &[Degree], track: Track, worlds_size: usize) -> Result<(), PgmlError> {
    if values.len() != worlds_size {
        return Err(PgmlError::InvalidValuation {
            track,
            reason: format!(
                "value must hold {} degrees, got {}",
                worlds_size,
                values.len()
            ),
        });
    }

    for &value in values {
        check_degree(value, Structure::Valuation(track))?;
    }

    Ok(())
}

/// Check a whole valuation mapping.
pub fn check_valuation(
    valuation: &Valuation,
    track: Track,
    worlds_size: usize,
) -> Result<(), PgmlError> {
    for (variable, values) in valuation {
        check_values(values, track, worlds_size).map_err(|err| match err {
            PgmlError::InvalidValuation { track, reason } => PgmlError::InvalidValuation {
                track,
                reason: format!("for variable {}: {}", variable, reason),
            },
            other => other,
        })?;
    }
    Ok(())
}
