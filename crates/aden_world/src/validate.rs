//! Geometry-only validators that run before any gameplay mutation.
//!
//! These are pure checks: no locks are taken beyond read-only probes, and
//! nothing is mutated. A failing packet yields an ActionFailed reply or a
//! silent drop upstream, never a world change.

use thiserror::Error;

use crate::object::{ObjectId, WorldObject};
use crate::region::Location;
use crate::visibility::VisibilityManager;
use crate::world::World;

/// Move targets outside this z band are rejected outright.
pub const MAX_TARGET_Z: i32 = 20_000;

/// Longest accepted move request, squared (9900 world units).
pub const MAX_MOVE_DISTANCE_SQ: i64 = 9_900 * 9_900;

/// Moves shorter than this (squared) are rejected as jitter, except for
/// an exact click-in-place.
pub const MIN_MOVE_DISTANCE_SQ: i64 = 17 * 17;

/// Client/server desync (squared) above which a correction is sent.
pub const DESYNC_WARN_SQ: i64 = 500 * 500;

/// Desync (squared) above which the caller may log or sanction.
pub const DESYNC_CRITICAL_SQ: i64 = 600 * 600;

/// Farthest selectable target, squared.
pub const MAX_TARGET_DISTANCE_SQ: i64 = 2_000 * 2_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("target z out of range")]
    InvalidZ,
    #[error("move target too far")]
    TooFar,
    #[error("move target too close")]
    TooClose,
}

/// Validates a move request from `origin` to `(tx, ty, tz)`.
///
/// Zero distance is allowed (click in place); anything between zero and
/// the minimum step is jitter and rejected.
pub fn validate_move_to_location(
    origin: Location,
    tx: i32,
    ty: i32,
    tz: i32,
) -> Result<(), MoveError> {
    if !(-MAX_TARGET_Z..=MAX_TARGET_Z).contains(&tz) {
        return Err(MoveError::InvalidZ);
    }

    let dist_sq = origin.distance_sq(tx, ty);

    if dist_sq > MAX_MOVE_DISTANCE_SQ {
        return Err(MoveError::TooFar);
    }

    if dist_sq > 0 && dist_sq < MIN_MOVE_DISTANCE_SQ {
        return Err(MoveError::TooClose);
    }

    Ok(())
}

/// Result of a position desync probe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Desync {
    /// The planar squared distance between the server's and the client's
    /// idea of the position, exactly.
    pub diff_sq: i64,
    /// A correction packet should be sent.
    pub needs_correction: bool,
    /// Desync large enough that the caller may log or sanction.
    pub critical: bool,
}

/// Compares the client-reported position against the authoritative one.
/// The z coordinate is reported for the caller but does not enter the
/// planar distance.
pub fn validate_position_desync(server: Location, cx: i32, cy: i32, _cz: i32) -> Desync {
    let diff_sq = server.distance_sq(cx, cy);

    Desync {
        diff_sq,
        needs_correction: diff_sq > DESYNC_WARN_SQ,
        critical: diff_sq > DESYNC_CRITICAL_SQ,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("target is not in the world")]
    Missing,
    #[error("target is not visible")]
    NotVisible,
    #[error("target out of range")]
    OutOfRange,
}

/// Validates a target pick: the object must exist, sit in the picker's
/// visibility cache, and be within selection range. With no geodata
/// loaded, cache visibility stands in for line of sight.
pub fn validate_target_selection(
    observer: ObjectId,
    observer_loc: Location,
    target: ObjectId,
    world: &World,
    visibility: &VisibilityManager,
) -> Result<WorldObject, TargetError> {
    let obj = world.get(target).ok_or(TargetError::Missing)?;

    if !visibility.sees(observer, target) {
        return Err(TargetError::NotVisible);
    }

    let loc = obj.location();

    if observer_loc.distance_sq(loc.x, loc.y) > MAX_TARGET_DISTANCE_SQ {
        return Err(TargetError::OutOfRange);
    }

    Ok(obj)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::player::{Player, PlayerStats};

    #[test]
    fn move_thresholds() {
        let at = Location::new(0, 0, 0);

        // The canonical threshold sweep.
        assert_eq!(
            validate_move_to_location(at, 20_000, 0, 0),
            Err(MoveError::TooFar)
        );
        assert_eq!(
            validate_move_to_location(at, 1, 0, 0),
            Err(MoveError::TooClose)
        );
        assert_eq!(validate_move_to_location(at, 0, 0, 0), Ok(()));
        assert_eq!(
            validate_move_to_location(at, 1000, 1000, 50_000),
            Err(MoveError::InvalidZ)
        );
        assert_eq!(validate_move_to_location(at, 1000, 1000, 500), Ok(()));
    }

    #[test]
    fn move_boundaries_are_exact() {
        let at = Location::new(0, 0, 0);

        // 17 units is the first accepted step.
        assert_eq!(validate_move_to_location(at, 17, 0, 0), Ok(()));
        assert_eq!(
            validate_move_to_location(at, 16, 0, 0),
            Err(MoveError::TooClose)
        );

        assert_eq!(validate_move_to_location(at, 9_900, 0, 0), Ok(()));
        assert_eq!(
            validate_move_to_location(at, 9_901, 0, 0),
            Err(MoveError::TooFar)
        );

        assert_eq!(validate_move_to_location(at, 100, 0, -20_000), Ok(()));
        assert_eq!(
            validate_move_to_location(at, 100, 0, -20_001),
            Err(MoveError::InvalidZ)
        );
    }

    #[test]
    fn desync_thresholds_and_exact_diff() {
        let server = Location::new(100, 100, 0);

        let ok = validate_position_desync(server, 100, 600, 0);
        assert_eq!(ok.diff_sq, 250_000);
        assert!(!ok.needs_correction);

        let warn = validate_position_desync(server, 100, 601, 0);
        assert_eq!(warn.diff_sq, 501 * 501);
        assert!(warn.needs_correction);
        assert!(!warn.critical);

        let critical = validate_position_desync(server, 800, 100, 0);
        assert_eq!(critical.diff_sq, 700 * 700);
        assert!(critical.needs_correction);
        assert!(critical.critical);
    }

    #[test]
    fn target_selection_probes_world_and_cache() {
        use crate::object::WorldObject;

        let world = Arc::new(crate::world::World::new());
        let vis = VisibilityManager::new(world.clone(), Duration::from_millis(100));

        let a = Arc::new(Player::new(
            ObjectId((1 << 28) + 1),
            1,
            "a",
            "A",
            PlayerStats::default(),
            Location::new(0, 0, 0),
        ));
        let b = Arc::new(Player::new(
            ObjectId((1 << 28) + 2),
            2,
            "b",
            "B",
            PlayerStats::default(),
            Location::new(100, 0, 0),
        ));

        world.add_object(WorldObject::Player(a.clone())).unwrap();
        world.add_object(WorldObject::Player(b.clone())).unwrap();
        vis.register_player(&a);
        vis.register_player(&b);

        // Before any batch the cache is empty: not visible.
        assert!(matches!(
            validate_target_selection(a.id, a.location(), b.id, &world, &vis),
            Err(TargetError::NotVisible)
        ));

        vis.refresh_once();

        assert!(validate_target_selection(a.id, a.location(), b.id, &world, &vis).is_ok());

        // Missing object.
        assert!(matches!(
            validate_target_selection(a.id, a.location(), ObjectId(9999), &world, &vis),
            Err(TargetError::Missing)
        ));

        // Too far: push B out within the same cache batch.
        world
            .move_object(b.id, Location::new(2_500, 0, 0))
            .unwrap();
        assert!(matches!(
            validate_target_selection(a.id, a.location(), b.id, &world, &vis),
            Err(TargetError::OutOfRange)
        ));
    }
}
