// Error type for the simulation crate.
//
// Two very different failure classes share this enum. `OccupiedCell`,
// `InvalidConfig` and `Scenario` are data errors: bad input from the loader
// or a config file, reported to the caller who decides what to skip.
// `NotActive` and `NotAnimated` are programming errors: an event reached an
// entity whose kind has no such behavior. Those abort `update_on_time` rather
// than being papered over with a default.

use crate::types::{EntityId, Kind, Point};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Tried to place an entity on a cell that already holds one.
    #[error("cell {position} is already occupied by {occupant}")]
    OccupiedCell { position: Point, occupant: EntityId },

    /// An Activity event fired for a kind that never acts.
    #[error("{entity} is a {kind:?}, which has no activity")]
    NotActive { entity: EntityId, kind: Kind },

    /// An Animation event fired for a kind that is not animated.
    #[error("{entity} is a {kind:?}, which is not animated")]
    NotAnimated { entity: EntityId, kind: Kind },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("malformed scenario: {0}")]
    Scenario(#[from] serde_json::Error),
}
