// Already-parsed world description and the report produced by loading it.
//
// Turning a text world file into records is somebody else's job. What
// arrives here is a `Scenario`: grid size, background cells, entity records
// and the sprite sheets available to them, all serde-described so a driver
// can keep them as JSON on disk.
//
// Loading itself lives in `SimState::load_scenario` (sim.rs). Records are
// placed one at a time through the occupancy-checked path; a record that
// collides with an earlier one or lands outside the grid is skipped and
// listed in the `LoadReport` rather than aborting the whole load.

use crate::entity::EntityKind;
use crate::error::SimError;
use crate::sprites::SpriteHandle;
use crate::types::{EntityId, Point};
use serde::{Deserialize, Serialize};

/// A whole world, ready to load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub rows: u32,
    pub cols: u32,
    /// Sprite key every cell starts with.
    pub default_background: String,
    #[serde(default)]
    pub backgrounds: Vec<BackgroundRecord>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    /// Sprite sheets, keyed by `SpriteHandle::key`.
    #[serde(default)]
    pub sprites: Vec<SpriteHandle>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Override of one cell's background.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundRecord {
    pub key: String,
    pub x: i32,
    pub y: i32,
}

/// One entity line of a world file. `id` is the display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRecord {
    Blacksmith {
        id: String,
        x: i32,
        y: i32,
    },
    /// Always loaded empty; a world file can't start a miner half-full.
    Miner {
        id: String,
        x: i32,
        y: i32,
        resource_limit: u32,
        action_period: u64,
        animation_period: u64,
    },
    Obstacle {
        id: String,
        x: i32,
        y: i32,
    },
    Ore {
        id: String,
        x: i32,
        y: i32,
        action_period: u64,
    },
    Vein {
        id: String,
        x: i32,
        y: i32,
        action_period: u64,
    },
}

impl EntityRecord {
    pub fn name(&self) -> &str {
        match self {
            EntityRecord::Blacksmith { id, .. }
            | EntityRecord::Miner { id, .. }
            | EntityRecord::Obstacle { id, .. }
            | EntityRecord::Ore { id, .. }
            | EntityRecord::Vein { id, .. } => id,
        }
    }

    pub fn position(&self) -> Point {
        match *self {
            EntityRecord::Blacksmith { x, y, .. }
            | EntityRecord::Miner { x, y, .. }
            | EntityRecord::Obstacle { x, y, .. }
            | EntityRecord::Ore { x, y, .. }
            | EntityRecord::Vein { x, y, .. } => Point::new(x, y),
        }
    }

    /// The kind-specific data this record describes.
    pub fn entity_kind(&self) -> EntityKind {
        match *self {
            EntityRecord::Blacksmith { .. } => EntityKind::Blacksmith,
            EntityRecord::Miner {
                resource_limit,
                action_period,
                animation_period,
                ..
            } => EntityKind::miner_not_full(resource_limit, action_period, animation_period),
            EntityRecord::Obstacle { .. } => EntityKind::Obstacle,
            EntityRecord::Ore { action_period, .. } => EntityKind::Ore { action_period },
            EntityRecord::Vein { action_period, .. } => EntityKind::Vein { action_period },
        }
    }
}

/// Outcome of loading a scenario. Indices refer to `Scenario::entities`.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids of placed entities, in record order.
    pub placed: Vec<EntityId>,
    /// Records skipped because their cell was already taken.
    pub conflicts: Vec<(usize, SimError)>,
    /// Records skipped because they lie outside the grid.
    pub out_of_bounds: Vec<usize>,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.conflicts.len() + self.out_of_bounds.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped() == 0
    }
}
