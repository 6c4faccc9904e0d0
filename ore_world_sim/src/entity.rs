// Entities and their kind-specific data.
//
// An `Entity` is the part every kind shares (id, display name, cell, sprite
// handle, current frame) plus an `EntityKind` carrying whatever that kind
// needs: periods for things that act or animate, resource counters for
// miners. `EntityKind` is a closed enum and every table that depends on the
// kind (action period, animation period, first repeat count, behavior in
// `behavior.rs`) is an exhaustive `match`, so adding a kind without deciding
// its behavior fails to compile.
//
// Kinds never change in place. A miner filling up, ore maturing, a full
// miner unloading: each is "remove the old entity, add a new one", with a
// fresh id and a fresh event chain.

use crate::config::SimConfig;
use crate::sprites::SpriteHandle;
use crate::types::{EntityId, Kind, Point};

/// A live (or just-removed) entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    /// Display identity, e.g. the id a world file gave it.
    pub name: String,
    pub position: Point,
    pub sprites: SpriteHandle,
    /// Index into `sprites`; advanced by Animation events.
    pub frame: u32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        position: Point,
        sprites: SpriteHandle,
        kind: EntityKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            sprites,
            frame: 0,
            kind,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.sprites.next_frame(self.frame);
    }
}

/// Per-kind data. Periods are in virtual-time units before `time_scale`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Blacksmith,
    Obstacle,
    MinerNotFull {
        resource_limit: u32,
        resource_count: u32,
        action_period: u64,
        animation_period: u64,
    },
    /// A miner carrying `resource_limit` ore back to a blacksmith.
    MinerFull {
        resource_limit: u32,
        action_period: u64,
        animation_period: u64,
    },
    Ore {
        action_period: u64,
    },
    OreBlob {
        action_period: u64,
        animation_period: u64,
    },
    Quake {
        action_period: u64,
        animation_period: u64,
    },
    Vein {
        action_period: u64,
    },
}

impl EntityKind {
    pub fn miner_not_full(resource_limit: u32, action_period: u64, animation_period: u64) -> Self {
        EntityKind::MinerNotFull {
            resource_limit,
            resource_count: 0,
            action_period,
            animation_period,
        }
    }

    pub fn miner_full(resource_limit: u32, action_period: u64, animation_period: u64) -> Self {
        EntityKind::MinerFull {
            resource_limit,
            action_period,
            animation_period,
        }
    }

    /// A quake timed from config.
    pub fn quake(config: &SimConfig) -> Self {
        EntityKind::Quake {
            action_period: config.quake.action_period,
            animation_period: config.quake.animation_period,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            EntityKind::Blacksmith => Kind::Blacksmith,
            EntityKind::Obstacle => Kind::Obstacle,
            EntityKind::MinerNotFull { .. } => Kind::MinerNotFull,
            EntityKind::MinerFull { .. } => Kind::MinerFull,
            EntityKind::Ore { .. } => Kind::Ore,
            EntityKind::OreBlob { .. } => Kind::OreBlob,
            EntityKind::Quake { .. } => Kind::Quake,
            EntityKind::Vein { .. } => Kind::Vein,
        }
    }

    /// Interval between Activity ticks, or `None` for passive kinds.
    pub fn action_period(&self) -> Option<u64> {
        match *self {
            EntityKind::Blacksmith | EntityKind::Obstacle => None,
            EntityKind::MinerNotFull { action_period, .. }
            | EntityKind::MinerFull { action_period, .. }
            | EntityKind::Ore { action_period }
            | EntityKind::OreBlob { action_period, .. }
            | EntityKind::Quake { action_period, .. }
            | EntityKind::Vein { action_period } => Some(action_period),
        }
    }

    /// Interval between frame advances, or `None` for kinds drawn with a
    /// single still frame.
    pub fn animation_period(&self) -> Option<u64> {
        match *self {
            EntityKind::Blacksmith
            | EntityKind::Obstacle
            | EntityKind::Ore { .. }
            | EntityKind::Vein { .. } => None,
            EntityKind::MinerNotFull {
                animation_period, ..
            }
            | EntityKind::MinerFull {
                animation_period, ..
            }
            | EntityKind::OreBlob {
                animation_period, ..
            }
            | EntityKind::Quake {
                animation_period, ..
            } => Some(animation_period),
        }
    }

    /// Repeat count carried by the first Animation event. `0` loops forever;
    /// the quake plays a finite burst.
    pub fn animation_repeat_count(&self, config: &SimConfig) -> u32 {
        match self {
            EntityKind::Quake { .. } => config.quake.animation_repeat_count,
            EntityKind::Blacksmith
            | EntityKind::Obstacle
            | EntityKind::MinerNotFull { .. }
            | EntityKind::MinerFull { .. }
            | EntityKind::Ore { .. }
            | EntityKind::OreBlob { .. }
            | EntityKind::Vein { .. } => 0,
        }
    }

    /// Ore carried, for miners. A full miner always carries its limit.
    pub fn resource_count(&self) -> Option<u32> {
        match *self {
            EntityKind::MinerNotFull { resource_count, .. } => Some(resource_count),
            EntityKind::MinerFull { resource_limit, .. } => Some(resource_limit),
            EntityKind::Blacksmith
            | EntityKind::Obstacle
            | EntityKind::Ore { .. }
            | EntityKind::OreBlob { .. }
            | EntityKind::Quake { .. }
            | EntityKind::Vein { .. } => None,
        }
    }
}
