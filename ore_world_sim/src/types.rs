// Core types shared across the simulation.
//
// `Point` is the grid coordinate, `EntityId` the stable arena key that the
// occupancy layer and the scheduler use instead of holding entities, and
// `Kind` the fieldless tag used for queries such as "nearest ore".
//
// Entity ids are sequential integers handed out by `WorldModel`. They are
// never reused, so an id that has left the world can't alias a newcomer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell in the grid. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Written into an entity's position as it leaves the world, so anything
    /// still holding the removed entity sees an invalid cell.
    pub const OFF_GRID: Point = Point::new(-1, -1);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared Euclidean distance. Widened to `i64` so corner-to-corner
    /// distances on large grids can't overflow.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }

    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// True when the two cells share an edge (4-neighborhood). A cell is not
    /// adjacent to itself, and diagonal neighbors don't count.
    pub fn adjacent(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Entity identity
// ---------------------------------------------------------------------------

/// Compact identifier for an entity in the world arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// The closed set of entity kinds, without their per-kind data.
///
/// A not-full and a full miner are different kinds: changing from one to the
/// other replaces the entity rather than mutating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Blacksmith,
    MinerNotFull,
    MinerFull,
    Obstacle,
    Ore,
    OreBlob,
    Quake,
    Vein,
}

impl Kind {
    /// Key under which the outer layer registers this kind's image list.
    /// Both miner kinds share one list.
    pub fn sprite_key(self) -> &'static str {
        match self {
            Kind::Blacksmith => "blacksmith",
            Kind::MinerNotFull | Kind::MinerFull => "miner",
            Kind::Obstacle => "obstacle",
            Kind::Ore => "ore",
            Kind::OreBlob => "blob",
            Kind::Quake => "quake",
            Kind::Vein => "vein",
        }
    }
}
