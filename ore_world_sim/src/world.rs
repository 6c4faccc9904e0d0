// Dense 2D grid for the ore world.
//
// `WorldModel` owns three things:
// - the background layer: one `Background` per cell, stored flat,
// - the occupancy layer: one `Option<EntityId>` per cell, stored flat,
// - the live entity arena: `BTreeMap<EntityId, Entity>`, which owns entities.
//
// Both layers are indexed by `x + y * cols`. Occupancy holds ids, not
// entities: the arena is the only owner, and a cell only names who is there.
// Every mutation that touches one side touches the other in the same method
// (`add_entity`, `remove_entity`, `move_entity`), so outside code can't leave
// a cell pointing at a dead entity or an entity whose cell forgot it.
// `occupancy_consistent()` checks that bijection and is asserted all over the
// test suite.
//
// Out-of-bounds placement and movement are silent no-ops. Removal writes
// `Point::OFF_GRID` into the entity before handing it back, so anything still
// holding the value sees that it has left the world.
//
// The world does not know about events. Callers that remove, move or replace
// entities cancel the affected entity's events themselves (see `behavior.rs`).
//
// See also: `sim.rs` which owns the `WorldModel` as part of `SimState`,
// `types.rs` for `Point`/`EntityId`, `entity.rs` for `Entity`.

use crate::entity::Entity;
use crate::error::SimError;
use crate::sprites::SpriteHandle;
use crate::types::{EntityId, Kind, Point};
use std::collections::BTreeMap;
use tracing::debug;

/// Decorative per-cell layer, independent of occupancy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Background {
    pub key: String,
    pub sprites: SpriteHandle,
    pub frame: u32,
}

impl Background {
    pub fn new(key: impl Into<String>, sprites: SpriteHandle) -> Self {
        Self {
            key: key.into(),
            sprites,
            frame: 0,
        }
    }
}

/// The grid and everything on it.
#[derive(Clone, Debug)]
pub struct WorldModel {
    rows: u32,
    cols: u32,
    /// Flat storage: index = x + y * cols.
    background: Vec<Background>,
    /// Flat storage: index = x + y * cols.
    occupancy: Vec<Option<EntityId>>,
    /// Live entities. Iteration order (ascending id) breaks nearest-target ties.
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl WorldModel {
    /// Create an empty `rows × cols` world with every cell showing `default_background`.
    pub fn new(rows: u32, cols: u32, default_background: Background) -> Self {
        let total = (rows as usize) * (cols as usize);
        Self {
            rows,
            cols,
            background: vec![default_background; total],
            occupancy: vec![None; total],
            entities: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn within_bounds(&self, pos: Point) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.cols && (pos.y as u32) < self.rows
    }

    fn index(&self, pos: Point) -> Option<usize> {
        if self.within_bounds(pos) {
            Some(pos.x as usize + pos.y as usize * self.cols as usize)
        } else {
            None
        }
    }

    fn point_at(&self, index: usize) -> Point {
        let cols = self.cols as usize;
        Point::new((index % cols) as i32, (index / cols) as i32)
    }

    // -----------------------------------------------------------------------
    // Background layer
    // -----------------------------------------------------------------------

    pub fn background(&self, pos: Point) -> Option<&Background> {
        self.index(pos).map(|i| &self.background[i])
    }

    /// Replace a cell's background. No-op out of bounds.
    pub fn set_background(&mut self, pos: Point, background: Background) {
        if let Some(i) = self.index(pos) {
            self.background[i] = background;
        }
    }

    /// Every cell with its background, row by row.
    pub fn backgrounds(&self) -> impl Iterator<Item = (Point, &Background)> + '_ {
        self.background
            .iter()
            .enumerate()
            .map(|(i, bg)| (self.point_at(i), bg))
    }

    // -----------------------------------------------------------------------
    // Occupancy layer
    // -----------------------------------------------------------------------

    /// True for an in-bounds cell holding an entity. Out-of-bounds cells are
    /// never occupied; callers that want "free to step on" also check bounds.
    pub fn is_occupied(&self, pos: Point) -> bool {
        self.occupant_id(pos).is_some()
    }

    pub fn occupant_id(&self, pos: Point) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.occupancy[i])
    }

    pub fn get_occupant(&self, pos: Point) -> Option<&Entity> {
        self.occupant_id(pos).and_then(|id| self.entities.get(&id))
    }

    // -----------------------------------------------------------------------
    // Entity arena
    // -----------------------------------------------------------------------

    /// Reserve a fresh id for an entity about to be built. Ids are never reused.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access for frame and counter updates. Crate-private: moving an
    /// entity by writing its position would desync the occupancy layer.
    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn entities_of(&self, kind: Kind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(move |e| e.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Insert an entity at its own position. Out-of-bounds entities are
    /// dropped and `false` is returned.
    ///
    /// The target cell must be free. Use `try_add_entity` when that hasn't
    /// been checked yet (loading).
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        let Some(i) = self.index(entity.position) else {
            debug!(id = %entity.id, position = %entity.position, "dropping out-of-bounds entity");
            return false;
        };
        debug_assert!(
            self.occupancy[i].is_none(),
            "add_entity onto occupied cell {}",
            entity.position
        );
        self.occupancy[i] = Some(entity.id);
        self.entities.insert(entity.id, entity);
        true
    }

    /// `add_entity` with an occupancy check first. `Ok(false)` means the
    /// entity was out of bounds and silently dropped.
    pub fn try_add_entity(&mut self, entity: Entity) -> Result<bool, SimError> {
        if let Some(occupant) = self.occupant_id(entity.position) {
            return Err(SimError::OccupiedCell {
                position: entity.position,
                occupant,
            });
        }
        Ok(self.add_entity(entity))
    }

    /// Take an entity out of the world, clearing its cell. The returned
    /// entity's position is `Point::OFF_GRID`.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        if let Some(i) = self
            .index(entity.position)
            .filter(|&i| self.occupancy[i] == Some(id))
        {
            self.occupancy[i] = None;
        }
        entity.position = Point::OFF_GRID;
        Some(entity)
    }

    /// Remove whatever occupies `pos`, if anything.
    pub fn remove_entity_at(&mut self, pos: Point) -> Option<Entity> {
        let id = self.occupant_id(pos)?;
        self.remove_entity(id)
    }

    /// Relocate an entity. No-op if it is already there, the target is out
    /// of bounds, or the id isn't live.
    ///
    /// Whatever occupied the target is evicted from the world and returned.
    /// This is not a swap: the caller has already decided the occupant's fate.
    pub fn move_entity(&mut self, id: EntityId, new_pos: Point) -> Option<Entity> {
        let old_pos = self.entities.get(&id)?.position;
        if old_pos == new_pos || !self.within_bounds(new_pos) {
            return None;
        }
        let evicted = self.remove_entity_at(new_pos);
        if let Some(i) = self.index(old_pos) {
            self.occupancy[i] = None;
        }
        if let Some(i) = self.index(new_pos) {
            self.occupancy[i] = Some(id);
        }
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = new_pos;
        }
        evicted
    }

    // -----------------------------------------------------------------------
    // Spatial queries
    // -----------------------------------------------------------------------

    /// Nearest live entity of `kind` by squared distance. On a tie the entity
    /// met first in id order wins.
    pub fn find_nearest(&self, origin: Point, kind: Kind) -> Option<EntityId> {
        let mut best: Option<(i64, EntityId)> = None;
        for entity in self.entities_of(kind) {
            let dist = origin.distance_squared(entity.position);
            if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                best = Some((dist, entity.id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// First free in-bounds cell in the 3×3 block around `origin`, scanning
    /// rows top to bottom and each row left to right. `origin` itself is part
    /// of the scan but is normally occupied by whoever is asking.
    pub fn find_open_around(&self, origin: Point) -> Option<Point> {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let candidate = origin.offset(dx, dy);
                if self.within_bounds(candidate) && !self.is_occupied(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Check the occupancy bijection: every occupied cell names a live entity
    /// standing on that cell, and every live entity's cell names it back.
    pub fn occupancy_consistent(&self) -> bool {
        let cells_ok = self.occupancy.iter().enumerate().all(|(i, slot)| match slot {
            Some(id) => self
                .entities
                .get(id)
                .is_some_and(|e| e.position == self.point_at(i)),
            None => true,
        });
        let occupied = self.occupancy.iter().filter(|slot| slot.is_some()).count();
        let entities_ok = self
            .entities
            .values()
            .all(|e| self.occupant_id(e.position) == Some(e.id));
        cells_ok && entities_ok && occupied == self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn grass() -> Background {
        Background::new("grass", SpriteHandle::new("grass", 1))
    }

    fn world(rows: u32, cols: u32) -> WorldModel {
        WorldModel::new(rows, cols, grass())
    }

    fn spawn(world: &mut WorldModel, pos: Point, kind: EntityKind) -> EntityId {
        let id = world.allocate_id();
        let sprites = SpriteHandle::new(kind.kind().sprite_key(), 1);
        assert!(world.add_entity(Entity::new(id, "e", pos, sprites, kind)));
        id
    }

    #[test]
    fn bounds_use_cols_for_x_and_rows_for_y() {
        let world = world(2, 5);
        assert!(world.within_bounds(Point::new(4, 1)));
        assert!(!world.within_bounds(Point::new(1, 4)));
        assert!(!world.within_bounds(Point::new(-1, 0)));
        assert!(!world.within_bounds(Point::new(5, 0)));
    }

    #[test]
    fn add_registers_occupancy() {
        let mut world = world(5, 5);
        let id = spawn(&mut world, Point::new(2, 3), EntityKind::Obstacle);
        assert!(world.is_occupied(Point::new(2, 3)));
        assert_eq!(world.occupant_id(Point::new(2, 3)), Some(id));
        assert_eq!(world.get_occupant(Point::new(2, 3)).unwrap().id, id);
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn add_out_of_bounds_is_noop() {
        let mut world = world(3, 3);
        let id = world.allocate_id();
        let placed = world.add_entity(Entity::new(
            id,
            "lost",
            Point::new(3, 0),
            SpriteHandle::new("obstacle", 1),
            EntityKind::Obstacle,
        ));
        assert!(!placed);
        assert!(world.is_empty());
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn try_add_rejects_occupied_cell() {
        let mut world = world(3, 3);
        let first = spawn(&mut world, Point::new(1, 1), EntityKind::Blacksmith);
        let id = world.allocate_id();
        let err = world
            .try_add_entity(Entity::new(
                id,
                "second",
                Point::new(1, 1),
                SpriteHandle::new("obstacle", 1),
                EntityKind::Obstacle,
            ))
            .unwrap_err();
        match err {
            SimError::OccupiedCell { position, occupant } => {
                assert_eq!(position, Point::new(1, 1));
                assert_eq!(occupant, first);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(world.len(), 1);
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn remove_clears_cell_and_marks_entity_off_grid() {
        let mut world = world(4, 4);
        let id = spawn(&mut world, Point::new(1, 2), EntityKind::Ore { action_period: 5 });
        let removed = world.remove_entity(id).unwrap();
        assert_eq!(removed.position, Point::OFF_GRID);
        assert!(!world.is_occupied(Point::new(1, 2)));
        assert!(!world.contains(id));
        assert!(world.remove_entity(id).is_none(), "second removal is a no-op");
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn remove_at_empty_cell_is_noop() {
        let mut world = world(4, 4);
        assert!(world.remove_entity_at(Point::new(0, 0)).is_none());
        assert!(world.remove_entity_at(Point::new(-3, 9)).is_none());
    }

    #[test]
    fn move_relocates_and_frees_old_cell() {
        let mut world = world(4, 4);
        let id = spawn(&mut world, Point::new(0, 0), EntityKind::miner_not_full(2, 10, 10));
        assert!(world.move_entity(id, Point::new(1, 0)).is_none());
        assert_eq!(world.entity(id).unwrap().position, Point::new(1, 0));
        assert!(!world.is_occupied(Point::new(0, 0)));
        assert_eq!(world.occupant_id(Point::new(1, 0)), Some(id));
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn move_out_of_bounds_or_in_place_is_noop() {
        let mut world = world(2, 2);
        let id = spawn(&mut world, Point::new(1, 1), EntityKind::Obstacle);
        world.move_entity(id, Point::new(2, 1));
        world.move_entity(id, Point::new(1, 1));
        assert_eq!(world.entity(id).unwrap().position, Point::new(1, 1));
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn move_evicts_occupant_from_world() {
        let mut world = world(3, 3);
        let blob = spawn(
            &mut world,
            Point::new(0, 0),
            EntityKind::OreBlob {
                action_period: 10,
                animation_period: 10,
            },
        );
        let ore = spawn(&mut world, Point::new(1, 0), EntityKind::Ore { action_period: 10 });
        let evicted = world.move_entity(blob, Point::new(1, 0)).unwrap();
        assert_eq!(evicted.id, ore);
        assert_eq!(evicted.position, Point::OFF_GRID);
        assert!(!world.contains(ore));
        assert_eq!(world.len(), 1);
        assert!(world.occupancy_consistent());
    }

    #[test]
    fn find_nearest_filters_by_kind() {
        let mut world = world(10, 10);
        spawn(&mut world, Point::new(1, 0), EntityKind::Obstacle);
        let far = spawn(&mut world, Point::new(9, 9), EntityKind::Ore { action_period: 1 });
        let near = spawn(&mut world, Point::new(3, 3), EntityKind::Ore { action_period: 1 });
        assert_eq!(world.find_nearest(Point::new(0, 0), Kind::Ore), Some(near));
        assert_eq!(world.find_nearest(Point::new(9, 8), Kind::Ore), Some(far));
        assert_eq!(world.find_nearest(Point::new(0, 0), Kind::Vein), None);
    }

    #[test]
    fn find_nearest_tie_goes_to_oldest() {
        let mut world = world(5, 5);
        let first = spawn(&mut world, Point::new(4, 2), EntityKind::Blacksmith);
        let _second = spawn(&mut world, Point::new(0, 2), EntityKind::Blacksmith);
        assert_eq!(world.find_nearest(Point::new(2, 2), Kind::Blacksmith), Some(first));
    }

    #[test]
    fn find_open_around_scans_row_major() {
        let mut world = world(5, 5);
        let center = Point::new(2, 2);
        spawn(&mut world, center, EntityKind::Vein { action_period: 1 });
        assert_eq!(world.find_open_around(center), Some(Point::new(1, 1)));
        spawn(&mut world, Point::new(1, 1), EntityKind::Obstacle);
        spawn(&mut world, Point::new(2, 1), EntityKind::Obstacle);
        assert_eq!(world.find_open_around(center), Some(Point::new(3, 1)));
    }

    #[test]
    fn find_open_around_skips_out_of_bounds() {
        let mut world = world(3, 3);
        spawn(&mut world, Point::new(0, 0), EntityKind::Vein { action_period: 1 });
        assert_eq!(world.find_open_around(Point::new(0, 0)), Some(Point::new(1, 0)));
    }

    #[test]
    fn find_open_around_full_neighborhood() {
        let mut world = world(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                spawn(&mut world, Point::new(x, y), EntityKind::Obstacle);
            }
        }
        assert_eq!(world.find_open_around(Point::new(0, 0)), None);
    }

    #[test]
    fn background_layer_is_independent_of_occupancy() {
        let mut world = world(2, 3);
        let rock = Background::new("rocks", SpriteHandle::new("rocks", 1));
        world.set_background(Point::new(2, 1), rock.clone());
        world.set_background(Point::new(7, 7), rock.clone());
        spawn(&mut world, Point::new(2, 1), EntityKind::Obstacle);
        assert_eq!(world.background(Point::new(2, 1)), Some(&rock));
        assert_eq!(world.background(Point::new(0, 0)).unwrap().key, "grass");
        assert!(world.background(Point::new(3, 0)).is_none());
        let cells: Vec<Point> = world.backgrounds().map(|(p, _)| p).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[5], Point::new(2, 1));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut world = world(2, 2);
        let a = spawn(&mut world, Point::new(0, 0), EntityKind::Obstacle);
        world.remove_entity(a);
        let b = spawn(&mut world, Point::new(0, 0), EntityKind::Obstacle);
        assert_ne!(a, b);
    }
}
