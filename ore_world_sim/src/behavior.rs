// What happens when an event fires.
//
// `execute()` is the single dispatch point the scheduler calls for every
// popped event. Animation events advance a frame and maybe reschedule
// themselves; Activity events run the kind-specific tick below. Each tick
// reads the world, mutates it, and schedules its own follow-on events.
//
// Every tick that removes, moves onto, or replaces an entity cancels that
// entity's queued events in the same step, before or alongside the world
// mutation. Nothing is left in the queue pointing at an entity that is gone.
//
// Kinds never change in place. "Transform" means: cancel the old entity's
// events, remove it, add a new entity with a fresh id at the same cell, and
// schedule the newcomer's initial events.
//
// A kind reaching the wrong kind of event (Activity on a blacksmith,
// Animation on ore) is a bug elsewhere and comes back as an error rather
// than being ignored. An event for an id no longer in the world is skipped
// with a warning.
//
// See also: `event.rs` for the queue that calls in here, `world.rs` for the
// grid operations, `config.rs` for the periods and random ranges used when
// spawning.

use crate::config::SimConfig;
use crate::entity::{Entity, EntityKind};
use crate::error::SimError;
use crate::event::{Action, EventScheduler, ScheduledEvent};
use crate::prng::GameRng;
use crate::sprites::SpriteCatalog;
use crate::types::{EntityId, Kind, Point};
use crate::world::WorldModel;
use tracing::{debug, warn};

/// Everything a tick may read or draw on besides the world and the queue.
pub struct ActionContext<'a> {
    pub config: &'a SimConfig,
    pub sprites: &'a SpriteCatalog,
    pub rng: &'a mut GameRng,
}

/// Run one popped event against the world.
pub fn execute(
    event: &ScheduledEvent,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &mut ActionContext<'_>,
) -> Result<(), SimError> {
    let Some(entity) = world.entity(event.entity) else {
        warn!(entity = %event.entity, due = event.due, "event for entity no longer in the world");
        return Ok(());
    };
    match event.action {
        Action::Activity => {
            let id = entity.id;
            let position = entity.position;
            let kind = entity.kind.clone();
            execute_activity(id, position, kind, world, scheduler, ctx)
        }
        Action::Animation { repeat_count } => {
            execute_animation(event.entity, repeat_count, world, scheduler)
        }
    }
}

fn execute_animation(
    id: EntityId,
    repeat_count: u32,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
) -> Result<(), SimError> {
    let Some(entity) = world.entity_mut(id) else {
        return Ok(());
    };
    let Some(period) = entity.kind.animation_period() else {
        return Err(SimError::NotAnimated {
            entity: id,
            kind: entity.kind(),
        });
    };
    entity.advance_frame();
    if repeat_count != 1 {
        scheduler.schedule_event(
            id,
            Action::Animation {
                repeat_count: repeat_count.saturating_sub(1),
            },
            period,
        );
    }
    Ok(())
}

fn execute_activity(
    id: EntityId,
    position: Point,
    kind: EntityKind,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &mut ActionContext<'_>,
) -> Result<(), SimError> {
    match kind {
        EntityKind::Blacksmith | EntityKind::Obstacle => Err(SimError::NotActive {
            entity: id,
            kind: kind.kind(),
        }),
        EntityKind::MinerNotFull {
            resource_limit,
            resource_count,
            action_period,
            animation_period,
        } => {
            miner_not_full_tick(
                id,
                position,
                MinerStats {
                    resource_limit,
                    resource_count,
                    action_period,
                    animation_period,
                },
                world,
                scheduler,
                ctx.config,
            );
            Ok(())
        }
        EntityKind::MinerFull {
            resource_limit,
            action_period,
            animation_period,
        } => {
            miner_full_tick(
                id,
                position,
                MinerStats {
                    resource_limit,
                    resource_count: resource_limit,
                    action_period,
                    animation_period,
                },
                world,
                scheduler,
                ctx.config,
            );
            Ok(())
        }
        EntityKind::Ore { action_period } => {
            ore_tick(id, position, action_period, world, scheduler, ctx);
            Ok(())
        }
        EntityKind::OreBlob { action_period, .. } => {
            ore_blob_tick(id, position, action_period, world, scheduler, ctx);
            Ok(())
        }
        EntityKind::Quake { .. } => {
            scheduler.unschedule_all_events(id);
            world.remove_entity(id);
            debug!(%id, %position, "quake subsided");
            Ok(())
        }
        EntityKind::Vein { action_period } => {
            vein_tick(id, position, action_period, world, scheduler, ctx);
            Ok(())
        }
    }
}

/// Miner fields carried across a transform.
#[derive(Clone, Copy, Debug)]
struct MinerStats {
    resource_limit: u32,
    resource_count: u32,
    action_period: u64,
    animation_period: u64,
}

// ---------------------------------------------------------------------------
// Per-kind ticks
// ---------------------------------------------------------------------------

fn miner_not_full_tick(
    id: EntityId,
    position: Point,
    stats: MinerStats,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    config: &SimConfig,
) {
    if let Some((ore, ore_pos)) = nearest(world, position, Kind::Ore) {
        if position.adjacent(ore_pos) {
            scheduler.unschedule_all_events(ore);
            world.remove_entity(ore);
            let carried = stats.resource_count + 1;
            debug!(%id, %ore, carried, "miner collected ore");
            if carried >= stats.resource_limit {
                let full = EntityKind::miner_full(
                    stats.resource_limit,
                    stats.action_period,
                    stats.animation_period,
                );
                transform(id, full, world, scheduler, config);
                return;
            }
            if let Some(EntityKind::MinerNotFull { resource_count, .. }) =
                world.entity_mut(id).map(|e| &mut e.kind)
            {
                *resource_count = carried;
            }
        } else {
            let next = next_position_miner(world, position, ore_pos);
            step_to(id, next, world, scheduler);
        }
    }
    scheduler.schedule_event(id, Action::Activity, stats.action_period);
}

fn miner_full_tick(
    id: EntityId,
    position: Point,
    stats: MinerStats,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    config: &SimConfig,
) {
    if let Some((_, smith_pos)) = nearest(world, position, Kind::Blacksmith) {
        if position.adjacent(smith_pos) {
            let empty = EntityKind::miner_not_full(
                stats.resource_limit,
                stats.action_period,
                stats.animation_period,
            );
            transform(id, empty, world, scheduler, config);
            return;
        }
        let next = next_position_miner(world, position, smith_pos);
        step_to(id, next, world, scheduler);
    }
    scheduler.schedule_event(id, Action::Activity, stats.action_period);
}

fn ore_tick(
    id: EntityId,
    position: Point,
    action_period: u64,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &mut ActionContext<'_>,
) {
    scheduler.unschedule_all_events(id);
    let Some(ore) = world.remove_entity(id) else {
        return;
    };
    let blob_params = &ctx.config.blob;
    let kind = EntityKind::OreBlob {
        action_period: action_period / blob_params.period_divisor.max(1),
        animation_period: ctx
            .rng
            .range_u64(blob_params.animation_period_min, blob_params.animation_period_max),
    };
    let name = format!("{} -- blob", ore.name);
    if let Some(blob) = spawn(name, position, kind, world, scheduler, ctx) {
        debug!(%id, %blob, %position, "ore matured into blob");
    }
}

fn ore_blob_tick(
    id: EntityId,
    position: Point,
    action_period: u64,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &mut ActionContext<'_>,
) {
    let mut next_period = action_period;
    if let Some((vein, vein_pos)) = nearest(world, position, Kind::Vein) {
        if position.adjacent(vein_pos) {
            scheduler.unschedule_all_events(vein);
            world.remove_entity(vein);
            let quake = EntityKind::quake(ctx.config);
            if let Some(quake) = spawn("quake".to_string(), vein_pos, quake, world, scheduler, ctx) {
                debug!(%id, %vein, %quake, position = %vein_pos, "blob consumed vein");
            }
            next_period += action_period;
        } else {
            let next = next_position_ore_blob(world, position, vein_pos);
            step_to(id, next, world, scheduler);
        }
    }
    scheduler.schedule_event(id, Action::Activity, next_period);
}

fn vein_tick(
    id: EntityId,
    position: Point,
    action_period: u64,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &mut ActionContext<'_>,
) {
    if let Some(open) = world.find_open_around(position) {
        let ore_params = &ctx.config.ore;
        let kind = EntityKind::Ore {
            action_period: ctx
                .rng
                .range_u64(ore_params.corrupt_period_min, ore_params.corrupt_period_max),
        };
        let name = match world.entity(id) {
            Some(vein) => format!("ore -- {}", vein.name),
            None => "ore".to_string(),
        };
        if let Some(ore) = spawn(name, open, kind, world, scheduler, ctx) {
            debug!(%id, %ore, position = %open, "vein spawned ore");
        }
    }
    scheduler.schedule_event(id, Action::Activity, action_period);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Id and position of the nearest live entity of `kind`.
fn nearest(world: &WorldModel, origin: Point, kind: Kind) -> Option<(EntityId, Point)> {
    let id = world.find_nearest(origin, kind)?;
    world.entity(id).map(|e| (e.id, e.position))
}

/// Build a new entity of `kind` with its sprite sheet from the catalog,
/// place it and queue its initial events.
fn spawn(
    name: String,
    position: Point,
    kind: EntityKind,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    ctx: &ActionContext<'_>,
) -> Option<EntityId> {
    let sprites = ctx.sprites.get(kind.kind().sprite_key()).clone();
    let id = world.allocate_id();
    place_and_schedule(Entity::new(id, name, position, sprites, kind), world, scheduler, ctx.config)
}

/// Replace `id` with a new entity of `kind` at the same cell, keeping its
/// name and sprite sheet.
fn transform(
    id: EntityId,
    kind: EntityKind,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    config: &SimConfig,
) -> Option<EntityId> {
    let position = world.entity(id)?.position;
    scheduler.unschedule_all_events(id);
    let old = world.remove_entity(id)?;
    let new_id = world.allocate_id();
    let new_kind = kind.kind();
    let placed = place_and_schedule(
        Entity::new(new_id, old.name, position, old.sprites, kind),
        world,
        scheduler,
        config,
    );
    debug!(old = %id, new = %new_id, to = ?new_kind, %position, "transformed");
    placed
}

fn place_and_schedule(
    entity: Entity,
    world: &mut WorldModel,
    scheduler: &mut EventScheduler,
    config: &SimConfig,
) -> Option<EntityId> {
    let id = entity.id;
    if !world.add_entity(entity) {
        return None;
    }
    let placed = world.entity(id)?;
    scheduler.schedule_actions(placed, config);
    Some(id)
}

/// Move `id` to `next`, cancelling and evicting whatever stands there.
fn step_to(id: EntityId, next: Point, world: &mut WorldModel, scheduler: &mut EventScheduler) {
    let Some(current) = world.entity(id).map(|e| e.position) else {
        return;
    };
    if current == next || !world.within_bounds(next) {
        return;
    }
    if let Some(occupant) = world.occupant_id(next) {
        scheduler.unschedule_all_events(occupant);
        debug!(mover = %id, evicted = %occupant, position = %next, "evicted occupant");
    }
    world.move_entity(id, next);
}

/// One greedy step from `from` toward `dest`: horizontal if that cell passes,
/// else vertical if that cell passes, else stay put.
pub fn next_step(from: Point, dest: Point, passable: impl Fn(Point) -> bool) -> Point {
    let horiz = (dest.x - from.x).signum();
    if horiz != 0 {
        let candidate = from.offset(horiz, 0);
        if passable(candidate) {
            return candidate;
        }
    }
    let vert = (dest.y - from.y).signum();
    if vert != 0 {
        let candidate = from.offset(0, vert);
        if passable(candidate) {
            return candidate;
        }
    }
    from
}

/// Miner movement: only free in-bounds cells are passable.
pub fn next_position_miner(world: &WorldModel, from: Point, dest: Point) -> Point {
    next_step(from, dest, |p| world.within_bounds(p) && !world.is_occupied(p))
}

/// Blob movement: like the miner, but cells holding ore are passable too.
pub fn next_position_ore_blob(world: &WorldModel, from: Point, dest: Point) -> Point {
    next_step(from, dest, |p| {
        world.within_bounds(p) && world.get_occupant(p).is_none_or(|e| e.kind() == Kind::Ore)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::SpriteHandle;
    use crate::world::Background;

    struct Harness {
        world: WorldModel,
        scheduler: EventScheduler,
        config: SimConfig,
        sprites: SpriteCatalog,
        rng: GameRng,
    }

    impl Harness {
        fn new(rows: u32, cols: u32) -> Self {
            let mut sprites = SpriteCatalog::new();
            sprites.insert(SpriteHandle::new("miner", 4));
            sprites.insert(SpriteHandle::new("blob", 3));
            sprites.insert(SpriteHandle::new("quake", 6));
            sprites.insert(SpriteHandle::new("ore", 1));
            Self {
                world: WorldModel::new(
                    rows,
                    cols,
                    Background::new("grass", SpriteHandle::new("grass", 1)),
                ),
                scheduler: EventScheduler::new(1.0),
                config: SimConfig::default(),
                sprites,
                rng: GameRng::new(7),
            }
        }

        fn add(&mut self, pos: Point, kind: EntityKind) -> EntityId {
            let id = self.world.allocate_id();
            let sprites = self.sprites.get(kind.kind().sprite_key()).clone();
            let entity = Entity::new(id, format!("e{}", id.0), pos, sprites, kind);
            place_and_schedule(entity, &mut self.world, &mut self.scheduler, &self.config).unwrap()
        }

        /// Add without queueing anything, for tests that fire events by hand.
        fn add_quiet(&mut self, pos: Point, kind: EntityKind) -> EntityId {
            let id = self.world.allocate_id();
            let sprites = self.sprites.get(kind.kind().sprite_key()).clone();
            assert!(self.world.add_entity(Entity::new(id, "quiet", pos, sprites, kind)));
            id
        }

        fn fire(&mut self, entity: EntityId, action: Action) -> Result<(), SimError> {
            let event = ScheduledEvent {
                due: self.scheduler.now(),
                sequence: u64::MAX,
                entity,
                action,
            };
            let mut ctx = ActionContext {
                config: &self.config,
                sprites: &self.sprites,
                rng: &mut self.rng,
            };
            execute(&event, &mut self.world, &mut self.scheduler, &mut ctx)
        }

        fn run_until(&mut self, cutoff: u64) -> usize {
            let mut ctx = ActionContext {
                config: &self.config,
                sprites: &self.sprites,
                rng: &mut self.rng,
            };
            self.scheduler
                .update_on_time(cutoff, &mut self.world, &mut ctx)
                .unwrap()
        }

        fn assert_consistent(&self) {
            assert!(self.world.occupancy_consistent(), "occupancy bijection broken");
            assert!(self.scheduler.is_consistent(), "pending index out of sync");
            for id in self.scheduler.scheduled_entities() {
                assert!(self.world.contains(id), "orphan events for {id}");
            }
        }
    }

    #[test]
    fn activity_on_passive_kind_is_an_error() {
        let mut h = Harness::new(3, 3);
        let smith = h.add(Point::new(1, 1), EntityKind::Blacksmith);
        let err = h.fire(smith, Action::Activity).unwrap_err();
        assert!(matches!(
            err,
            SimError::NotActive {
                kind: Kind::Blacksmith,
                ..
            }
        ));
    }

    #[test]
    fn animation_on_still_kind_is_an_error() {
        let mut h = Harness::new(3, 3);
        let vein = h.add(Point::new(1, 1), EntityKind::Vein { action_period: 10 });
        let err = h.fire(vein, Action::Animation { repeat_count: 0 }).unwrap_err();
        assert!(matches!(err, SimError::NotAnimated { kind: Kind::Vein, .. }));
    }

    #[test]
    fn event_for_removed_entity_is_skipped() {
        let mut h = Harness::new(3, 3);
        let ore = h.add(Point::new(0, 0), EntityKind::Ore { action_period: 10 });
        h.world.remove_entity(ore);
        h.fire(ore, Action::Activity).unwrap();
        assert!(h.world.is_empty());
    }

    #[test]
    fn looping_animation_reschedules_with_zero() {
        let mut h = Harness::new(3, 3);
        let miner = h.add_quiet(Point::new(0, 0), EntityKind::miner_not_full(2, 500, 40));
        h.fire(miner, Action::Animation { repeat_count: 0 }).unwrap();
        assert_eq!(h.world.entity(miner).unwrap().frame, 1);
        let queued: Vec<_> = h.scheduler.events().collect();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].action, Action::Animation { repeat_count: 0 });
        assert_eq!(queued[0].due, 40);
    }

    #[test]
    fn last_burst_frame_stops_the_chain() {
        let mut h = Harness::new(3, 3);
        let quake = h.add_quiet(Point::new(0, 0), EntityKind::quake(&h.config));
        h.fire(quake, Action::Animation { repeat_count: 1 }).unwrap();
        assert_eq!(h.world.entity(quake).unwrap().frame, 1);
        assert!(h.scheduler.is_empty());

        h.fire(quake, Action::Animation { repeat_count: 3 }).unwrap();
        let next = h.scheduler.events().next().unwrap();
        assert_eq!(next.action, Action::Animation { repeat_count: 2 });
    }

    #[test]
    fn miner_step_prefers_horizontal() {
        let h = Harness::new(5, 5);
        let from = Point::new(0, 0);
        assert_eq!(next_position_miner(&h.world, from, Point::new(3, 3)), Point::new(1, 0));
        assert_eq!(next_position_miner(&h.world, from, Point::new(0, 3)), Point::new(0, 1));
        assert_eq!(next_position_miner(&h.world, from, from), from);
    }

    #[test]
    fn miner_step_goes_vertical_around_blocker_or_stays() {
        let mut h = Harness::new(5, 5);
        h.add(Point::new(1, 0), EntityKind::Obstacle);
        let from = Point::new(0, 0);
        assert_eq!(next_position_miner(&h.world, from, Point::new(3, 3)), Point::new(0, 1));
        assert_eq!(
            next_position_miner(&h.world, from, Point::new(3, 0)),
            from,
            "blocked horizontally with no vertical component"
        );
    }

    #[test]
    fn miner_does_not_walk_through_ore_but_blob_does() {
        let mut h = Harness::new(3, 5);
        h.add(Point::new(1, 1), EntityKind::Ore { action_period: 100 });
        let from = Point::new(0, 1);
        let dest = Point::new(4, 1);
        assert_eq!(next_position_miner(&h.world, from, dest), from);
        assert_eq!(next_position_ore_blob(&h.world, from, dest), Point::new(1, 1));
    }

    #[test]
    fn blob_is_blocked_by_non_ore() {
        let mut h = Harness::new(3, 5);
        h.add(Point::new(1, 1), EntityKind::Obstacle);
        h.add(Point::new(0, 2), EntityKind::Blacksmith);
        let from = Point::new(0, 1);
        assert_eq!(next_position_ore_blob(&h.world, from, Point::new(4, 2)), from);
    }

    #[test]
    fn miner_collects_adjacent_ore_and_reschedules() {
        let mut h = Harness::new(3, 3);
        let miner = h.add_quiet(Point::new(0, 0), EntityKind::miner_not_full(3, 50, 20));
        let ore = h.add(Point::new(1, 0), EntityKind::Ore { action_period: 1000 });

        h.fire(miner, Action::Activity).unwrap();

        assert!(!h.world.contains(ore));
        assert!(!h.scheduler.has_pending(ore), "collected ore must lose its events");
        let entity = h.world.entity(miner).unwrap();
        assert_eq!(entity.kind.resource_count(), Some(1));
        assert_eq!(entity.kind(), Kind::MinerNotFull);
        assert_eq!(h.scheduler.pending_for(miner).len(), 1);
        h.assert_consistent();
    }

    #[test]
    fn miner_turns_full_on_reaching_limit() {
        let mut h = Harness::new(3, 3);
        let miner = h.add_quiet(Point::new(0, 0), EntityKind::miner_not_full(1, 50, 20));
        h.add(Point::new(0, 1), EntityKind::Ore { action_period: 1000 });

        h.fire(miner, Action::Activity).unwrap();

        assert!(!h.world.contains(miner));
        let full: Vec<&Entity> = h.world.entities_of(Kind::MinerFull).collect();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].position, Point::new(0, 0));
        assert_eq!(full[0].kind.resource_count(), Some(1));
        assert_eq!(full[0].name, "quiet");
        // Activity plus looping animation for the new miner.
        assert_eq!(h.scheduler.pending_for(full[0].id).len(), 2);
        h.assert_consistent();
    }

    #[test]
    fn miner_without_ore_just_waits() {
        let mut h = Harness::new(3, 3);
        let miner = h.add_quiet(Point::new(1, 1), EntityKind::miner_not_full(2, 50, 20));
        h.fire(miner, Action::Activity).unwrap();
        assert_eq!(h.world.entity(miner).unwrap().position, Point::new(1, 1));
        assert!(h.scheduler.has_pending(miner));
    }

    #[test]
    fn full_miner_unloads_next_to_blacksmith() {
        let mut h = Harness::new(3, 3);
        h.add(Point::new(2, 1), EntityKind::Blacksmith);
        let miner = h.add_quiet(Point::new(1, 1), EntityKind::miner_full(2, 50, 20));

        h.fire(miner, Action::Activity).unwrap();

        assert!(!h.world.contains(miner));
        let empty: Vec<&Entity> = h.world.entities_of(Kind::MinerNotFull).collect();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].kind.resource_count(), Some(0));
        h.assert_consistent();
    }

    #[test]
    fn full_miner_walks_toward_blacksmith() {
        let mut h = Harness::new(1, 6);
        h.add(Point::new(5, 0), EntityKind::Blacksmith);
        let miner = h.add_quiet(Point::new(0, 0), EntityKind::miner_full(2, 50, 20));
        h.fire(miner, Action::Activity).unwrap();
        assert_eq!(h.world.entity(miner).unwrap().position, Point::new(1, 0));
        assert!(h.scheduler.has_pending(miner));
    }

    #[test]
    fn ore_matures_into_blob_in_place() {
        let mut h = Harness::new(3, 3);
        let ore = h.add(Point::new(2, 2), EntityKind::Ore { action_period: 400 });

        h.run_until(401);

        assert!(!h.world.contains(ore));
        assert!(!h.scheduler.has_pending(ore));
        let blob = h.world.get_occupant(Point::new(2, 2)).unwrap();
        assert_eq!(blob.kind(), Kind::OreBlob);
        assert_eq!(blob.kind.action_period(), Some(100));
        let anim = blob.kind.animation_period().unwrap();
        assert!((50..150).contains(&anim), "blob animation period {anim} out of range");
        assert_eq!(blob.sprites.key, "blob");
        h.assert_consistent();
    }

    #[test]
    fn blob_consumes_adjacent_vein_and_leaves_quake() {
        let mut h = Harness::new(3, 3);
        let vein = h.add(Point::new(1, 0), EntityKind::Vein { action_period: 5000 });
        let blob = h.add_quiet(
            Point::new(1, 1),
            EntityKind::OreBlob {
                action_period: 60,
                animation_period: 90,
            },
        );

        h.fire(blob, Action::Activity).unwrap();

        assert!(!h.world.contains(vein));
        assert!(!h.scheduler.has_pending(vein));
        let quake = h.world.get_occupant(Point::new(1, 0)).unwrap();
        assert_eq!(quake.kind(), Kind::Quake);
        let blob_events: Vec<_> = h.scheduler.events().filter(|e| e.entity == blob).collect();
        assert_eq!(blob_events.len(), 1);
        assert_eq!(blob_events[0].due, 120, "cooldown doubles the delay");
        h.assert_consistent();
    }

    #[test]
    fn blob_moving_onto_ore_evicts_it() {
        let mut h = Harness::new(1, 5);
        h.add(Point::new(4, 0), EntityKind::Vein { action_period: 5000 });
        let ore = h.add(Point::new(1, 0), EntityKind::Ore { action_period: 9000 });
        let blob = h.add_quiet(
            Point::new(0, 0),
            EntityKind::OreBlob {
                action_period: 60,
                animation_period: 90,
            },
        );

        h.fire(blob, Action::Activity).unwrap();

        assert_eq!(h.world.entity(blob).unwrap().position, Point::new(1, 0));
        assert!(!h.world.contains(ore));
        assert!(!h.scheduler.has_pending(ore));
        let blob_events: Vec<_> = h.scheduler.events().filter(|e| e.entity == blob).collect();
        assert_eq!(blob_events[0].due, 60, "no cooldown when only moving");
        h.assert_consistent();
    }

    #[test]
    fn quake_removes_itself() {
        let mut h = Harness::new(3, 3);
        let quake = h.add(Point::new(1, 1), EntityKind::quake(&h.config));
        h.fire(quake, Action::Activity).unwrap();
        assert!(!h.world.contains(quake));
        assert!(!h.scheduler.has_pending(quake), "pending shake frames must go too");
        h.assert_consistent();
    }

    #[test]
    fn vein_spawns_ore_in_first_open_cell() {
        let mut h = Harness::new(5, 5);
        let vein = h.add_quiet(Point::new(2, 2), EntityKind::Vein { action_period: 300 });
        h.fire(vein, Action::Activity).unwrap();

        let ore = h.world.get_occupant(Point::new(1, 1)).unwrap();
        assert_eq!(ore.kind(), Kind::Ore);
        assert_eq!(ore.name, "ore -- quiet");
        let period = ore.kind.action_period().unwrap();
        assert!((20_000..30_000).contains(&period));
        assert!(h.scheduler.has_pending(ore.id));
        assert!(h.scheduler.has_pending(vein), "vein always reschedules");
        h.assert_consistent();
    }

    #[test]
    fn boxed_in_vein_still_reschedules() {
        let mut h = Harness::new(1, 1);
        let vein = h.add_quiet(Point::new(0, 0), EntityKind::Vein { action_period: 300 });
        h.fire(vein, Action::Activity).unwrap();
        assert_eq!(h.world.len(), 1);
        assert_eq!(h.scheduler.pending_for(vein).len(), 1);
    }
}
