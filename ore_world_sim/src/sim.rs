// Simulation state and the outer-loop API.
//
// `SimState` owns the world, the event scheduler, the config, the sprite
// catalog and the PRNG. An outside loop (a renderer, the headless driver,
// a test) does three things with it:
//
//   1. Build it, usually from a `Scenario` (`from_scenario`), which places
//      every record and queues each placed entity's initial events.
//   2. Advance virtual time with `update_on_time(cutoff)` as often as it
//      likes. Everything due strictly before the cutoff runs, in order.
//   3. Read back what to draw with `drawables()`, or population numbers
//      with `count(kind)`.
//
// The sim never advances on its own and never reads a wall clock: the same
// scenario, seed and sequence of cutoffs always produces the same world.
//
// See also: `event.rs` for the scheduler, `behavior.rs` for what events do,
// `scenario.rs` for the loadable world description.

use crate::behavior::ActionContext;
use crate::config::SimConfig;
use crate::entity::{Entity, EntityKind};
use crate::error::SimError;
use crate::event::EventScheduler;
use crate::prng::GameRng;
use crate::scenario::{LoadReport, Scenario};
use crate::sprites::{SpriteCatalog, SpriteHandle};
use crate::types::{EntityId, Kind, Point};
use crate::world::{Background, WorldModel};
use tracing::{debug, info, warn};

/// The complete simulation.
#[derive(Clone, Debug)]
pub struct SimState {
    pub config: SimConfig,
    pub sprites: SpriteCatalog,
    pub world: WorldModel,
    pub scheduler: EventScheduler,
    /// The only source of randomness.
    pub rng: GameRng,
}

/// What the outside needs to draw one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drawable<'a> {
    pub id: EntityId,
    pub kind: Kind,
    pub position: Point,
    pub frame: u32,
    pub sprites: &'a SpriteHandle,
}

impl SimState {
    /// Wrap an existing world. The config is validated here, so nothing
    /// downstream has to cope with an empty random range.
    pub fn new(
        world: WorldModel,
        config: SimConfig,
        sprites: SpriteCatalog,
        seed: u64,
    ) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            scheduler: EventScheduler::new(config.time_scale),
            config,
            sprites,
            world,
            rng: GameRng::new(seed),
        })
    }

    /// Build a world from a scenario and load its records.
    pub fn from_scenario(
        scenario: &Scenario,
        config: SimConfig,
        seed: u64,
    ) -> Result<(Self, LoadReport), SimError> {
        let sprites = SpriteCatalog::from_handles(scenario.sprites.iter().cloned());
        let default_bg = Background::new(
            scenario.default_background.clone(),
            sprites.get(&scenario.default_background).clone(),
        );
        let world = WorldModel::new(scenario.rows, scenario.cols, default_bg);
        let mut state = Self::new(world, config, sprites, seed)?;
        let report = state.load_scenario(scenario);
        Ok((state, report))
    }

    /// Place a scenario's backgrounds and entities into the current world.
    ///
    /// Conflicting and out-of-bounds entity records are skipped and reported.
    /// Every placed entity gets its initial events.
    pub fn load_scenario(&mut self, scenario: &Scenario) -> LoadReport {
        for record in &scenario.backgrounds {
            let bg = Background::new(record.key.clone(), self.sprites.get(&record.key).clone());
            self.world.set_background(Point::new(record.x, record.y), bg);
        }

        let mut report = LoadReport::default();
        for (index, record) in scenario.entities.iter().enumerate() {
            let kind = record.entity_kind();
            let sprites = self.sprites.get(kind.kind().sprite_key()).clone();
            let entity = Entity::new(
                self.world.allocate_id(),
                record.name(),
                record.position(),
                sprites,
                kind,
            );
            match self.add_entity(entity) {
                Ok(Some(id)) => report.placed.push(id),
                Ok(None) => {
                    warn!(index, name = record.name(), position = %record.position(), "skipping out-of-bounds record");
                    report.out_of_bounds.push(index);
                }
                Err(err) => {
                    warn!(index, name = record.name(), %err, "skipping record");
                    report.conflicts.push((index, err));
                }
            }
        }
        info!(
            placed = report.placed.len(),
            skipped = report.skipped(),
            "scenario loaded"
        );
        report
    }

    /// Place an entity and queue its initial events.
    ///
    /// `Ok(None)` means it was out of bounds and dropped; an occupied cell
    /// is an error and nothing changes.
    pub fn add_entity(&mut self, entity: Entity) -> Result<Option<EntityId>, SimError> {
        let id = entity.id;
        if !self.world.try_add_entity(entity)? {
            return Ok(None);
        }
        if let Some(placed) = self.world.entity(id) {
            self.scheduler.schedule_actions(placed, &self.config);
            debug!(%id, kind = ?placed.kind(), position = %placed.position, "entity added");
        }
        Ok(Some(id))
    }

    /// Build and add an entity with a fresh id and its kind's sprite sheet.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        position: Point,
        kind: EntityKind,
    ) -> Result<Option<EntityId>, SimError> {
        let sprites = self.sprites.get(kind.kind().sprite_key()).clone();
        let entity = Entity::new(self.world.allocate_id(), name, position, sprites, kind);
        self.add_entity(entity)
    }

    /// Run every event due strictly before `cutoff`. Returns how many ran.
    pub fn update_on_time(&mut self, cutoff: u64) -> Result<usize, SimError> {
        let SimState {
            config,
            sprites,
            world,
            scheduler,
            rng,
        } = self;
        let mut ctx = ActionContext {
            config,
            sprites,
            rng,
        };
        scheduler.update_on_time(cutoff, world, &mut ctx)
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Number of live entities of `kind`.
    pub fn count(&self, kind: Kind) -> usize {
        self.world.entities_of(kind).count()
    }

    /// Every live entity with what it takes to draw it, in id order.
    pub fn drawables(&self) -> impl Iterator<Item = Drawable<'_>> + '_ {
        self.world.entities().map(|e| Drawable {
            id: e.id,
            kind: e.kind(),
            position: e.position,
            frame: e.frame,
            sprites: &e.sprites,
        })
    }

    /// Occupancy bijection holds, the pending index matches the queue, and
    /// no queued event names an entity that has left the world.
    pub fn is_consistent(&self) -> bool {
        self.world.occupancy_consistent()
            && self.scheduler.is_consistent()
            && self
                .scheduler
                .scheduled_entities()
                .all(|id| self.world.contains(id))
    }
}
