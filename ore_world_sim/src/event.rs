// Event scheduler: the priority queue that drives the simulation, plus the
// per-entity index that makes cancellation cheap.
//
// The sim is a discrete event simulation. Entities schedule future actions
// into a queue ordered by `(due, sequence)`; `update_on_time(cutoff)` pops
// and runs everything due strictly before `cutoff`, in order. Nothing happens
// between events, so empty stretches of virtual time cost nothing.
//
// Two structures hold the same events:
// - `queue`: `BTreeMap<EventKey, ScheduledEvent>`, the time order. A map
//   rather than a heap because cancellation removes arbitrary entries.
// - `pending`: entity id -> keys of that entity's queued events. A cache
//   over `queue` so `unschedule_all_events` touches only that entity's k
//   events instead of scanning the queue.
//
// Every insertion and removal updates both sides in the same method;
// `is_consistent()` checks that they agree.
//
// Clock: while an event runs, `now` is its due-time, so anything it schedules
// is relative to when it fired, not to the cutoff. After `update_on_time`
// returns, `now` is at least the cutoff.
//
// See also: `behavior.rs` for what Activity and Animation events do when
// they fire, `sim.rs` which owns the scheduler as part of `SimState`.
//
// **Determinism.** The `(due, sequence)` key is a total order: ties on due
// time fire in the order they were scheduled.

use crate::behavior::{self, ActionContext};
use crate::config::SimConfig;
use crate::entity::Entity;
use crate::error::SimError;
use crate::types::EntityId;
use crate::world::WorldModel;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::trace;

/// What a scheduled event does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Run the entity's kind-specific behavior tick.
    Activity,
    /// Advance the entity's frame. `repeat_count` of `0` loops forever;
    /// `1` is the last frame of a finite burst.
    Animation { repeat_count: u32 },
}

/// Position of an event in the queue. Lower keys fire first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub due: u64,
    /// Global schedule order; breaks ties between equal due-times.
    pub sequence: u64,
}

/// An event waiting in the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub due: u64,
    pub sequence: u64,
    pub entity: EntityId,
    pub action: Action,
}

impl ScheduledEvent {
    pub fn key(&self) -> EventKey {
        EventKey {
            due: self.due,
            sequence: self.sequence,
        }
    }
}

/// Virtual clock, time-ordered queue and per-entity pending index.
#[derive(Clone, Debug)]
pub struct EventScheduler {
    queue: BTreeMap<EventKey, ScheduledEvent>,
    /// Most entities have one Activity and one Animation queued.
    pending: FxHashMap<EntityId, SmallVec<[EventKey; 2]>>,
    next_sequence: u64,
    now: u64,
    time_scale: f64,
}

impl EventScheduler {
    pub fn new(time_scale: f64) -> Self {
        Self {
            queue: BTreeMap::new(),
            pending: FxHashMap::default(),
            next_sequence: 0,
            now: 0,
            time_scale,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Scaled delay for a period. Never zero, so a chain of self-rescheduling
    /// events always moves forward in time.
    fn scaled(&self, period: u64) -> u64 {
        ((period as f64 * self.time_scale) as u64).max(1)
    }

    /// Queue `action` for `entity`, due `after_period × time_scale` from now.
    pub fn schedule_event(&mut self, entity: EntityId, action: Action, after_period: u64) -> EventKey {
        let key = EventKey {
            due: self.now.saturating_add(self.scaled(after_period)),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.queue.insert(
            key,
            ScheduledEvent {
                due: key.due,
                sequence: key.sequence,
                entity,
                action,
            },
        );
        self.pending.entry(entity).or_default().push(key);
        key
    }

    /// Cancel every queued event for `entity`. Returns how many were removed.
    pub fn unschedule_all_events(&mut self, entity: EntityId) -> usize {
        let Some(keys) = self.pending.remove(&entity) else {
            return 0;
        };
        for key in &keys {
            self.queue.remove(key);
        }
        if !keys.is_empty() {
            trace!(%entity, cancelled = keys.len(), "unscheduled events");
        }
        keys.len()
    }

    /// Queue the initial events for an entity that was just placed: one
    /// Activity if the kind acts, one Animation if it animates.
    pub fn schedule_actions(&mut self, entity: &Entity, config: &SimConfig) {
        if let Some(period) = entity.kind.action_period() {
            self.schedule_event(entity.id, Action::Activity, period);
        }
        if let Some(period) = entity.kind.animation_period() {
            let repeat_count = entity.kind.animation_repeat_count(config);
            self.schedule_event(entity.id, Action::Animation { repeat_count }, period);
        }
    }

    /// Due-time of the earliest queued event.
    pub fn peek_due(&self) -> Option<u64> {
        self.queue.first_key_value().map(|(key, _)| key.due)
    }

    /// Remove and return the earliest event if it is due strictly before
    /// `cutoff`, advancing the clock to its due-time.
    pub fn pop_due(&mut self, cutoff: u64) -> Option<ScheduledEvent> {
        if !self.peek_due().is_some_and(|due| due < cutoff) {
            return None;
        }
        let (key, event) = self.queue.pop_first()?;
        if let Some(keys) = self.pending.get_mut(&event.entity) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.pending.remove(&event.entity);
            }
        }
        self.now = self.now.max(event.due);
        Some(event)
    }

    /// Run every event due strictly before `cutoff`, then move the clock to
    /// `cutoff`. Returns the number of events executed.
    ///
    /// A dispatch mismatch stops the run and is returned; events not yet
    /// reached stay queued.
    pub fn update_on_time(
        &mut self,
        cutoff: u64,
        world: &mut WorldModel,
        ctx: &mut ActionContext<'_>,
    ) -> Result<usize, SimError> {
        let mut executed = 0;
        while let Some(event) = self.pop_due(cutoff) {
            trace!(due = event.due, entity = %event.entity, action = ?event.action, "event");
            behavior::execute(&event, world, self, ctx)?;
            executed += 1;
        }
        self.now = self.now.max(cutoff);
        Ok(executed)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Keys of the events queued for `entity`, in schedule order.
    pub fn pending_for(&self, entity: EntityId) -> &[EventKey] {
        self.pending
            .get(&entity)
            .map(|keys| keys.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_pending(&self, entity: EntityId) -> bool {
        !self.pending_for(entity).is_empty()
    }

    /// Entities with at least one queued event.
    pub fn scheduled_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.pending.keys().copied()
    }

    /// Queued events in firing order.
    pub fn events(&self) -> impl Iterator<Item = &ScheduledEvent> + '_ {
        self.queue.values()
    }

    /// Check that the pending index and the queue hold exactly the same
    /// events, each attributed to the right entity.
    pub fn is_consistent(&self) -> bool {
        let indexed: usize = self.pending.values().map(|keys| keys.len()).sum();
        indexed == self.queue.len()
            && self.pending.iter().all(|(entity, keys)| {
                !keys.is_empty()
                    && keys
                        .iter()
                        .all(|key| self.queue.get(key).is_some_and(|e| e.entity == *entity))
            })
    }
}
