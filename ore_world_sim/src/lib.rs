// ore_world_sim: discrete-event core of the ore world.
//
// A grid of cells, at most one entity per cell, and a clock that only moves
// when an outside loop asks it to. Every entity that does anything (miners,
// ore, blobs, veins, quakes) drives itself by scheduling its own next action
// into a time-ordered queue; the queue pops the earliest one, runs it against
// the grid, and the action schedules whatever comes next.
//
// Module overview:
// - `types.rs`:    `Point`, `EntityId`, the fieldless `Kind` tag.
// - `sprites.rs`:  Opaque per-kind image-list handles and the catalog that hands them out.
// - `entity.rs`:   `Entity` and the closed `EntityKind` variant set with per-kind fields.
// - `world.rs`:    `WorldModel`: background layer, occupancy layer, live entity arena.
// - `event.rs`:    `EventScheduler`: (due, sequence)-ordered queue plus per-entity pending index.
// - `behavior.rs`: Activity and Animation execution, movement policies, spawn/transform chains.
// - `config.rs`:   `SimConfig`: every tunable period and range, loaded from JSON.
// - `scenario.rs`: Already-parsed world records and the report produced by loading them.
// - `sim.rs`:      `SimState`: owns everything above and exposes the outer-loop API.
// - `error.rs`:    `SimError`.
//
// Rendering, image decoding and world-file text parsing live outside this
// crate. The outside sees positions, frame indices and sprite handles through
// `SimState::drawables()`; it hands entities in through `SimState::load_scenario`
// or `SimState::add_entity`.
//
// **Critical constraint: determinism.** All randomness comes from the
// `GameRng` owned by `SimState` (re-exported from `ore_world_prng`). The live
// entity set is a `BTreeMap` so iteration order, and with it every
// nearest-target tie, is fixed by entity id.

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub use ore_world_prng as prng;
pub mod scenario;
pub mod sim;
pub mod sprites;
pub mod types;
pub mod world;
