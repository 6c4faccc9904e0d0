// ore_world_headless: a driver loop for the ore world without a screen.
//
// Stands where a renderer would: it owns a `SimState`, advances virtual time
// one fixed-size frame at a time, and reads back population numbers instead
// of drawing. Useful for soak runs, for checking a scenario file loads
// cleanly, and as the end-to-end test of the sim crate.
//
// The binary (`main.rs`) handles arguments, files and logging setup; `run()`
// here is the loop itself so tests can call it directly.

use ore_world_sim::config::SimConfig;
use ore_world_sim::error::SimError;
use ore_world_sim::scenario::{LoadReport, Scenario};
use ore_world_sim::sim::SimState;
use ore_world_sim::types::Kind;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

const ALL_KINDS: [Kind; 8] = [
    Kind::Blacksmith,
    Kind::MinerNotFull,
    Kind::MinerFull,
    Kind::Obstacle,
    Kind::Ore,
    Kind::OreBlob,
    Kind::Quake,
    Kind::Vein,
];

/// Loop parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub seed: u64,
    /// Number of frames to advance.
    pub frames: u64,
    /// Virtual time per frame.
    pub frame_ms: u64,
    /// Log a population line every this many frames. 0 disables.
    pub log_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            frames: 600,
            frame_ms: 100,
            log_every: 50,
        }
    }
}

/// Where the world ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub now: u64,
    pub events: usize,
    pub population: BTreeMap<Kind, usize>,
}

impl Summary {
    fn capture(sim: &SimState, events: usize) -> Self {
        Self {
            now: sim.now(),
            events,
            population: ALL_KINDS.iter().map(|&k| (k, sim.count(k))).collect(),
        }
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.population.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} events={}", self.now, self.events)?;
        for (kind, count) in &self.population {
            write!(f, " {kind:?}={count}")?;
        }
        Ok(())
    }
}

/// Load `scenario` and advance it `options.frames` frames.
pub fn run(
    scenario: &Scenario,
    config: SimConfig,
    options: &RunOptions,
) -> Result<(Summary, LoadReport), SimError> {
    let (mut sim, report) = SimState::from_scenario(scenario, config, options.seed)?;
    let mut events = 0;
    for frame in 1..=options.frames {
        events += sim.update_on_time(frame.saturating_mul(options.frame_ms))?;
        if options.log_every != 0 && frame % options.log_every == 0 {
            let summary = Summary::capture(&sim, events);
            info!(frame, %summary, "progress");
        }
    }
    Ok((Summary::capture(&sim, events), report))
}
