// Data-driven simulation configuration.
//
// Every period and random range the behaviors use lives in `SimConfig`,
// loaded from JSON at startup. Behaviors read from the config instead of
// carrying their own constants, so a scenario can be rebalanced (slower ore,
// longer quakes, a faster clock) without recompiling.
//
// Parameters are grouped by the entity kind that consumes them:
// `QuakeParams`, `OreParams`, `BlobParams`. Every field has a default, and
// every struct is `#[serde(default)]`, so a config file only needs to name
// what it changes. `{}` is a valid config.
//
// See also: `behavior.rs` which reads these values when ore matures, veins
// spawn ore and blobs set off quakes, `event.rs` for how `time_scale` turns
// periods into due-times.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Timing of the quake a blob leaves behind when it consumes a vein.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuakeParams {
    /// Virtual time from spawn until the quake removes itself.
    pub action_period: u64,
    /// Virtual time between frames of the shake animation.
    pub animation_period: u64,
    /// Number of frame advances in the shake burst. Must be non-zero: zero
    /// would mean an endless animation on a short-lived entity.
    pub animation_repeat_count: u32,
}

impl Default for QuakeParams {
    fn default() -> Self {
        Self {
            action_period: 1100,
            animation_period: 100,
            animation_repeat_count: 10,
        }
    }
}

/// Ore spawned by a vein.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreParams {
    /// Inclusive lower bound of a spawned ore's action period, i.e. how long
    /// it lies around before maturing into a blob.
    pub corrupt_period_min: u64,
    /// Exclusive upper bound of the same range.
    pub corrupt_period_max: u64,
}

impl Default for OreParams {
    fn default() -> Self {
        Self {
            corrupt_period_min: 20_000,
            corrupt_period_max: 30_000,
        }
    }
}

/// Blobs that ore matures into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    /// Blob action period = the maturing ore's action period / this divisor.
    pub period_divisor: u64,
    /// Inclusive lower bound of a blob's animation period.
    pub animation_period_min: u64,
    /// Exclusive upper bound of a blob's animation period.
    pub animation_period_max: u64,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            period_divisor: 4,
            animation_period_min: 50,
            animation_period_max: 150,
        }
    }
}

/// All tunable simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Multiplier applied to every period when it is scheduled. Values below
    /// 1.0 speed the world up.
    pub time_scale: f64,
    pub quake: QuakeParams,
    pub ore: OreParams,
    pub blob: BlobParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            quake: QuakeParams::default(),
            ore: OreParams::default(),
            blob: BlobParams::default(),
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject values the behaviors can't run with: empty random ranges, a
    /// zero divisor, a scale that isn't a positive finite number.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(SimError::InvalidConfig(
                "time_scale must be a positive finite number",
            ));
        }
        if self.quake.animation_repeat_count == 0 {
            return Err(SimError::InvalidConfig(
                "quake.animation_repeat_count must be at least 1",
            ));
        }
        if self.ore.corrupt_period_min >= self.ore.corrupt_period_max {
            return Err(SimError::InvalidConfig(
                "ore.corrupt_period_min must be below ore.corrupt_period_max",
            ));
        }
        if self.blob.period_divisor == 0 {
            return Err(SimError::InvalidConfig("blob.period_divisor must be non-zero"));
        }
        if self.blob.animation_period_min >= self.blob.animation_period_max {
            return Err(SimError::InvalidConfig(
                "blob.animation_period_min must be below blob.animation_period_max",
            ));
        }
        Ok(())
    }
}
