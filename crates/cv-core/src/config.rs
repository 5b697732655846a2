//! Physics and driver configuration.
//!
//! These values replace the global world lookups the physics would otherwise
//! need.  A `PhysicsConfig` is handed to every convoy variant at construction
//! time, and a `SimConfig` to the fleet driver.  Both are usually loaded from
//! JSON by the application crate (enable the `serde` feature).

use crate::units::GEAR_FACTOR;
use crate::{CvError, CvResult, Fixed, SimClock, Tick};

/// Reference tile length in metres.  `simtime_factor == 1` at this scale.
pub const REFERENCE_TILE_METERS: u32 = 1_000;

// ── PhysicsConfig ─────────────────────────────────────────────────────────────

/// World settings that affect the force/power curves and the unit scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    /// Real length of one tile in metres.  Default: 1000.
    pub meters_per_tile: u32,

    /// Global scale applied to every engine's force and power, in percent.
    /// Must not be 0.  Default: 100.
    pub power_factor_percent: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            meters_per_tile:      REFERENCE_TILE_METERS,
            power_factor_percent: 100,
        }
    }
}

impl PhysicsConfig {
    /// Tile length relative to the 1000 m reference tile.
    #[inline]
    pub fn simtime_factor(&self) -> Fixed {
        Fixed::ratio(self.meters_per_tile as i64, REFERENCE_TILE_METERS as i64)
    }

    /// Reject settings that would put a zero into a denominator.
    pub fn validate(&self) -> CvResult<()> {
        if self.meters_per_tile == 0 {
            return Err(CvError::Config("meters_per_tile must be positive".into()));
        }
        if self.power_factor_percent == 0 {
            return Err(CvError::Config("power_factor_percent must be positive".into()));
        }
        Ok(())
    }

    /// Convert an effective power or force index (a value multiplied by the
    /// vehicle's gear, see [`GEAR_FACTOR`]) into the plain value in the same
    /// unit, with the global power factor applied.
    #[inline]
    pub fn power_index_to_power(&self, power_index: i64) -> i64 {
        power_index_to_power(power_index, self.power_factor_percent)
    }
}

/// Strip the gear factor from `power_index` and apply `power_factor` (a
/// percentage).  The result keeps the index's unit (kW stays kW, kN stays kN).
///
/// `power_factor` must not be 0.
#[inline]
pub fn power_index_to_power(power_index: i64, power_factor: u32) -> i64 {
    debug_assert!(power_factor != 0, "power factor must not be 0");
    power_index.saturating_mul(power_factor as i64) / (GEAR_FACTOR * 100)
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration of a fleet run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total driver steps to simulate.
    pub total_ticks: u64,

    /// Engine ticks handed to `calc_move` per step.  At the reference tile
    /// size 64 engine ticks are one simulated second.
    pub delta_t_per_tick: u32,

    /// Emit a trace row every N steps (0 disables tracing).
    pub trace_interval_ticks: u64,

    pub physics: PhysicsConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:          3_600,
            delta_t_per_tick:     64,
            trace_interval_ticks: 1,
            physics:              PhysicsConfig::default(),
        }
    }
}

impl SimConfig {
    /// The tick at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.delta_t_per_tick, self.physics.simtime_factor())
    }

    pub fn validate(&self) -> CvResult<()> {
        if self.delta_t_per_tick == 0 {
            return Err(CvError::Config("delta_t_per_tick must be positive".into()));
        }
        self.physics.validate()
    }
}
