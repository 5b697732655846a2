//! Fleet time.
//!
//! The fleet advances in whole `Tick`s.  Each tick hands every moving convoy
//! `delta_t_per_tick` engine ticks, which the mover turns into
//!
//!   seconds = delta_t · simtime_factor / 64
//!
//! (see [`units::ticks_to_secs`][crate::units::ticks_to_secs]).  Departures
//! and dwell deadlines are stored as ticks, so a replay is exact.

use std::fmt;

use crate::Fixed;
use crate::units::ticks_to_secs;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// A fleet step number.  Departure times and dwell deadlines compare against it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

/// A deadline `rhs` ticks from now, e.g. the end of a dwell.
impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The fleet's step counter plus what it needs to report simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Engine ticks (`delta_t`) handed to the mover per step.
    pub delta_t_per_tick: u32,
    /// Map scale; see [`PhysicsConfig::simtime_factor`][crate::PhysicsConfig::simtime_factor].
    pub simtime_factor: Fixed,
    /// The current step, advanced by [`SimClock::advance`].
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(delta_t_per_tick: u32, simtime_factor: Fixed) -> Self {
        Self {
            delta_t_per_tick,
            simtime_factor,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Simulated seconds per step.
    #[inline]
    pub fn secs_per_tick(&self) -> Fixed {
        ticks_to_secs(self.simtime_factor, self.delta_t_per_tick as i64)
    }

    /// Simulated seconds since step 0.
    #[inline]
    pub fn elapsed_secs(&self) -> Fixed {
        let engine_ticks = (self.current_tick.0 as i64).saturating_mul(self.delta_t_per_tick as i64);
        ticks_to_secs(self.simtime_factor, engine_ticks)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_tick, self.elapsed_secs())
    }
}
