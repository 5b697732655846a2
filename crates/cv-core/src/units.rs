//! Conversions between engine units and SI units.
//!
//! # Units
//!
//! | Quantity | Engine unit              | SI                              |
//! |----------|--------------------------|---------------------------------|
//! | speed    | simulation speed         | `m/s = speed · 800 / 36864`     |
//! | speed    | km/h (integer)           | `m/s = km/h · 10 / 36`          |
//! | distance | yard                     | `m = yard · 800 / (36864 · 64)` |
//! | distance | step (= 4096 yards)      | yards × `simtime_factor`        |
//! | time     | tick                     | `s = ticks · simtime_factor / 64` |
//!
//! `simtime_factor` is the real length of one tile in metres divided by the
//! 1000 m reference tile (see [`PhysicsConfig`][crate::PhysicsConfig]).  Distances
//! and times both scale with it, so a convoy covers the same number of
//! yards per tick on every map scale.
//!
//! Every conversion into an integer unit rounds half up.

use crate::Fixed;

// ── Scale constants ───────────────────────────────────────────────────────────

/// Simulation speed units per (km/h · 1024).
pub const VEHICLE_SPEED_FACTOR: i64 = 80;

/// Ticks per second of simulated time at `simtime_factor == 1`.
pub const DT_TIME_FACTOR: i64 = 64;

/// One step is `1 << 12` yards.
pub const YARDS_PER_VEHICLE_STEP_SHIFT: u32 = 12;

/// Vehicle length units per tile.
pub const CARUNITS_PER_TILE: u32 = 16;

/// A gear of 1.0 is stored as 64.
pub const GEAR_FACTOR: i64 = 64;

/// Speed cap of a convoy without vehicles.  Anything much greater overflows
/// `kmh_to_speed` in `i32`.
pub const KMH_SPEED_UNLIMITED: i32 = 300_000;

/// "No weight limit" sentinel returned by the max-weight queries.
pub const WEIGHT_UNLIMITED: i32 = i32::MAX;

/// Slowest speed that still counts as moving.
pub const KMH_MIN: i32 = 4;

/// [`KMH_MIN`] in simulation speed units.
pub const SPEED_MIN: i32 = kmh_to_speed(KMH_MIN);

/// [`KMH_MIN`] in m/s.
pub const V_MIN: Fixed = kmh_to_v(KMH_MIN);

// Numerators/denominators of the speed and distance scales.
const SIMSPEED_NUM: i64 = 10 * VEHICLE_SPEED_FACTOR; // 800
const SIMSPEED_DEN: i64 = 36 * 1024; // 36864
const YARDS_DEN: i64 = SIMSPEED_DEN * DT_TIME_FACTOR;

// ── km/h ──────────────────────────────────────────────────────────────────────

/// km/h → simulation speed (truncating, as the engine's integer macro does).
#[inline]
pub const fn kmh_to_speed(kmh: i32) -> i32 {
    (((kmh as i64) << 10) / VEHICLE_SPEED_FACTOR) as i32
}

/// Simulation speed → km/h, rounded to nearest.
#[inline]
pub const fn speed_to_kmh(speed: i32) -> i32 {
    ((speed as i64 * VEHICLE_SPEED_FACTOR + 511) >> 10) as i32
}

/// km/h → m/s.
#[inline]
pub const fn kmh_to_v(kmh: i32) -> Fixed {
    Fixed::ratio(kmh as i64 * 10, 36)
}

/// m/s → km/h, rounded half up.
#[inline]
pub fn v_to_kmh(v: Fixed) -> i32 {
    v.mul_int(36).div_int(10).round_i32()
}

// ── Simulation speed ──────────────────────────────────────────────────────────

/// Simulation speed → m/s.
#[inline]
pub fn speed_to_v(speed: i32) -> Fixed {
    Fixed::ratio(speed as i64 * SIMSPEED_NUM, SIMSPEED_DEN)
}

/// m/s → simulation speed, rounded half up.
#[inline]
pub fn v_to_speed(v: Fixed) -> i32 {
    v.mul_int(SIMSPEED_DEN).div_int(SIMSPEED_NUM).round_i32()
}

// ── Distance ──────────────────────────────────────────────────────────────────

/// Yards → metres at the reference tile size.
#[inline]
pub fn yards_to_x(yards: i64) -> Fixed {
    Fixed::ratio(yards.saturating_mul(SIMSPEED_NUM), YARDS_DEN)
}

/// Metres at the reference tile size → yards, rounded half up.
#[inline]
pub fn x_to_yards(x: Fixed) -> i64 {
    x.mul_int(YARDS_DEN).div_int(SIMSPEED_NUM).round()
}

/// Steps → metres on a map whose tiles are `simtime_factor` reference tiles.
#[inline]
pub fn steps_to_x(simtime_factor: Fixed, steps: i64) -> Fixed {
    yards_to_x(steps << YARDS_PER_VEHICLE_STEP_SHIFT) * simtime_factor
}

/// Metres → whole steps (floor) on a map scaled by `simtime_factor`.
#[inline]
pub fn x_to_steps(simtime_factor: Fixed, x: Fixed) -> i64 {
    x_to_yards(x / simtime_factor) >> YARDS_PER_VEHICLE_STEP_SHIFT
}

/// Metres → yards on a map scaled by `simtime_factor`.
#[inline]
pub fn x_to_scaled_yards(simtime_factor: Fixed, x: Fixed) -> i64 {
    x_to_yards(x / simtime_factor)
}

// ── Time ──────────────────────────────────────────────────────────────────────

/// Seconds of simulated time that `delta_t` ticks represent.
#[inline]
pub fn ticks_to_secs(simtime_factor: Fixed, delta_t: i64) -> Fixed {
    simtime_factor.mul_int(delta_t).div_int(DT_TIME_FACTOR)
}
