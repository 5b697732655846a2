//! Per-tick motion integration.
//!
//! `calc_move` advances a convoy's speed and position by `delta_t` engine
//! ticks (at most [`MAX_DELTA_T`]) in slices of at most [`DT_SLICE`] ticks.
//! Each slice picks one of three regimes:
//!
//! * **brake** when the convoy is faster than the upcoming limit and either
//!   passed the brake point or would, at the end of the slice, be left with
//!   less room than its braking distance down to the limit;
//! * **accelerate** when it is slower than its target, no faster than the
//!   braking curve of the limit ahead allows;
//! * **hold** otherwise: traction balances drag and resistance, and any
//!   excess speed (target lowered, coasting downhill) is braked away.
//!
//! A braking slice decelerates at the constant rate that meets the limit
//! speed exactly at the limit point, harder where the braking curve demands
//! it, and never harder than the brakes, drag and resistance allow.  A
//! convoy asked to stop closer than it can therefore passes the limit point
//! above the limit speed instead of stopping instantly.
//!
//! Speeds are integrated explicitly; distance is the trapezoid of the slice's
//! start and end speeds.

use cv_core::units::{
    YARDS_PER_VEHICLE_STEP_SHIFT, kmh_to_v, speed_to_v, steps_to_x, ticks_to_secs, v_to_speed,
    x_to_scaled_yards,
};
use cv_core::Fixed;
use tracing::{debug, trace};

use crate::physics::{ConvoyPhysics, speed_index};
use crate::WeightSummary;

/// Longest stretch of engine ticks integrated as one step.
pub const DT_SLICE: i64 = 32;

/// Most engine ticks one `calc_move` call integrates; longer calls are
/// clamped.  At the reference tile size this is 1024 s.
pub const MAX_DELTA_T: i64 = 1 << 16;

/// Bisection steps used to pin an equilibrium speed inside one slice.
const EQUILIBRIUM_BISECTIONS: u32 = 12;

/// Distance in steps that means "no limit ahead".
pub const NO_LIMIT_STEPS: i32 = i32::MAX;

/// What the driver wants from one `calc_move` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRequest {
    /// Engine ticks to integrate.
    pub delta_t:          i64,
    /// Tile length relative to the reference tile.
    pub simtime_factor:   Fixed,
    /// Desired speed, simulation units.
    pub target_speed:     i32,
    /// Speed limit that starts at `steps_til_limit`, simulation units.
    pub next_speed_limit: i32,
    /// Steps from the convoy's head to the limit point.
    pub steps_til_limit:  i32,
    /// Steps from the convoy's head to the point where braking must start.
    pub steps_til_brake:  i32,
}

impl MoveRequest {
    /// Run towards `target_speed` with no limit ahead.
    pub fn cruise(delta_t: i64, simtime_factor: Fixed, target_speed: i32) -> Self {
        Self {
            delta_t,
            simtime_factor,
            target_speed,
            next_speed_limit: target_speed,
            steps_til_limit: NO_LIMIT_STEPS,
            steps_til_brake: NO_LIMIT_STEPS,
        }
    }

    /// Stop at or before a point `steps` ahead.
    pub fn stop_in(delta_t: i64, simtime_factor: Fixed, target_speed: i32, steps: i32) -> Self {
        Self {
            delta_t,
            simtime_factor,
            target_speed,
            next_speed_limit: 0,
            steps_til_limit: steps,
            steps_til_brake: NO_LIMIT_STEPS,
        }
    }

    /// Replace the limit ahead.
    pub fn with_limit(mut self, speed_limit: i32, steps_til_limit: i32, steps_til_brake: i32) -> Self {
        self.next_speed_limit = speed_limit;
        self.steps_til_limit = steps_til_limit;
        self.steps_til_brake = steps_til_brake;
        self
    }
}

/// Speed and accumulated travel of a convoy, in simulation units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    /// Current speed, simulation units.
    pub speed: i32,
    /// Yards travelled, accumulated across calls.  The caller consumes whole
    /// steps from this.
    pub yards: i64,
    /// Part of the integrated speed below one simulation unit, m/s.  Kept so
    /// that gentle accelerations add up across calls.
    pub residue: Fixed,
}

impl MotionState {
    pub fn at_speed(speed: i32) -> Self {
        Self { speed, ..Self::default() }
    }

    /// Overwrite the speed, dropping the sub-unit residue.
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed;
        self.residue = Fixed::ZERO;
    }

    /// Current speed in m/s, including the residue.
    pub fn v(&self) -> Fixed {
        (speed_to_v(self.speed.max(0)) + self.residue).max(Fixed::ZERO)
    }

    /// Take the whole steps out of `yards`, leaving the remainder.
    pub fn take_steps(&mut self) -> i64 {
        let steps = self.yards >> YARDS_PER_VEHICLE_STEP_SHIFT;
        self.yards -= steps << YARDS_PER_VEHICLE_STEP_SHIFT;
        steps
    }
}

pub(crate) fn integrate<P: ConvoyPhysics + ?Sized>(
    convoy:  &mut P,
    request: &MoveRequest,
    weight:  &WeightSummary,
    state:   &mut MotionState,
) {
    if request.delta_t <= 0 {
        return;
    }
    if weight.weight <= 0 {
        state.set_speed(0);
        return;
    }
    if request.delta_t > MAX_DELTA_T {
        debug!(delta_t = request.delta_t, max = MAX_DELTA_T, "calc_move delta_t clamped");
    }
    let stf = request.simtime_factor;
    let mass = Fixed::from(weight.weight);
    let cf = convoy.adverse_summary().cf;
    let frs = convoy.frs(weight);

    let cap = kmh_to_v(convoy.speed_limit_kmh().max(0));
    let wanted = speed_to_v(request.target_speed.max(0)).min(cap);
    let v_limit = speed_to_v(request.next_speed_limit.max(0));
    let limit = LimitAhead {
        x:        steps_to_x(stf, request.steps_til_limit as i64),
        v:        v_limit,
        distance: convoy.braking_distance(weight, v_limit),
    };
    let x_brake = steps_to_x(stf, request.steps_til_brake as i64);

    let mut v = state.v();
    let mut x = Fixed::ZERO;
    let mut remaining = request.delta_t.min(MAX_DELTA_T);

    while remaining > 0 {
        let slice = remaining.min(DT_SLICE);
        remaining -= slice;
        let dt = ticks_to_secs(stf, slice);

        let past_limit = x >= limit.x;
        let past_brake = x >= x_brake;
        let target = if past_limit || past_brake { wanted.min(v_limit) } else { wanted };
        let drag = cf * v * v;

        let candidate = if v < target {
            let net = convoy.get_force(v) - drag - frs;
            let v_next = (v + net / mass * dt).clamp(Fixed::ZERO, target);
            if net.is_positive() {
                settle(convoy, cf, frs, v, v_next)
            } else {
                v_next
            }
        } else if v > target {
            let decel = convoy.braking_force(speed_index(v)) + drag + frs;
            (v - decel / mass * dt).clamp(target, v)
        } else {
            let net = convoy.calc_speed_holding_force(v, frs) - drag - frs;
            (v + net / mass * dt).clamp(Fixed::ZERO, v)
        };

        let fits = past_limit || limit.fits(convoy, weight, x, v, candidate, dt);
        let (v_end, dx) = if !past_limit && v > v_limit && (past_brake || !fits) {
            let decel = (convoy.braking_force(speed_index(v)) + drag + frs) / mass;
            limit.approach(convoy, weight, x, v, decel, dt)
        } else if fits {
            (candidate, (v + candidate).div_int(2) * dt)
        } else {
            // Below the limit: accelerate no further than the curve allows.
            let v_next = limit.fastest_fit(convoy, weight, x, v, v, candidate, dt);
            (v_next, (v + v_next).div_int(2) * dt)
        };
        x += dx;
        v = v_end;
    }

    state.speed = v_to_speed(v);
    state.residue = v - speed_to_v(state.speed);
    state.yards += x_to_scaled_yards(stf, x);
    trace!(speed = state.speed, yards = state.yards, "calc_move");
}

/// The speed limit ahead and its braking curve, in metres from where the
/// call started.
struct LimitAhead {
    x:        Fixed,
    v:        Fixed,
    /// Braking distance from `v` to a standstill.
    distance: Fixed,
}

impl LimitAhead {
    /// `true` if a slice from `(x, v)` ending at `v_next` leaves enough room
    /// to brake down to the limit before the limit point.
    fn fits<P: ConvoyPhysics + ?Sized>(
        &self,
        convoy: &mut P,
        weight: &WeightSummary,
        x:      Fixed,
        v:      Fixed,
        v_next: Fixed,
        dt:     Fixed,
    ) -> bool {
        if v.max(v_next) <= self.v {
            return true;
        }
        let end = x + (v + v_next).div_int(2) * dt;
        let needed = convoy.braking_distance(weight, v_next.max(self.v));
        needed != Fixed::MAX && end + needed <= self.x + self.distance
    }

    /// Highest end speed in `[lo, hi]` that [`fits`][Self::fits], or `lo` if
    /// none does.
    #[allow(clippy::too_many_arguments)]
    fn fastest_fit<P: ConvoyPhysics + ?Sized>(
        &self,
        convoy: &mut P,
        weight: &WeightSummary,
        x:      Fixed,
        v:      Fixed,
        lo:     Fixed,
        hi:     Fixed,
        dt:     Fixed,
    ) -> Fixed {
        if hi <= lo || !self.fits(convoy, weight, x, v, lo, dt) {
            return lo;
        }
        if self.fits(convoy, weight, x, v, hi, dt) {
            return hi;
        }
        let (mut lo, mut hi) = (lo, hi);
        for _ in 0..EQUILIBRIUM_BISECTIONS {
            let mid = (lo + hi).div_int(2);
            if self.fits(convoy, weight, x, v, mid, dt) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// One braking slice towards the limit point, decelerating by at most
    /// `decel` m/s².  Returns the end speed and the distance covered.
    ///
    /// The deceleration is the constant one that meets the limit speed
    /// exactly at the limit point, raised where the braking curve demands
    /// more.  Reaching the limit inside the slice ends it at the limit point
    /// and runs the rest of the slice at the limit speed.
    fn approach<P: ConvoyPhysics + ?Sized>(
        &self,
        convoy: &mut P,
        weight: &WeightSummary,
        x:      Fixed,
        v:      Fixed,
        decel:  Fixed,
        dt:     Fixed,
    ) -> (Fixed, Fixed) {
        let left = self.x - x;
        let needed = (v * v - self.v * self.v) / left.mul_int(2);
        if needed <= decel {
            let until_limit = left.mul_int(2) / (v + self.v);
            if until_limit <= dt {
                return (self.v, left + self.v * (dt - until_limit));
            }
        }

        let firm = (v - decel.max(Fixed::ZERO) * dt).max(self.v);
        let gentle = (v - needed.min(decel).max(Fixed::ZERO) * dt).max(firm);
        let v_next = self.fastest_fit(convoy, weight, x, v, firm, gentle, dt);
        let mut dx = (v + v_next).div_int(2) * dt;
        if needed <= decel {
            // Constant deceleration never reaches the point early; only
            // rounding can.
            debug_assert!(dx - left <= Fixed::ratio(1, 1_000), "overshoot {dx} > {left}");
            dx = dx.min(left);
        } else if dx > left {
            debug!(%v, limit = %self.v, "cannot brake in time; passing limit point");
        }
        (v_next, dx)
    }
}

/// Highest speed in `[v, v_next]` whose traction still covers drag and
/// resistance.  `v` itself must be sustainable.
fn settle<P: ConvoyPhysics + ?Sized>(convoy: &mut P, cf: Fixed, frs: Fixed, v: Fixed, v_next: Fixed) -> Fixed {
    let mut holds = |u: Fixed| convoy.get_force(u) >= cf * u * u + frs;
    if holds(v_next) {
        return v_next;
    }
    let (mut lo, mut hi) = (v, v_next);
    for _ in 0..EQUILIBRIUM_BISECTIONS {
        let mid = (lo + hi).div_int(2);
        if holds(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
