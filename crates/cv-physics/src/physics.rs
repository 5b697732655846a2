//! The physics core shared by every convoy variant.
//!
//! [`ConvoyPhysics`] has six required accessors (the summaries and the
//! force/brake/power curves) and builds everything else on top of them:
//! equilibrium speed, weight limits, braking distance and motion
//! integration.  A variant only decides where the summaries come from.
//!
//! All forces are in N, speeds in m/s, weights in kg, distances in m.

use cv_core::units::{
    V_MIN, WEIGHT_UNLIMITED, YARDS_PER_VEHICLE_STEP_SHIFT, kmh_to_v, speed_to_v,
    x_to_scaled_yards,
};
use cv_core::Fixed;
use tracing::debug;

use crate::motion::{self, MotionState, MoveRequest};
use crate::{AdverseSummary, VehicleSummary, WeightSummary};

/// Gravitational acceleration, m/s².
pub const G_ACCEL: Fixed = Fixed::ratio(981, 100);

/// Upper bound on the trial speeds of the coarse scan in
/// [`ConvoyPhysics::calc_max_speed`].
pub const MAX_SPEED_COARSE_STEPS: i32 = 64;

/// Width of one speed bin of the braking-distance integral, m/s.
pub const BRAKE_BIN: Fixed = Fixed::HALF;

/// Speeds above `BRAKE_BIN · MAX_BRAKE_BINS` are integrated as that speed.
pub const MAX_BRAKE_BINS: i64 = 4096;

/// Whole m/s used to look up force, brake and power curves.
#[inline]
pub fn speed_index(v: Fixed) -> u32 {
    v.abs().trunc().min(u32::MAX as i64) as u32
}

#[inline]
fn kn_to_newton(kn: i32) -> Fixed {
    Fixed::from_int(kn as i64).mul_int(1000)
}

pub trait ConvoyPhysics {
    // ── Required ──────────────────────────────────────────────────────────

    fn vehicle_summary(&mut self) -> VehicleSummary;

    fn adverse_summary(&mut self) -> AdverseSummary;

    /// Total traction in kN at `speed` m/s.
    fn force_summary(&mut self, speed: u32) -> i32;

    /// Total brake force in kN at `speed` m/s.
    fn brake_summary(&mut self, speed: u32) -> i32;

    /// Total power in kW at `speed` m/s.
    fn power_summary(&mut self, speed: u32) -> i32;

    /// `1000 · sin(slope)` plus base friction under the convoy's head.
    fn current_friction(&mut self) -> i16;

    // ── Overridable for caching ───────────────────────────────────────────

    /// Traction at standstill, N.
    fn starting_force(&mut self) -> Fixed {
        kn_to_newton(self.force_summary(0))
    }

    /// Power at the convoy's top speed, W.
    fn continuous_power(&mut self) -> Fixed {
        let cap = self.vehicle_summary().max_speed;
        let v = kmh_to_v(cap);
        Fixed::from_int(self.power_summary(speed_index(v)) as i64).mul_int(1000)
    }

    /// Brake force at `speed` m/s, N.
    fn braking_force(&mut self, speed: u32) -> Fixed {
        kn_to_newton(self.brake_summary(speed))
    }

    // ── Provided ──────────────────────────────────────────────────────────

    /// Traction at `v`, N.
    fn get_force(&mut self, v: Fixed) -> Fixed {
        match speed_index(v) {
            0 => self.starting_force(),
            speed => kn_to_newton(self.force_summary(speed)),
        }
    }

    /// Rolling resistance plus downhill force of `weight`, N.  Negative
    /// when gravity pulls the convoy forward harder than it rolls.
    fn frs(&mut self, weight: &WeightSummary) -> Fixed {
        let fr = self.adverse_summary().fr;
        G_ACCEL * (fr * weight.weight_cos + weight.weight_sin)
    }

    /// The part of the traction needed to hold `v` against air drag and
    /// `frs`, capped at the traction available.
    fn calc_speed_holding_force(&mut self, v: Fixed, frs: Fixed) -> Fixed {
        let cf = self.adverse_summary().cf;
        self.get_force(v).min(cf * v * v + frs)
    }

    /// Lower of the rated and way speed limit, km/h.
    fn speed_limit_kmh(&mut self) -> i32 {
        self.vehicle_summary().max_speed.min(self.adverse_summary().max_speed)
    }

    /// Highest whole km/h at which traction still covers drag and
    /// resistance of `weight`, capped by the speed limit.
    ///
    /// Returns 0 if the convoy cannot even start.
    fn calc_max_speed(&mut self, weight: &WeightSummary) -> i32 {
        let cap = self.speed_limit_kmh();
        if cap <= 0 {
            return 0;
        }
        if self.vehicle_summary().is_empty() {
            return cap;
        }
        let frs = self.frs(weight);
        if frs > self.starting_force() {
            debug!(weight = weight.weight, "convoy too heavy to start");
            return 0;
        }
        let cf = self.adverse_summary().cf;

        let step = (cap / MAX_SPEED_COARSE_STEPS).max(1);
        let mut sustained = 0;
        let failed = loop {
            let trial = (sustained + step).min(cap);
            if !sustains(self, trial, cf, frs) {
                break trial;
            }
            if trial >= cap {
                return cap;
            }
            sustained = trial;
        };
        (sustained + 1..failed)
            .find(|&kmh| !sustains(self, kmh, cf, frs))
            .map_or(failed - 1, |kmh| kmh - 1)
    }

    /// Heaviest gross weight in kg the starting force can get moving on a
    /// slope of `sin_alpha / 1000`.
    fn calc_max_starting_weight(&mut self, sin_alpha: i32) -> i32 {
        let per_tonne = resistance_per_tonne(self, sin_alpha);
        if !per_tonne.is_positive() {
            return WEIGHT_UNLIMITED;
        }
        let force = self.starting_force();
        tonnes_to_weight(force / per_tonne)
    }

    /// Heaviest gross weight in kg the convoy can pull at its speed limit
    /// on a slope of `sin_alpha / 1000`, never more than it can start.
    fn calc_max_weight(&mut self, sin_alpha: i32) -> i32 {
        let per_tonne = resistance_per_tonne(self, sin_alpha);
        if !per_tonne.is_positive() {
            return WEIGHT_UNLIMITED;
        }
        let v = kmh_to_v(self.speed_limit_kmh()).max(V_MIN);
        let cf = self.adverse_summary().cf;
        let traction = (self.continuous_power() / v).min(self.get_force(v));
        let available = traction - cf * v * v;
        let moving = tonnes_to_weight(available / per_tonne);
        moving.min(self.calc_max_starting_weight(sin_alpha))
    }

    /// Distance in m needed to brake `weight` from `v` to a standstill.
    ///
    /// The deceleration of each [`BRAKE_BIN`] is evaluated at the bin's
    /// lower speed and the distance at the upper end of the part integrated,
    /// which overestimates.
    /// [`Fixed::MAX`] if brakes, drag and resistance together cannot slow
    /// the convoy down.
    fn braking_distance(&mut self, weight: &WeightSummary, v: Fixed) -> Fixed {
        if !v.is_positive() || weight.weight <= 0 {
            return Fixed::ZERO;
        }
        let mass = Fixed::from(weight.weight);
        let frs = self.frs(weight);
        let cf = self.adverse_summary().cf;
        let cap = BRAKE_BIN.mul_int(MAX_BRAKE_BINS);
        if v > cap {
            debug!(%v, bins = MAX_BRAKE_BINS, "braking integral capped");
        }
        let v = v.min(cap);

        let mut x = Fixed::ZERO;
        let mut lo = Fixed::ZERO;
        while lo < v {
            let hi = lo + BRAKE_BIN;
            let width = hi.min(v) - lo;
            let decel = self.braking_force(speed_index(lo)) + cf * lo * lo + frs;
            if !decel.is_positive() {
                return Fixed::MAX;
            }
            x += width * hi.min(v) * mass / decel;
            lo = hi;
        }
        x
    }

    /// [`braking_distance`][Self::braking_distance] rounded up to whole m.
    fn calc_min_braking_distance(&mut self, weight: &WeightSummary, v: Fixed) -> i32 {
        let x = self.braking_distance(weight, v);
        if x == Fixed::MAX {
            return i32::MAX;
        }
        x.ceil().clamp(0, i32::MAX as i64) as i32
    }

    /// Braking distance from simulation speed `speed`, rounded up to whole
    /// steps on a map scaled by `simtime_factor`.
    fn calc_min_braking_distance_steps(
        &mut self,
        simtime_factor: Fixed,
        weight:         &WeightSummary,
        speed:          i32,
    ) -> i32 {
        let x = self.braking_distance(weight, speed_to_v(speed));
        if x == Fixed::MAX {
            return i32::MAX;
        }
        let yards = x_to_scaled_yards(simtime_factor, x);
        let step = 1i64 << YARDS_PER_VEHICLE_STEP_SHIFT;
        ((yards + step - 1) >> YARDS_PER_VEHICLE_STEP_SHIFT).clamp(0, i32::MAX as i64) as i32
    }

    /// Advance `state` by `request.delta_t` engine ticks.
    ///
    /// See [`motion`] for the integration scheme.
    fn calc_move(&mut self, request: &MoveRequest, weight: &WeightSummary, state: &mut MotionState) {
        motion::integrate(self, request, weight, state);
    }
}

/// `true` if traction at `kmh` covers drag and `frs`.
fn sustains<P: ConvoyPhysics + ?Sized>(convoy: &mut P, kmh: i32, cf: Fixed, frs: Fixed) -> bool {
    let v = kmh_to_v(kmh);
    convoy.get_force(v) >= cf * v * v + frs
}

/// Resistance of one tonne on a slope of `sin_alpha / 1000`, N.
fn resistance_per_tonne<P: ConvoyPhysics + ?Sized>(convoy: &mut P, sin_alpha: i32) -> Fixed {
    convoy.frs(&WeightSummary::new(1000, sin_alpha))
}

fn tonnes_to_weight(tonnes: Fixed) -> i32 {
    if !tonnes.is_positive() {
        return 0;
    }
    tonnes.mul_int(1000).floor().min(WEIGHT_UNLIMITED as i64) as i32
}
