//! Where a convoy's summaries come from.
//!
//! A source knows the convoy's vehicles (and, for live convoys, their
//! positions and loads).  It rebuilds summaries on request and answers the
//! force/brake/power curves directly; [`LazyConvoy`][crate::LazyConvoy]
//! decides when to ask.

use cv_core::PhysicsConfig;
use cv_physics::{AdverseSummary, FreightSummary, VehicleDesc, VehicleSummary, WeightSummary};

pub trait ConvoySource {
    /// Fill `summary`, which arrives cleared.
    fn update_vehicle_summary(&self, summary: &mut VehicleSummary);

    /// Fill `summary`, which arrives cleared.
    fn update_adverse_summary(&self, summary: &mut AdverseSummary);

    /// Fill `summary`, which arrives cleared.
    fn update_freight_summary(&self, summary: &mut FreightSummary);

    /// Total traction in kN at `speed` m/s.
    fn force_summary(&self, speed: u32) -> i32;

    /// Total brake force in kN at `speed` m/s.
    fn brake_summary(&self, speed: u32) -> i32;

    /// Total power in kW at `speed` m/s.
    fn power_summary(&self, speed: u32) -> i32;

    fn current_friction(&self) -> i16;
}

/// A source that knows the actual load and slope of each vehicle.
pub trait LoadedSource: ConvoySource {
    /// Fill `summary`, which arrives cleared.
    fn update_weight_summary(&self, summary: &mut WeightSummary);
}

impl<S: ConvoySource + ?Sized> ConvoySource for &S {
    fn update_vehicle_summary(&self, summary: &mut VehicleSummary) {
        (**self).update_vehicle_summary(summary)
    }

    fn update_adverse_summary(&self, summary: &mut AdverseSummary) {
        (**self).update_adverse_summary(summary)
    }

    fn update_freight_summary(&self, summary: &mut FreightSummary) {
        (**self).update_freight_summary(summary)
    }

    fn force_summary(&self, speed: u32) -> i32 {
        (**self).force_summary(speed)
    }

    fn brake_summary(&self, speed: u32) -> i32 {
        (**self).brake_summary(speed)
    }

    fn power_summary(&self, speed: u32) -> i32 {
        (**self).power_summary(speed)
    }

    fn current_friction(&self) -> i16 {
        (**self).current_friction()
    }
}

impl<S: LoadedSource + ?Sized> LoadedSource for &S {
    fn update_weight_summary(&self, summary: &mut WeightSummary) {
        (**self).update_weight_summary(summary)
    }
}

// ── Curve sums ────────────────────────────────────────────────────────────────
//
// Indices are summed before the gear factor is stripped so that rounding
// happens once per convoy, not once per vehicle.

fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

pub(crate) fn total_force<'v, D: VehicleDesc + ?Sized + 'v>(
    vehicles: impl IntoIterator<Item = &'v D>,
    speed:    u32,
    config:   &PhysicsConfig,
) -> i32 {
    let index = vehicles.into_iter().map(|v| v.force_index(speed)).fold(0i64, i64::saturating_add);
    saturate_i32(config.power_index_to_power(index))
}

pub(crate) fn total_power<'v, D: VehicleDesc + ?Sized + 'v>(
    vehicles: impl IntoIterator<Item = &'v D>,
    speed:    u32,
    config:   &PhysicsConfig,
) -> i32 {
    let index = vehicles.into_iter().map(|v| v.power_index(speed)).fold(0i64, i64::saturating_add);
    saturate_i32(config.power_index_to_power(index))
}

pub(crate) fn total_brake<'v, D: VehicleDesc + ?Sized + 'v>(
    vehicles: impl IntoIterator<Item = &'v D>,
    speed:    u32,
) -> i32 {
    saturate_i32(vehicles.into_iter().map(|v| v.brake_force(speed)).fold(0i64, i64::saturating_add))
}
