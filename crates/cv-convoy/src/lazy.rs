//! `LazyConvoy` — the caching decorator every convoy variant runs through.

use cv_core::units::kmh_to_v;
use cv_core::Fixed;
use cv_physics::{
    AdverseSummary, ConvoyPhysics, FreightSummary, MotionState, MoveRequest, VehicleSummary,
    WeightSummary, speed_index,
};
use tracing::trace;

use crate::{ConvoyCache, ConvoySource, LoadedSource};

/// Memoizes a source's summaries and implements [`ConvoyPhysics`] on top.
///
/// Getters validate synchronously: a stale value is rebuilt from the source
/// on first use and then served from the cache until invalidated.  The
/// cache survives [`into_parts`][Self::into_parts] /
/// [`from_parts`][Self::from_parts], so a driver can keep it across ticks
/// while borrowing its live entity only for the duration of one update.
#[derive(Clone, Debug)]
pub struct LazyConvoy<S> {
    source: S,
    cache:  ConvoyCache,
}

impl<S: ConvoySource> LazyConvoy<S> {
    /// Wrap `source` with an empty cache.
    pub fn new(source: S) -> Self {
        Self::from_parts(source, ConvoyCache::default())
    }

    pub fn from_parts(source: S, cache: ConvoyCache) -> Self {
        Self { source, cache }
    }

    pub fn into_parts(self) -> (S, ConvoyCache) {
        (self.source, self.cache)
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source.  Invalidate whatever the change affects.
    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[inline]
    pub fn cache(&self) -> &ConvoyCache {
        &self.cache
    }

    pub fn invalidate_vehicle_summary(&mut self) {
        self.cache.invalidate_vehicle_summary();
    }

    pub fn invalidate_adverse_summary(&mut self) {
        self.cache.invalidate_adverse_summary();
    }

    pub fn invalidate_freight_summary(&mut self) {
        self.cache.invalidate_freight_summary();
    }

    pub fn freight_summary(&mut self) -> FreightSummary {
        let source = &self.source;
        self.cache.freight.get_or_insert_with(|| {
            let mut summary = FreightSummary::default();
            source.update_freight_summary(&mut summary);
            trace!(max_kg = summary.max_freight_weight, "freight summary recomputed");
            summary
        })
    }

    /// A weight summary for `kgs` standing where the source's friction says.
    pub fn weight_at(&mut self, kgs: i32) -> WeightSummary {
        WeightSummary::new(kgs, self.source.current_friction() as i32)
    }

    /// Unladen weight plus `load_kg`, as a weight summary.
    pub fn weight_with_load(&mut self, load_kg: i32) -> WeightSummary {
        let empty = self.vehicle_summary().weight;
        self.weight_at(empty.saturating_add(load_kg))
    }
}

impl<S: ConvoySource> ConvoyPhysics for LazyConvoy<S> {
    fn vehicle_summary(&mut self) -> VehicleSummary {
        let source = &self.source;
        self.cache.vehicle.get_or_insert_with(|| {
            let mut summary = VehicleSummary::default();
            source.update_vehicle_summary(&mut summary);
            trace!(vehicles = summary.count, "vehicle summary recomputed");
            summary
        })
    }

    fn adverse_summary(&mut self) -> AdverseSummary {
        let source = &self.source;
        self.cache.adverse.get_or_insert_with(|| {
            let mut summary = AdverseSummary::default();
            source.update_adverse_summary(&mut summary);
            trace!(max_speed = summary.max_speed, "adverse summary recomputed");
            summary
        })
    }

    fn force_summary(&mut self, speed: u32) -> i32 {
        self.source.force_summary(speed)
    }

    fn brake_summary(&mut self, speed: u32) -> i32 {
        self.source.brake_summary(speed)
    }

    fn power_summary(&mut self, speed: u32) -> i32 {
        self.source.power_summary(speed)
    }

    fn current_friction(&mut self) -> i16 {
        self.source.current_friction()
    }

    fn starting_force(&mut self) -> Fixed {
        let source = &self.source;
        self.cache.starting_force.get_or_insert_with(|| {
            let force = Fixed::from_int(source.force_summary(0) as i64).mul_int(1000);
            trace!(%force, "starting force recomputed");
            force
        })
    }

    fn continuous_power(&mut self) -> Fixed {
        if let Some(power) = self.cache.continuous_power.get() {
            return power;
        }
        let top = kmh_to_v(self.vehicle_summary().max_speed);
        let power = Fixed::from_int(self.source.power_summary(speed_index(top)) as i64).mul_int(1000);
        trace!(%power, "continuous power recomputed");
        self.cache.continuous_power.get_or_insert_with(|| power)
    }
}

impl<S: LoadedSource> LazyConvoy<S> {
    /// Actual gross weight split along the slopes under each vehicle.
    pub fn weight_summary(&mut self) -> WeightSummary {
        let source = &self.source;
        self.cache.weight.get_or_insert_with(|| {
            let mut summary = WeightSummary::default();
            source.update_weight_summary(&mut summary);
            trace!(weight = summary.weight, "weight summary recomputed");
            summary
        })
    }

    pub fn invalidate_weight_summary(&mut self) {
        self.cache.invalidate_weight_summary();
    }

    /// Equilibrium speed in km/h at the current load and position.
    pub fn max_speed(&mut self) -> i32 {
        let weight = self.weight_summary();
        self.calc_max_speed(&weight)
    }

    /// Braking distance in steps from simulation speed `speed` at the
    /// current load and position.
    pub fn braking_distance_steps(&mut self, simtime_factor: Fixed, speed: i32) -> i32 {
        let weight = self.weight_summary();
        self.calc_min_braking_distance_steps(simtime_factor, &weight, speed)
    }

    /// Advance `state` with the current weight summary.
    pub fn move_convoy(&mut self, request: &MoveRequest, state: &mut MotionState) {
        let weight = self.weight_summary();
        self.calc_move(request, &weight, state);
    }
}
