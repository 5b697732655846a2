//! `PotentialConvoy` — a consist that exists only on paper.
//!
//! Used by planning tools ("how fast would these vehicles go with a full
//! load up a 2 % grade?").  There is no position: the adverse profile is the
//! first vehicle's way type without any way speed limit, and weight queries
//! take an explicit weight.

use std::borrow::Cow;

use cv_core::PhysicsConfig;
use cv_physics::{AdverseSummary, FreightSummary, VehicleDesc, VehicleSummary};

use crate::source::{total_brake, total_force, total_power};
use crate::{ConvoySource, LazyConvoy};

/// An ordered list of vehicle descriptors, borrowed or owned.
#[derive(Clone, Debug)]
pub struct PotentialConvoy<'a, D> {
    vehicles: Cow<'a, [&'a D]>,
    config:   PhysicsConfig,
}

impl<'a, D: VehicleDesc> PotentialConvoy<'a, D> {
    pub fn new(vehicles: Vec<&'a D>, config: PhysicsConfig) -> Self {
        Self { vehicles: Cow::Owned(vehicles), config }
    }

    /// Plan over a list the caller already holds.
    pub fn borrowed(vehicles: &'a [&'a D], config: PhysicsConfig) -> Self {
        Self { vehicles: Cow::Borrowed(vehicles), config }
    }

    /// One vehicle on its own.
    pub fn single(desc: &'a D, config: PhysicsConfig) -> Self {
        Self::new(vec![desc], config)
    }

    /// Wrap in a fresh cache.
    pub fn lazy(self) -> LazyConvoy<Self> {
        LazyConvoy::new(self)
    }

    #[inline]
    pub fn vehicles(&self) -> &[&'a D] {
        &self.vehicles
    }

    /// Edit the list in place (copying it first if borrowed).  Invalidate
    /// the vehicle summary of the wrapping [`LazyConvoy`] afterwards.
    pub fn vehicles_mut(&mut self) -> &mut Vec<&'a D> {
        self.vehicles.to_mut()
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }
}

impl<D: VehicleDesc> ConvoySource for PotentialConvoy<'_, D> {
    fn update_vehicle_summary(&self, summary: &mut VehicleSummary) {
        for v in self.vehicles.iter() {
            summary.add_vehicle(*v);
        }
        summary.update_summary(self.vehicles.last().map_or(0, |v| v.length()));
    }

    fn update_adverse_summary(&self, summary: &mut AdverseSummary) {
        if let Some(first) = self.vehicles.first() {
            summary.set_by_waytype(first.way_type());
        }
    }

    fn update_freight_summary(&self, summary: &mut FreightSummary) {
        for v in self.vehicles.iter() {
            summary.add_vehicle(*v);
        }
    }

    fn force_summary(&self, speed: u32) -> i32 {
        total_force(self.vehicles.iter().copied(), speed, &self.config)
    }

    fn brake_summary(&self, speed: u32) -> i32 {
        total_brake(self.vehicles.iter().copied(), speed)
    }

    fn power_summary(&self, speed: u32) -> i32 {
        total_power(self.vehicles.iter().copied(), speed, &self.config)
    }

    fn current_friction(&self) -> i16 {
        self.vehicles.first().map_or(0, |v| v.way_type().base_friction())
    }
}
