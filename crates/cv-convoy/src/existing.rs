//! `ExistingConvoy` — a live convoy standing somewhere on the map.
//!
//! The convoy entity itself (vehicle list, positions, loads) belongs to the
//! caller.  `ExistingConvoy` borrows it for the duration of one physics
//! update and reads each vehicle's descriptor, gross weight and the way it
//! stands on.

use cv_core::PhysicsConfig;
use cv_physics::{AdverseSummary, FreightSummary, VehicleDesc, VehicleSummary, WayContext, WeightSummary};

use crate::source::{total_brake, total_force, total_power};
use crate::{ConvoyError, ConvoyResult, ConvoySource, LoadedSource};

/// One vehicle of a live convoy.
pub trait LiveVehicle {
    type Desc: VehicleDesc + ?Sized;

    fn desc(&self) -> &Self::Desc;

    /// Unladen weight plus the current load, kg.
    fn gross_weight_kg(&self) -> i32;

    /// The way under this vehicle.
    fn way_context(&self) -> WayContext;

    /// `1000 · sin(slope)` plus base friction under this vehicle.
    fn friction_factor(&self) -> i16 {
        self.way_context().friction
    }
}

/// A live convoy: an ordered vehicle list, front first.
pub trait ConvoyEntity {
    type Vehicle: LiveVehicle;

    fn vehicles(&self) -> &[Self::Vehicle];
}

/// Non-owning view of a [`ConvoyEntity`] that feeds a
/// [`LazyConvoy`][crate::LazyConvoy].
#[derive(Debug)]
pub struct ExistingConvoy<'a, C> {
    entity: &'a C,
    config: PhysicsConfig,
}

impl<C> Clone for ExistingConvoy<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ExistingConvoy<'_, C> {}

impl<'a, C: ConvoyEntity> ExistingConvoy<'a, C> {
    /// # Errors
    ///
    /// [`ConvoyError::Empty`] if the entity has no vehicles.
    pub fn new(entity: &'a C, config: PhysicsConfig) -> ConvoyResult<Self> {
        if entity.vehicles().is_empty() {
            return Err(ConvoyError::Empty);
        }
        Ok(Self { entity, config })
    }

    #[inline]
    pub fn entity(&self) -> &'a C {
        self.entity
    }
}

fn descs<C: ConvoyEntity>(entity: &C) -> impl Iterator<Item = &<C::Vehicle as LiveVehicle>::Desc> {
    entity.vehicles().iter().map(LiveVehicle::desc)
}

impl<C: ConvoyEntity> ConvoySource for ExistingConvoy<'_, C> {
    fn update_vehicle_summary(&self, summary: &mut VehicleSummary) {
        for d in descs(self.entity) {
            summary.add_vehicle(d);
        }
        summary.update_summary(descs(self.entity).last().map_or(0, |d| d.length()));
    }

    fn update_adverse_summary(&self, summary: &mut AdverseSummary) {
        for v in self.entity.vehicles() {
            summary.add_vehicle(&v.way_context(), v.desc().is_electric());
        }
    }

    fn update_freight_summary(&self, summary: &mut FreightSummary) {
        for d in descs(self.entity) {
            summary.add_vehicle(d);
        }
    }

    fn force_summary(&self, speed: u32) -> i32 {
        total_force(descs(self.entity), speed, &self.config)
    }

    fn brake_summary(&self, speed: u32) -> i32 {
        total_brake(descs(self.entity), speed)
    }

    fn power_summary(&self, speed: u32) -> i32 {
        total_power(descs(self.entity), speed, &self.config)
    }

    /// The front vehicle's friction.
    fn current_friction(&self) -> i16 {
        self.entity.vehicles().first().map_or(0, LiveVehicle::friction_factor)
    }
}

impl<C: ConvoyEntity> LoadedSource for ExistingConvoy<'_, C> {
    fn update_weight_summary(&self, summary: &mut WeightSummary) {
        for v in self.entity.vehicles() {
            summary.add_weight(v.gross_weight_kg(), v.friction_factor() as i32);
        }
    }
}
