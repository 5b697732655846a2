//! `cv-physics` — the convoy performance model.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`vehicle`] | `VehicleDesc` trait, `VehicleSpec` catalog entry, `FreightRange`  |
//! | [`summary`] | `VehicleSummary`, `AdverseSummary`, `FreightSummary`, `WeightSummary`, `WayContext` |
//! | [`physics`] | `ConvoyPhysics` — speed, weight, braking computations            |
//! | [`motion`]  | `MoveRequest`, `MotionState`, the `calc_move` integrator          |
//! | [`error`]   | `PhysicsError`, `PhysicsResult<T>`                                |
//!
//! # Model
//!
//! A convoy is reduced to a handful of aggregates: drag coefficient `cf`,
//! rolling resistance `fr`, the weight split along the slope, and the
//! summed force/brake/power curves of its vehicles.  Every result follows
//! from `F = m·a` with
//!
//! ```text
//! resistance(v) = cf·v² + g·(fr·Σm·cos α + Σm·sin α)
//! ```
//!
//! All arithmetic is fixed-point ([`cv_core::Fixed`]), so two machines
//! computing the same convoy get bit-identical results.

pub mod error;
pub mod motion;
pub mod physics;
pub mod summary;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{PhysicsError, PhysicsResult};
pub use motion::{DT_SLICE, MAX_DELTA_T, MotionState, MoveRequest, NO_LIMIT_STEPS};
pub use physics::{ConvoyPhysics, G_ACCEL, speed_index};
pub use summary::{AdverseSummary, FreightSummary, VehicleSummary, WayContext, WeightSummary};
pub use vehicle::{FreightRange, VehicleDesc, VehicleSpec, default_brake_force};
