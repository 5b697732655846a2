//! Explicit per-summary validity.

use cv_core::Fixed;
use cv_physics::{AdverseSummary, FreightSummary, VehicleSummary, WeightSummary};

/// A memoized value: either stale or known.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Cached<T> {
    #[default]
    Invalid,
    Valid(T),
}

impl<T: Copy> Cached<T> {
    #[inline]
    pub fn get(&self) -> Option<T> {
        match *self {
            Cached::Valid(v) => Some(v),
            Cached::Invalid => None,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Cached::Valid(_))
    }

    #[inline]
    pub fn invalidate(&mut self) {
        *self = Cached::Invalid;
    }

    /// The cached value, computing and storing it first if stale.
    #[inline]
    pub fn get_or_insert_with(&mut self, compute: impl FnOnce() -> T) -> T {
        match *self {
            Cached::Valid(v) => v,
            Cached::Invalid => {
                let v = compute();
                *self = Cached::Valid(v);
                v
            }
        }
    }
}

/// Every value a [`LazyConvoy`][crate::LazyConvoy] memoizes.
///
/// Invalidation cascades to everything derived from the invalidated value:
///
/// ```text
/// vehicle ─┬─ adverse ── weight
///          ├─ freight
///          ├─ starting_force
///          └─ continuous_power
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvoyCache {
    pub vehicle:          Cached<VehicleSummary>,
    pub adverse:          Cached<AdverseSummary>,
    pub freight:          Cached<FreightSummary>,
    pub weight:           Cached<WeightSummary>,
    pub starting_force:   Cached<Fixed>,
    pub continuous_power: Cached<Fixed>,
}

impl ConvoyCache {
    /// The vehicle list changed: everything is stale.
    pub fn invalidate_vehicle_summary(&mut self) {
        self.vehicle.invalidate();
        self.freight.invalidate();
        self.starting_force.invalidate();
        self.continuous_power.invalidate();
        self.invalidate_adverse_summary();
    }

    /// The convoy moved onto different way.
    pub fn invalidate_adverse_summary(&mut self) {
        self.adverse.invalidate();
        self.invalidate_weight_summary();
    }

    pub fn invalidate_freight_summary(&mut self) {
        self.freight.invalidate();
    }

    /// Load or slope changed.
    pub fn invalidate_weight_summary(&mut self) {
        self.weight.invalidate();
    }

    /// Number of values currently valid.
    pub fn valid_count(&self) -> usize {
        [
            self.vehicle.is_valid(),
            self.adverse.is_valid(),
            self.freight.is_valid(),
            self.weight.is_valid(),
            self.starting_force.is_valid(),
            self.continuous_power.is_valid(),
        ]
        .into_iter()
        .filter(|&v| v)
        .count()
    }
}
