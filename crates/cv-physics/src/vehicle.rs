//! Vehicle descriptors: the read-only catalog data a convoy is built from.
//!
//! The physics core never sees these.  Convoy sources reduce them into
//! summaries and force/power curves (see `cv-convoy`).

use cv_core::units::GEAR_FACTOR;
use cv_core::WayType;

use crate::{AdverseSummary, PhysicsError, PhysicsResult};

/// Per-unit weight range of the good a vehicle carries.
///
/// Several freights of one category may weigh differently (coal vs. ore in a
/// bulk wagon), so a vehicle's load is only known as a range until it is
/// actually loaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreightRange {
    /// Lightest possible weight of one unit, in kg.
    pub min_kg: u32,
    /// Heaviest possible weight of one unit, in kg.
    pub max_kg: u32,
}

impl FreightRange {
    #[inline]
    pub fn new(min_kg: u32, max_kg: u32) -> Self {
        Self { min_kg, max_kg }
    }

    /// A good whose units always weigh the same.
    #[inline]
    pub fn fixed(kg: u32) -> Self {
        Self { min_kg: kg, max_kg: kg }
    }
}

/// Read accessors the convoy sources need from a vehicle descriptor.
///
/// Implemented by [`VehicleSpec`]; applications with their own catalog
/// types implement it directly.
pub trait VehicleDesc {
    /// The way this vehicle is built for.
    fn way_type(&self) -> WayType;

    /// Length in car units (`CARUNITS_PER_TILE` per tile).
    fn length(&self) -> u8;

    /// Unladen weight in tonnes.
    fn weight_t(&self) -> u32;

    /// Rated top speed in km/h.
    fn max_speed_kmh(&self) -> i32;

    /// Gear ratio, `GEAR_FACTOR` (64) meaning 1.0.
    fn gear(&self) -> u16;

    /// Freight units the vehicle can carry.
    fn capacity(&self) -> u32 {
        0
    }

    /// Weight range of one unit of the carried good, if any.
    fn freight(&self) -> Option<FreightRange> {
        None
    }

    /// `true` if the engine needs electrified way to run.
    fn is_electric(&self) -> bool {
        false
    }

    /// Effective traction force index (kN × gear) at `speed` m/s.
    fn force_index(&self, speed: u32) -> i64;

    /// Effective power index (kW × gear) at `speed` m/s.
    fn power_index(&self, speed: u32) -> i64;

    /// Brake force in kN at `speed` m/s.
    ///
    /// The default brakes the vehicle's own mass at the way type's brake
    /// scale (m/s²).
    fn brake_force(&self, _speed: u32) -> i64 {
        default_brake_force(self.way_type(), self.weight_t())
    }
}

impl<D: VehicleDesc + ?Sized> VehicleDesc for &D {
    fn way_type(&self) -> WayType { (**self).way_type() }
    fn length(&self) -> u8 { (**self).length() }
    fn weight_t(&self) -> u32 { (**self).weight_t() }
    fn max_speed_kmh(&self) -> i32 { (**self).max_speed_kmh() }
    fn gear(&self) -> u16 { (**self).gear() }
    fn capacity(&self) -> u32 { (**self).capacity() }
    fn freight(&self) -> Option<FreightRange> { (**self).freight() }
    fn is_electric(&self) -> bool { (**self).is_electric() }
    fn force_index(&self, speed: u32) -> i64 { (**self).force_index(speed) }
    fn power_index(&self, speed: u32) -> i64 { (**self).power_index(speed) }
    fn brake_force(&self, speed: u32) -> i64 { (**self).brake_force(speed) }
}

// ── VehicleSpec ───────────────────────────────────────────────────────────────

/// A catalog entry: one vehicle type with a constant-power engine (or none).
///
/// Traction follows the usual hyperbola: the tractive effort up to the speed
/// where the engine's power runs out, `power / speed` above it.  With no
/// rated tractive effort the starting force is derived from the power at
/// [`V_MIN`][cv_core::units::V_MIN].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleSpec {
    pub name:               String,
    pub way:                WayType,
    /// Car units; 8 is half a tile.
    pub length:             u8,
    pub weight_t:           u32,
    pub max_speed_kmh:      i32,
    pub power_kw:           u32,
    /// Rated starting tractive effort in kN; 0 means "derive from power".
    pub tractive_effort_kn: u32,
    pub gear:               u16,
    pub capacity:           u32,
    pub freight:            Option<FreightRange>,
    pub electric:           bool,
    /// Rated brake force in kN; `None` uses the way type's brake scale.
    pub brake_force_kn:     Option<u32>,
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self {
            name:               String::new(),
            way:                WayType::Road,
            length:             8,
            weight_t:           1,
            max_speed_kmh:      100,
            power_kw:           0,
            tractive_effort_kn: 0,
            gear:               GEAR_FACTOR as u16,
            capacity:           0,
            freight:            None,
            electric:           false,
            brake_force_kn:     None,
        }
    }
}

impl VehicleSpec {
    /// A powered vehicle without cargo space.
    pub fn engine(
        name:          impl Into<String>,
        way:           WayType,
        weight_t:      u32,
        max_speed_kmh: i32,
        power_kw:      u32,
    ) -> Self {
        Self {
            name: name.into(),
            way,
            weight_t,
            max_speed_kmh,
            power_kw,
            ..Default::default()
        }
    }

    /// An unpowered vehicle carrying `capacity` units of a good.
    pub fn wagon(
        name:          impl Into<String>,
        way:           WayType,
        weight_t:      u32,
        max_speed_kmh: i32,
        capacity:      u32,
        freight:       FreightRange,
    ) -> Self {
        Self {
            name: name.into(),
            way,
            weight_t,
            max_speed_kmh,
            capacity,
            freight: Some(freight),
            ..Default::default()
        }
    }

    pub fn with_tractive_effort(mut self, kn: u32) -> Self {
        self.tractive_effort_kn = kn;
        self
    }

    pub fn with_gear(mut self, gear: u16) -> Self {
        self.gear = gear;
        self
    }

    pub fn with_length(mut self, length: u8) -> Self {
        self.length = length;
        self
    }

    pub fn with_brake_force(mut self, kn: u32) -> Self {
        self.brake_force_kn = Some(kn);
        self
    }

    pub fn electric(mut self) -> Self {
        self.electric = true;
        self
    }

    /// `true` if the vehicle contributes traction.
    #[inline]
    pub fn is_powered(&self) -> bool {
        self.power_kw > 0 || self.tractive_effort_kn > 0
    }

    /// Starting tractive effort in kN before the gear is applied.
    fn starting_effort_kn(&self) -> i64 {
        if self.tractive_effort_kn > 0 {
            self.tractive_effort_kn as i64
        } else {
            // power / V_MIN, with V_MIN = 4 km/h = 10/9 m/s
            self.power_kw as i64 * 9 / 10
        }
    }

    /// Reject catalog entries that would break the physics invariants.
    pub fn validate(&self) -> PhysicsResult<()> {
        if self.weight_t == 0 {
            return Err(PhysicsError::ZeroWeight(self.name.clone()));
        }
        if self.max_speed_kmh <= 0 {
            return Err(PhysicsError::TopSpeed { name: self.name.clone(), kmh: self.max_speed_kmh });
        }
        if self.is_powered() && self.gear == 0 {
            return Err(PhysicsError::ZeroGear(self.name.clone()));
        }
        if let Some(range) = self.freight {
            if range.min_kg > range.max_kg {
                return Err(PhysicsError::FreightRange {
                    name: self.name.clone(),
                    min:  range.min_kg,
                    max:  range.max_kg,
                });
            }
        }
        Ok(())
    }
}

impl VehicleDesc for VehicleSpec {
    fn way_type(&self) -> WayType {
        self.way
    }

    fn length(&self) -> u8 {
        self.length
    }

    fn weight_t(&self) -> u32 {
        self.weight_t
    }

    fn max_speed_kmh(&self) -> i32 {
        self.max_speed_kmh
    }

    fn gear(&self) -> u16 {
        self.gear
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn freight(&self) -> Option<FreightRange> {
        self.freight
    }

    fn is_electric(&self) -> bool {
        self.electric
    }

    fn force_index(&self, speed: u32) -> i64 {
        if !self.is_powered() {
            return 0;
        }
        let gear = self.gear as i64;
        let effort = self.starting_effort_kn() * gear;
        if speed == 0 {
            effort
        } else {
            effort.min(self.power_kw as i64 * gear / speed as i64)
        }
    }

    fn power_index(&self, _speed: u32) -> i64 {
        self.power_kw as i64 * self.gear as i64
    }

    fn brake_force(&self, _speed: u32) -> i64 {
        match self.brake_force_kn {
            Some(kn) => kn as i64,
            None => default_brake_force(self.way, self.weight_t),
        }
    }
}

/// Brake force in kN of `weight_t` tonnes braked at `way`'s brake scale.
#[inline]
pub fn default_brake_force(way: WayType, weight_t: u32) -> i64 {
    AdverseSummary::for_way(way).br.mul_int(weight_t as i64).round()
}
