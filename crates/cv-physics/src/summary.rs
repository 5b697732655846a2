//! Aggregate value records the physics core reads instead of vehicle lists.
//!
//! Each summary is a plain `Copy` record built by clearing it and adding the
//! convoy's vehicles one at a time.  The convoy variants in `cv-convoy` decide
//! when a summary is stale and rebuild it through their source.

use cv_core::units::{CARUNITS_PER_TILE, KMH_SPEED_UNLIMITED};
use cv_core::{Fixed, WayType};

use crate::VehicleDesc;

// ── VehicleSummary ────────────────────────────────────────────────────────────

/// Static properties of the vehicle list: length, unladen weight, top speed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSummary {
    /// Number of vehicles added.
    pub count:     u32,
    /// Sum of vehicle lengths in car units.
    pub length:    u32,
    /// Tiles occupied, see [`VehicleSummary::update_summary`].
    pub tiles:     u32,
    /// Sum of unladen weights in kg.
    pub weight:    i32,
    /// Lowest rated top speed in km/h.
    pub max_speed: i32,
}

impl Default for VehicleSummary {
    fn default() -> Self {
        Self {
            count:     0,
            length:    0,
            tiles:     0,
            weight:    0,
            max_speed: KMH_SPEED_UNLIMITED,
        }
    }
}

impl VehicleSummary {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn add_vehicle<D: VehicleDesc + ?Sized>(&mut self, desc: &D) {
        self.count += 1;
        self.length += desc.length() as u32;
        self.weight = self.weight.saturating_add(desc.weight_t().saturating_mul(1000).min(i32::MAX as u32) as i32);
        self.max_speed = self.max_speed.min(desc.max_speed_kmh());
    }

    /// Derive the tile count once every vehicle has been added.
    ///
    /// The last vehicle always occupies at least half a tile, so a short
    /// final vehicle is padded up to that before rounding up.
    pub fn update_summary(&mut self, length_of_last_vehicle: u8) {
        let half = CARUNITS_PER_TILE / 2;
        let last = length_of_last_vehicle as u32;
        let padding = half.max(last) - last;
        self.tiles = (self.length + padding + CARUNITS_PER_TILE - 1) / CARUNITS_PER_TILE;
    }
}

// ── AdverseSummary ────────────────────────────────────────────────────────────

/// The way a vehicle currently stands on, as far as the physics cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WayContext {
    pub way:           WayType,
    /// Speed limit of the way in km/h.
    pub max_speed_kmh: i32,
    /// `1000 · sin(slope)` plus the way's base friction.
    pub friction:      i16,
    pub electrified:   bool,
}

impl WayContext {
    /// Level, unelectrified way with the given speed limit.
    pub fn flat(way: WayType, max_speed_kmh: i32) -> Self {
        Self {
            way,
            max_speed_kmh,
            friction: way.base_friction(),
            electrified: false,
        }
    }

    /// Add a slope, given as `1000 · sin(alpha)`, to the base friction.
    pub fn with_slope(mut self, sin_alpha_1000: i16) -> Self {
        self.friction = self.way.base_friction().saturating_add(sin_alpha_1000);
        self
    }

    pub fn electrified(mut self) -> Self {
        self.electrified = true;
        self
    }
}

/// Air drag, rolling resistance, brake scale and way speed limit of the
/// convoy's current position.
///
/// `cf` is in kg/m (drag force = cf · v²), `fr` is dimensionless and `br`
/// is a deceleration in m/s² used for vehicles without a rated brake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdverseSummary {
    pub cf:        Fixed,
    pub fr:        Fixed,
    pub br:        Fixed,
    /// Lowest way speed limit in km/h, 0 if an electric engine has no
    /// overhead line.
    pub max_speed: i32,
}

impl Default for AdverseSummary {
    fn default() -> Self {
        Self {
            cf:        Fixed::ZERO,
            fr:        Fixed::ZERO,
            br:        Fixed::ZERO,
            max_speed: KMH_SPEED_UNLIMITED,
        }
    }
}

impl AdverseSummary {
    /// The profile of an empty stretch of `way`.
    pub fn for_way(way: WayType) -> Self {
        let mut summary = Self::default();
        summary.set_by_waytype(way);
        summary
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Load the resistance constants of `way`.  The speed limit is kept.
    pub fn set_by_waytype(&mut self, way: WayType) {
        let (cf, fr, br) = match way {
            WayType::Track | WayType::NarrowGauge => {
                (Fixed::from_int(13), Fixed::ratio(51, 10_000), Fixed::HALF)
            }
            WayType::Tram | WayType::Monorail => {
                (Fixed::from_int(13), Fixed::ratio(51, 10_000), Fixed::ONE)
            }
            WayType::Maglev => {
                (Fixed::from_int(10), Fixed::ratio(15, 10_000), Fixed::ratio(12, 10))
            }
            WayType::Water => {
                (Fixed::from_int(25), Fixed::ratio(1, 1_000), Fixed::ratio(1, 10))
            }
            WayType::Air => {
                (Fixed::ONE, Fixed::ratio(1, 1_000), Fixed::from_int(2))
            }
            // Road, Other, and any way type added later.
            _ => {
                (Fixed::ratio(252, 100), Fixed::ratio(15, 1_000), Fixed::ONE)
            }
        };
        self.cf = cf;
        self.fr = fr;
        self.br = br;
    }

    /// Fold one vehicle's position into the summary.
    ///
    /// The worst (largest) drag and rolling resistance wins, as does the
    /// weakest brake scale.  An electric engine on a way without overhead
    /// line pins the speed limit to 0.
    pub fn add_vehicle(&mut self, ctx: &WayContext, electric: bool) {
        let profile = Self::for_way(ctx.way);
        let first = self.cf.is_zero() && self.fr.is_zero();
        self.cf = self.cf.max(profile.cf);
        self.fr = self.fr.max(profile.fr);
        self.br = if first { profile.br } else { self.br.min(profile.br) };
        self.max_speed = self.max_speed.min(ctx.max_speed_kmh);
        if electric && !ctx.electrified {
            self.max_speed = 0;
        }
    }
}

// ── FreightSummary ────────────────────────────────────────────────────────────

/// Bounds on the cargo weight a convoy can carry when fully loaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreightSummary {
    /// Full load of the lightest freight every vehicle accepts, in kg.
    pub min_freight_weight: i32,
    /// Full load of the heaviest freight every vehicle accepts, in kg.
    pub max_freight_weight: i32,
}

impl FreightSummary {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn add_vehicle<D: VehicleDesc + ?Sized>(&mut self, desc: &D) {
        let Some(range) = desc.freight() else {
            return;
        };
        let capacity = desc.capacity() as i64;
        let clamp = |kg: i64| kg.clamp(0, i32::MAX as i64) as i32;
        self.min_freight_weight = self
            .min_freight_weight
            .saturating_add(clamp(capacity * range.min_kg as i64));
        self.max_freight_weight = self
            .max_freight_weight
            .saturating_add(clamp(capacity * range.max_kg as i64));
    }
}

// ── WeightSummary ─────────────────────────────────────────────────────────────

/// Gross weight of a convoy split into the components normal and parallel
/// to its slope.
///
/// `weight_cos` feeds rolling resistance, `weight_sin` the downhill force
/// (negative when going downhill).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightSummary {
    /// Gross weight in kg.
    pub weight:     i32,
    /// Σ weight · cos(α), in kg.
    pub weight_cos: Fixed,
    /// Σ weight · sin(α), in kg.
    pub weight_sin: Fixed,
}

impl WeightSummary {
    /// A summary of one block of `kgs` on a slope of `sin_alpha / 1000`.
    pub fn new(kgs: i32, sin_alpha: i32) -> Self {
        let mut summary = Self::default();
        summary.add_weight(kgs, sin_alpha);
        summary
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add `kgs` standing on a slope of `sin_alpha / 1000`.
    ///
    /// `sin_alpha` is clamped to ±1000.
    pub fn add_weight(&mut self, kgs: i32, sin_alpha: i32) {
        self.weight = self.weight.saturating_add(kgs);
        let kg = Fixed::from(kgs);
        let sin_alpha = sin_alpha.clamp(-1000, 1000);
        if sin_alpha == 0 {
            self.weight_cos += kg;
            return;
        }
        let sin = Fixed::ratio(sin_alpha as i64, 1000);
        let cos = (Fixed::ONE - sin * sin).sqrt();
        self.weight_sin += kg * sin;
        self.weight_cos += kg * cos;
    }
}
