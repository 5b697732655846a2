//! Unit tests for cv-physics.

use cv_core::units::{kmh_to_speed, kmh_to_v, steps_to_x};
use cv_core::{Fixed, PhysicsConfig, WayType};

use crate::{
    AdverseSummary, ConvoyPhysics, FreightRange, FreightSummary, MotionState, MoveRequest,
    VehicleDesc, VehicleSpec, VehicleSummary, WayContext, WeightSummary,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A convoy that recomputes every summary on demand from its vehicle list.
struct Rig {
    vehicles: Vec<VehicleSpec>,
    ctx:      WayContext,
    config:   PhysicsConfig,
}

impl Rig {
    fn new(vehicles: Vec<VehicleSpec>, ctx: WayContext) -> Self {
        Self { vehicles, ctx, config: PhysicsConfig::default() }
    }

    /// Unladen weight plus `load_kg`, standing on the rig's way.
    fn weight(&mut self, load_kg: i32) -> WeightSummary {
        let kgs = self.vehicle_summary().weight + load_kg;
        WeightSummary::new(kgs, self.ctx.friction as i32)
    }
}

impl ConvoyPhysics for Rig {
    fn vehicle_summary(&mut self) -> VehicleSummary {
        let mut summary = VehicleSummary::default();
        for v in &self.vehicles {
            summary.add_vehicle(v);
        }
        summary.update_summary(self.vehicles.last().map_or(0, |v| v.length));
        summary
    }

    fn adverse_summary(&mut self) -> AdverseSummary {
        let mut summary = AdverseSummary::default();
        for v in &self.vehicles {
            summary.add_vehicle(&self.ctx, v.electric);
        }
        summary
    }

    fn force_summary(&mut self, speed: u32) -> i32 {
        let index: i64 = self.vehicles.iter().map(|v| v.force_index(speed)).sum();
        self.config.power_index_to_power(index) as i32
    }

    fn brake_summary(&mut self, speed: u32) -> i32 {
        self.vehicles.iter().map(|v| v.brake_force(speed)).sum::<i64>() as i32
    }

    fn power_summary(&mut self, speed: u32) -> i32 {
        let index: i64 = self.vehicles.iter().map(|v| v.power_index(speed)).sum();
        self.config.power_index_to_power(index) as i32
    }

    fn current_friction(&mut self) -> i16 {
        self.ctx.friction
    }
}

fn loco() -> VehicleSpec {
    VehicleSpec::engine("loco", WayType::Track, 80, 120, 2000).with_length(16)
}

fn box_wagon() -> VehicleSpec {
    VehicleSpec::wagon("box", WayType::Track, 20, 100, 40, FreightRange::fixed(1000))
}

fn track() -> WayContext {
    WayContext::flat(WayType::Track, 160)
}

/// Locomotive plus one empty wagon: 100 t, 100 km/h.
fn light_train() -> Rig {
    Rig::new(vec![loco(), box_wagon()], track())
}

/// Locomotive plus 30 wagons; with full load 1880 t.
fn heavy_train() -> Rig {
    let mut vehicles = vec![loco()];
    vehicles.extend(std::iter::repeat_n(box_wagon(), 30));
    Rig::new(vehicles, track())
}

const HEAVY_LOAD_KG: i32 = 30 * 40 * 1000;

fn near(a: Fixed, b: Fixed, tolerance: Fixed) -> bool {
    (a - b).abs() <= tolerance
}

// ── Summaries ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod summaries {
    use super::*;
    use cv_core::units::KMH_SPEED_UNLIMITED;

    #[test]
    fn vehicle_summary_sums_weight_length_speed() {
        let mut rig = light_train();
        let s = rig.vehicle_summary();
        assert_eq!(s.count, 2);
        assert_eq!(s.length, 24);
        assert_eq!(s.weight, 100_000);
        assert_eq!(s.max_speed, 100);
    }

    #[test]
    fn tiles_pad_short_last_vehicle_to_half_a_tile() {
        let mut s = VehicleSummary::default();
        s.add_vehicle(&loco());
        s.add_vehicle(&box_wagon().with_length(4));
        s.update_summary(4);
        // 16 + 4 + 4 padding → 24 car units → 2 tiles
        assert_eq!(s.tiles, 2);

        let mut single = VehicleSummary::default();
        single.add_vehicle(&box_wagon());
        single.update_summary(8);
        assert_eq!(single.tiles, 1);

        let mut pair = VehicleSummary::default();
        pair.add_vehicle(&loco());
        pair.add_vehicle(&loco());
        pair.update_summary(16);
        assert_eq!(pair.tiles, 2);
    }

    #[test]
    fn cleared_vehicle_summary_is_unlimited() {
        let mut s = light_train().vehicle_summary();
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.weight, 0);
        assert_eq!(s.max_speed, KMH_SPEED_UNLIMITED);
    }

    #[test]
    fn adverse_profile_by_way_type() {
        let rail = AdverseSummary::for_way(WayType::Track);
        assert_eq!(rail.cf, Fixed::from_int(13));
        assert_eq!(rail.fr, Fixed::ratio(51, 10_000));
        assert_eq!(rail.br, Fixed::HALF);

        let road = AdverseSummary::for_way(WayType::Road);
        assert_eq!(road.cf, Fixed::ratio(252, 100));
        assert_eq!(road.fr, Fixed::ratio(15, 1_000));
        assert_eq!(AdverseSummary::for_way(WayType::Other), road);

        let water = AdverseSummary::for_way(WayType::Water);
        assert_eq!(water.cf, Fixed::from_int(25));
        assert_eq!(water.br, Fixed::ratio(1, 10));

        assert_eq!(AdverseSummary::for_way(WayType::Maglev).fr, Fixed::ratio(15, 10_000));
        assert_eq!(AdverseSummary::for_way(WayType::Air).br, Fixed::from_int(2));
        assert_eq!(AdverseSummary::for_way(WayType::Tram).br, Fixed::ONE);
    }

    #[test]
    fn every_way_type_has_a_profile() {
        for way in WayType::ALL {
            let p = AdverseSummary::for_way(way);
            assert!(p.cf.is_positive() && p.fr.is_positive() && p.br.is_positive(), "{way}");
        }
    }

    #[test]
    fn set_by_waytype_keeps_speed_limit() {
        let mut s = AdverseSummary::default();
        s.max_speed = 80;
        s.set_by_waytype(WayType::Monorail);
        assert_eq!(s.max_speed, 80);
        assert_eq!(s.cf, Fixed::from_int(13));
    }

    #[test]
    fn adverse_takes_worst_position() {
        let mut s = AdverseSummary::default();
        s.add_vehicle(&WayContext::flat(WayType::Track, 120), false);
        s.add_vehicle(&WayContext::flat(WayType::Road, 50), false);
        assert_eq!(s.cf, Fixed::from_int(13));
        assert_eq!(s.fr, Fixed::ratio(15, 1_000));
        assert_eq!(s.br, Fixed::HALF);
        assert_eq!(s.max_speed, 50);
    }

    #[test]
    fn electric_engine_without_catenary_cannot_move() {
        let mut s = AdverseSummary::default();
        s.add_vehicle(&WayContext::flat(WayType::Track, 120), true);
        assert_eq!(s.max_speed, 0);

        let mut wired = AdverseSummary::default();
        wired.add_vehicle(&WayContext::flat(WayType::Track, 120).electrified(), true);
        assert_eq!(wired.max_speed, 120);
    }

    #[test]
    fn freight_summary_spans_range() {
        let mut s = FreightSummary::default();
        s.add_vehicle(&loco());
        s.add_vehicle(&VehicleSpec::wagon(
            "hopper", WayType::Track, 20, 100, 30, FreightRange::new(1000, 1500),
        ));
        assert_eq!(s.min_freight_weight, 30_000);
        assert_eq!(s.max_freight_weight, 45_000);
        s.clear();
        assert_eq!(s, FreightSummary::default());
    }

    #[test]
    fn weight_summary_on_flat_is_all_normal() {
        let w = WeightSummary::new(50_000, 0);
        assert_eq!(w.weight, 50_000);
        assert_eq!(w.weight_cos, Fixed::from_int(50_000));
        assert_eq!(w.weight_sin, Fixed::ZERO);
    }

    #[test]
    fn weight_summary_splits_along_slope() {
        let w = WeightSummary::new(1_000, 600);
        let tol = Fixed::ratio(1, 10);
        assert!(near(w.weight_sin, Fixed::from_int(600), tol), "{}", w.weight_sin);
        assert!(near(w.weight_cos, Fixed::from_int(800), tol), "{}", w.weight_cos);

        let down = WeightSummary::new(1_000, -600);
        assert!(down.weight_sin.is_negative());
        assert_eq!(down.weight_cos, w.weight_cos);
    }

    #[test]
    fn weight_summary_clamps_slope() {
        assert_eq!(WeightSummary::new(1_000, 5_000), WeightSummary::new(1_000, 1_000));
        let vertical = WeightSummary::new(1_000, 1_000);
        assert_eq!(vertical.weight_sin, Fixed::from_int(1_000));
        assert_eq!(vertical.weight_cos, Fixed::ZERO);
    }

    #[test]
    fn weight_summary_accumulates() {
        let mut w = WeightSummary::default();
        w.add_weight(30_000, 0);
        w.add_weight(20_000, 0);
        assert_eq!(w, WeightSummary::new(50_000, 0));
    }
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicles {
    use super::*;
    use crate::PhysicsError;

    #[test]
    fn force_follows_power_hyperbola() {
        let v = VehicleSpec::engine("e", WayType::Track, 80, 120, 1000);
        // Starting effort derived from power at 4 km/h.
        assert_eq!(v.force_index(0), 900 * 64);
        assert_eq!(v.force_index(10), 1000 * 64 / 10);
        assert_eq!(v.power_index(10), 1000 * 64);
    }

    #[test]
    fn rated_tractive_effort_caps_low_speed_force() {
        let v = VehicleSpec::engine("e", WayType::Track, 80, 120, 1000).with_tractive_effort(300);
        assert_eq!(v.force_index(0), 300 * 64);
        assert_eq!(v.force_index(2), 300 * 64);
        assert_eq!(v.force_index(20), 1000 * 64 / 20);
    }

    #[test]
    fn gear_scales_force_index() {
        let v = VehicleSpec::engine("e", WayType::Road, 10, 80, 100).with_gear(128);
        assert_eq!(v.force_index(5), 100 * 128 / 5);
    }

    #[test]
    fn wagon_has_no_traction() {
        assert_eq!(box_wagon().force_index(0), 0);
        assert_eq!(box_wagon().power_index(10), 0);
    }

    #[test]
    fn default_brake_uses_way_scale() {
        // 20 t on rail at 0.5 m/s²
        assert_eq!(box_wagon().brake_force(10), 10);
        let truck = VehicleSpec::engine("t", WayType::Road, 12, 80, 200);
        assert_eq!(truck.brake_force(0), 12);
        assert_eq!(box_wagon().with_brake_force(75).brake_force(0), 75);
    }

    #[test]
    fn validate_accepts_catalog_entries() {
        assert!(loco().validate().is_ok());
        assert!(box_wagon().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_entries() {
        let mut v = loco();
        v.weight_t = 0;
        assert!(matches!(v.validate(), Err(PhysicsError::ZeroWeight(_))));

        let v = loco().with_gear(0);
        assert!(matches!(v.validate(), Err(PhysicsError::ZeroGear(_))));

        let mut v = box_wagon();
        v.max_speed_kmh = 0;
        assert!(matches!(v.validate(), Err(PhysicsError::TopSpeed { .. })));

        let v = VehicleSpec::wagon("w", WayType::Track, 20, 100, 10, FreightRange::new(5, 1));
        assert!(matches!(v.validate(), Err(PhysicsError::FreightRange { min: 5, max: 1, .. })));
    }

    #[test]
    fn unpowered_wagon_may_have_zero_gear() {
        assert!(box_wagon().with_gear(0).validate().is_ok());
    }
}

// ── Physics core ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod physics {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use cv_core::units::WEIGHT_UNLIMITED;

    #[test]
    fn starting_force_from_power() {
        let mut rig = light_train();
        assert_eq!(rig.starting_force(), Fixed::from_int(1_800_000));
        assert_eq!(rig.get_force(Fixed::ZERO), rig.starting_force());
        // 2000 kW at 27 m/s: 4740 index → 74 kN
        assert_eq!(rig.get_force(kmh_to_v(100)), Fixed::from_int(74_000));
    }

    #[test]
    fn continuous_power_at_top_speed() {
        let mut rig = light_train();
        assert_eq!(rig.continuous_power(), Fixed::from_int(2_000_000));
    }

    #[test]
    fn power_factor_scales_force() {
        let mut rig = light_train();
        rig.config.power_factor_percent = 50;
        assert_eq!(rig.starting_force(), Fixed::from_int(900_000));
    }

    #[test]
    fn frs_on_flat_is_rolling_resistance() {
        let mut rig = light_train();
        let frs = rig.frs(&WeightSummary::new(100_000, 0));
        // 9.81 · 0.0051 · 100 t ≈ 5003 N
        assert!(near(frs, Fixed::from_int(5_003), Fixed::ONE), "{frs}");
    }

    #[test]
    fn frs_downhill_is_negative() {
        let mut rig = light_train();
        assert!(rig.frs(&WeightSummary::new(100_000, -50)).is_negative());
    }

    #[test]
    fn holding_force_never_exceeds_traction() {
        let mut rig = light_train();
        let v = kmh_to_v(80);
        let huge = Fixed::from_int(10_000_000);
        assert_eq!(rig.calc_speed_holding_force(v, huge), rig.get_force(v));
        let small = rig.calc_speed_holding_force(v, Fixed::ZERO);
        assert_eq!(small, Fixed::from_int(13) * v * v);
    }

    #[test]
    fn light_train_reaches_rated_speed() {
        let mut rig = light_train();
        let w = rig.weight(0);
        assert_eq!(rig.calc_max_speed(&w), 100);
    }

    #[test]
    fn way_limit_caps_max_speed() {
        let mut rig = Rig::new(vec![loco()], WayContext::flat(WayType::Track, 60));
        let w = rig.weight(0);
        assert_eq!(rig.calc_max_speed(&w), 60);
    }

    #[test]
    fn heavy_train_settles_below_rated_speed() {
        let mut rig = heavy_train();
        let w = rig.weight(HEAVY_LOAD_KG);
        assert_eq!(w.weight, 1_880_000);
        assert_eq!(rig.calc_max_speed(&w), 64);
    }

    #[test]
    fn max_speed_is_last_sustainable() {
        let mut rig = heavy_train();
        let w = rig.weight(HEAVY_LOAD_KG);
        let frs = rig.frs(&w);
        let cf = rig.adverse_summary().cf;
        let k = rig.calc_max_speed(&w);
        let force_at = |rig: &mut Rig, kmh: i32| {
            let v = kmh_to_v(kmh);
            rig.get_force(v) - cf * v * v - frs
        };
        assert!(!force_at(&mut rig, k).is_negative());
        assert!(force_at(&mut rig, k + 1).is_negative());
    }

    #[test]
    fn too_heavy_to_start_gives_zero() {
        let mut rig = light_train();
        let w = WeightSummary::new(200_000, 1_000);
        assert_eq!(rig.calc_max_speed(&w), 0);
    }

    #[test]
    fn electric_without_catenary_gives_zero() {
        let mut rig = Rig::new(vec![loco().electric()], track());
        let w = rig.weight(0);
        assert_eq!(rig.calc_max_speed(&w), 0);
    }

    #[test]
    fn max_speed_never_rises_with_weight() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut rig = heavy_train();
        for _ in 0..50 {
            let a = rng.gen_range(100_000..6_000_000);
            let b = rng.gen_range(100_000..6_000_000);
            let (light, heavy) = if a <= b { (a, b) } else { (b, a) };
            let sl = rig.calc_max_speed(&WeightSummary::new(light, 1));
            let sh = rig.calc_max_speed(&WeightSummary::new(heavy, 1));
            assert!(sl >= sh, "{light} kg → {sl}, {heavy} kg → {sh}");
            assert!(sl <= 100);
        }
    }

    #[test]
    fn max_starting_weight_on_flat() {
        let mut rig = light_train();
        let w = rig.calc_max_starting_weight(0);
        // 1800 kN / (9.81 · 0.0051 N/kg)
        assert!((35_975_000..=35_977_000).contains(&w), "{w}");
    }

    #[test]
    fn max_weight_limited_by_power_at_top_speed() {
        let mut rig = light_train();
        let w = rig.calc_max_weight(0);
        // (2000 kW / 27.8 m/s − 13 · 27.8²) / (9.81 · 0.0051)
        assert!((1_237_000..=1_240_000).contains(&w), "{w}");
        assert!(w <= rig.calc_max_starting_weight(0));
    }

    #[test]
    fn max_weight_shrinks_uphill() {
        let mut rig = light_train();
        assert!(rig.calc_max_weight(20) < rig.calc_max_weight(0));
        assert!(rig.calc_max_starting_weight(20) < rig.calc_max_starting_weight(0));
    }

    #[test]
    fn weak_engine_cannot_lift_itself_uphill() {
        // 20 kN against about 54 kN of rolling and slope resistance.
        let weak = VehicleSpec::engine("weak", WayType::Track, 80, 120, 2000).with_tractive_effort(20);
        let mut rig = Rig::new(vec![weak, box_wagon()], track());
        let unladen = rig.vehicle_summary().weight;
        assert_eq!(unladen, 100_000);
        assert!(rig.starting_force() < rig.frs(&WeightSummary::new(unladen, 50)));
        assert!(rig.calc_max_starting_weight(50) <= unladen);
        assert!(rig.calc_max_weight(50) <= unladen);
    }

    #[test]
    fn max_weight_never_rises_with_slope() {
        let mut rng = SmallRng::seed_from_u64(13);
        for mut rig in [light_train(), heavy_train()] {
            for _ in 0..40 {
                let gentle = rng.gen_range(-50..1_000);
                let steep = gentle + rng.gen_range(0..200);
                assert!(
                    rig.calc_max_weight(steep) <= rig.calc_max_weight(gentle),
                    "slope {steep} carries more than {gentle}"
                );
                assert!(rig.calc_max_starting_weight(steep) <= rig.calc_max_starting_weight(gentle));
            }
        }
    }

    #[test]
    fn downhill_weight_is_unlimited() {
        let mut rig = light_train();
        assert_eq!(rig.calc_max_starting_weight(-100), WEIGHT_UNLIMITED);
        assert_eq!(rig.calc_max_weight(-100), WEIGHT_UNLIMITED);
    }

    #[test]
    fn unpowered_convoy_cannot_start_anything() {
        let mut rig = Rig::new(vec![box_wagon()], track());
        assert_eq!(rig.calc_max_starting_weight(0), 0);
        assert_eq!(rig.calc_max_weight(0), 0);
    }

    #[test]
    fn braking_distance_close_to_analytic() {
        let brake = VehicleSpec::engine("b", WayType::Track, 100, 120, 2000).with_brake_force(500);
        let mut rig = Rig::new(vec![brake], track());
        let w = WeightSummary::new(100_000, 0);
        // v² / 2a with a ≈ 5 m/s² is 40 m; the bins overestimate a little.
        let d = rig.calc_min_braking_distance(&w, Fixed::from_int(20));
        assert!((40..=42).contains(&d), "{d}");
    }

    #[test]
    fn braking_distance_zero_at_rest() {
        let mut rig = light_train();
        let w = rig.weight(0);
        assert_eq!(rig.calc_min_braking_distance(&w, Fixed::ZERO), 0);
        assert_eq!(rig.calc_min_braking_distance_steps(Fixed::ONE, &w, 0), 0);
    }

    #[test]
    fn braking_distance_monotone_in_speed_and_weight() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut rig = heavy_train();
        for _ in 0..30 {
            let v1 = Fixed::from_int(rng.gen_range(1..40));
            let v2 = v1 + Fixed::from_int(rng.gen_range(0..10));
            let m1 = rng.gen_range(100_000..2_000_000);
            let m2 = m1 + rng.gen_range(0..1_000_000);
            let light = WeightSummary::new(m1, 1);
            let heavy = WeightSummary::new(m2, 1);
            assert!(rig.calc_min_braking_distance(&light, v1) <= rig.calc_min_braking_distance(&light, v2));
            assert!(rig.calc_min_braking_distance(&light, v1) <= rig.calc_min_braking_distance(&heavy, v1));
        }
    }

    #[test]
    fn braking_steps_cover_braking_distance() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let speed = kmh_to_speed(100);
        let v = cv_core::units::speed_to_v(speed);
        let x = rig.braking_distance(&w, v);
        for stf in [Fixed::ONE, Fixed::from_int(2), Fixed::HALF] {
            let steps = rig.calc_min_braking_distance_steps(stf, &w, speed) as i64;
            assert!(steps_to_x(stf, steps) >= x - Fixed::ONE);
            assert!(steps_to_x(stf, steps - 1) < x);
        }
    }

    #[test]
    fn runaway_downhill_cannot_stop() {
        let weak = VehicleSpec::engine("w", WayType::Track, 100, 120, 500).with_brake_force(1);
        let mut rig = Rig::new(vec![weak], track());
        let w = WeightSummary::new(100_000, -1_000);
        assert_eq!(rig.calc_min_braking_distance(&w, Fixed::from_int(10)), i32::MAX);
        assert_eq!(rig.calc_min_braking_distance_steps(Fixed::ONE, &w, 500), i32::MAX);
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod motion {
    use super::*;
    use crate::motion::MAX_DELTA_T;
    use crate::speed_index;
    use cv_core::units::{speed_to_kmh, speed_to_v, v_to_speed};

    const ONE_SECOND: i64 = 64;

    fn cruise(target_kmh: i32) -> MoveRequest {
        MoveRequest::cruise(ONE_SECOND, Fixed::ONE, kmh_to_speed(target_kmh))
    }

    #[test]
    fn accelerates_from_rest() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let mut state = MotionState::default();
        rig.calc_move(&cruise(100), &w, &mut state);
        assert!(state.speed > 0);
        assert!(state.yards > 0);
    }

    #[test]
    fn reaches_and_holds_rated_speed() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let top = kmh_to_speed(100);
        let mut state = MotionState::default();
        for _ in 0..120 {
            rig.calc_move(&cruise(160), &w, &mut state);
            assert!(state.speed <= top);
        }
        assert_eq!(state.speed, top);
    }

    #[test]
    fn cruise_distance_matches_speed_times_ticks() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let top = kmh_to_speed(100);
        for stf in [Fixed::ONE, Fixed::from_int(2)] {
            let mut state = MotionState::at_speed(top);
            let request = MoveRequest::cruise(ONE_SECOND, stf, top);
            rig.calc_move(&request, &w, &mut state);
            assert_eq!(state.speed, top);
            let expected = top as i64 * ONE_SECOND;
            assert!((state.yards - expected).abs() <= 1, "{} vs {expected}", state.yards);
        }
    }

    #[test]
    fn heavy_train_approaches_equilibrium_from_below() {
        let mut rig = heavy_train();
        let w = rig.weight(HEAVY_LOAD_KG);
        let max = rig.calc_max_speed(&w);
        let mut state = MotionState::default();
        let mut last = 0;
        for _ in 0..1_200 {
            rig.calc_move(&cruise(100), &w, &mut state);
            assert!(state.speed >= last);
            assert!(speed_to_kmh(state.speed) <= max + 1);
            last = state.speed;
        }
        assert!(speed_to_kmh(state.speed) >= max - 8, "{}", speed_to_kmh(state.speed));
    }

    #[test]
    fn too_heavy_convoy_stalls() {
        let mut rig = light_train();
        let w = WeightSummary::new(200_000, 1_000);
        let mut state = MotionState::default();
        for _ in 0..10 {
            rig.calc_move(&cruise(100), &w, &mut state);
        }
        assert_eq!(state.speed, 0);
        assert_eq!(state.yards, 0);
    }

    /// Largest speed loss in one second of braking from `speed`, speed units.
    fn max_drop_per_second(rig: &mut Rig, w: &WeightSummary, speed: i32) -> i32 {
        let v = speed_to_v(speed);
        let cf = rig.adverse_summary().cf;
        let decel = (rig.braking_force(speed_index(v)) + cf * v * v + rig.frs(w)) / Fixed::from(w.weight);
        v_to_speed(decel) + 1
    }

    #[test]
    fn stops_at_limit_point() {
        let mut rig = light_train();
        let w = rig.weight(0);
        // 720 steps ≈ 1000 m ahead.
        let limit_steps: i64 = 720;
        let top = kmh_to_speed(100);
        let max_drop = max_drop_per_second(&mut rig, &w, top);
        let mut consumed: i64 = 0;
        let mut state = MotionState::at_speed(top);
        let mut braking = false;
        for _ in 0..400 {
            let left = (limit_steps - consumed).max(0) as i32;
            let request = MoveRequest::stop_in(ONE_SECOND, Fixed::ONE, top, left);
            let before = state.speed;
            rig.calc_move(&request, &w, &mut state);
            consumed += state.take_steps();
            assert!(consumed <= limit_steps, "ran {consumed} steps past a {limit_steps} step limit");
            assert!(before - state.speed <= max_drop, "dropped {} in one second", before - state.speed);
            if braking {
                assert!(state.speed <= before, "accelerated again while braking");
            }
            braking |= state.speed < before;

            let left = (limit_steps - consumed) as i32;
            let needed = rig.calc_min_braking_distance_steps(Fixed::ONE, &w, state.speed);
            assert!(needed <= left + 2, "needs {needed} steps with {left} left");
        }
        assert_eq!(consumed, limit_steps);
        assert_eq!(state.speed, 0);
    }

    #[test]
    fn late_stop_brakes_within_capacity() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let top = kmh_to_speed(100);
        let max_drop = max_drop_per_second(&mut rig, &w, top);
        let mut state = MotionState::at_speed(top);
        let request = MoveRequest::stop_in(ONE_SECOND, Fixed::ONE, top, 5);
        rig.calc_move(&request, &w, &mut state);
        assert!(state.speed > 0);
        assert!(top - state.speed <= max_drop);
        assert!(state.take_steps() > 5);
    }

    #[test]
    fn brakes_to_limit_after_brake_point() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let limit = kmh_to_speed(50);
        let limit_steps: i64 = 600;
        let mut consumed: i64 = 0;
        let mut state = MotionState::at_speed(kmh_to_speed(100));
        let mut last = state.speed;
        for second in 1..=60 {
            let left = (limit_steps - consumed).max(0) as i32;
            let request = MoveRequest::cruise(ONE_SECOND, Fixed::ONE, kmh_to_speed(100))
                .with_limit(limit, left, 0);
            rig.calc_move(&request, &w, &mut state);
            consumed += state.take_steps();
            assert!(state.speed <= last);
            assert!(state.speed >= limit);
            if second == 10 {
                // Spread over the whole approach, not braked at full force.
                assert!(speed_to_kmh(state.speed) > 80, "{}", speed_to_kmh(state.speed));
            }
            last = state.speed;
        }
        assert!(consumed > limit_steps);
        assert_eq!(state.speed, limit);
    }

    #[test]
    fn lowered_target_slows_down() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let mut state = MotionState::at_speed(kmh_to_speed(100));
        for _ in 0..60 {
            rig.calc_move(&cruise(50), &w, &mut state);
            assert!(state.speed >= kmh_to_speed(50));
        }
        assert_eq!(state.speed, kmh_to_speed(50));
    }

    #[test]
    fn downhill_never_overshoots_target() {
        let ctx = WayContext::flat(WayType::Track, 160).with_slope(-50);
        let mut rig = Rig::new(vec![loco()], ctx);
        let w = rig.weight(0);
        assert!(rig.frs(&w).is_negative());
        let target = kmh_to_speed(60);
        let mut state = MotionState::default();
        for _ in 0..120 {
            rig.calc_move(&cruise(60), &w, &mut state);
            assert!(state.speed <= target);
        }
        assert_eq!(state.speed, target);
    }

    #[test]
    fn zero_delta_t_is_a_no_op() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let mut state = MotionState::at_speed(500);
        let request = MoveRequest::cruise(0, Fixed::ONE, 1_000);
        rig.calc_move(&request, &w, &mut state);
        assert_eq!(state, MotionState::at_speed(500));
    }

    #[test]
    fn oversized_delta_t_is_clamped() {
        let mut rig = light_train();
        let w = rig.weight(0);
        let run = |rig: &mut Rig, delta_t: i64| {
            let mut state = MotionState::default();
            let request = MoveRequest::cruise(delta_t, Fixed::ONE, kmh_to_speed(100));
            rig.calc_move(&request, &w, &mut state);
            state
        };
        assert_eq!(run(&mut rig, i64::MAX), run(&mut rig, MAX_DELTA_T));
    }

    #[test]
    fn weightless_convoy_does_not_move() {
        let mut rig = light_train();
        let mut state = MotionState::at_speed(500);
        rig.calc_move(&cruise(100), &WeightSummary::default(), &mut state);
        assert_eq!(state.speed, 0);
        assert_eq!(state.yards, 0);
    }

    #[test]
    fn same_inputs_same_bits() {
        let run = || {
            let mut rig = heavy_train();
            let w = rig.weight(HEAVY_LOAD_KG / 2);
            let mut state = MotionState::default();
            for _ in 0..200 {
                rig.calc_move(&cruise(90), &w, &mut state);
            }
            state
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn take_steps_leaves_remainder() {
        let mut state = MotionState { speed: 0, yards: 3 * 4096 + 17, residue: Fixed::ZERO };
        assert_eq!(state.take_steps(), 3);
        assert_eq!(state.yards, 17);
    }
}
