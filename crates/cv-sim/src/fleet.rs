//! The `Fleet` struct and its tick loop.

use std::mem;

use cv_convoy::{ConvoyCache, ExistingConvoy, LazyConvoy, LoadedSource};
use cv_core::units::{kmh_to_speed, speed_to_kmh};
use cv_core::{ConvoyId, PhysicsConfig, SectionId, SimClock, SimConfig, Tick};
use cv_physics::{MotionState, MoveRequest};
use tracing::{debug, info, warn};

use crate::{Direction, FleetObserver, Route, SimResult, Train};

// ── Convoy ────────────────────────────────────────────────────────────────────

/// Whether a convoy is moving or standing at a stop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Standing until the given tick.
    Waiting { until: Tick },
    Running,
}

/// A train on the route plus everything the driver keeps for it between
/// ticks.
#[derive(Clone, Debug)]
pub struct Convoy {
    pub id:        ConvoyId,
    pub name:      String,
    pub train:     Train,
    /// Summaries memoized across ticks.  Invalidated by the driver whenever
    /// the train's way or load changes.
    pub cache:     ConvoyCache,
    pub motion:    MotionState,
    /// Head position in steps from the route start.
    pub position:  u32,
    pub direction: Direction,
    pub section:   SectionId,
    pub phase:     Phase,
    /// Set while halted short of the route end without enough traction.
    pub stalled:   bool,
    /// Completed trips.
    pub trips:     u32,
}

impl Convoy {
    #[inline]
    pub fn speed_kmh(&self) -> i32 {
        speed_to_kmh(self.motion.speed)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Run `f` against the cached physics of this convoy.
    ///
    /// The cache is lent to a [`LazyConvoy`] over the live train for the
    /// duration of the call and stored back afterwards.
    ///
    /// # Errors
    ///
    /// [`ConvoyError::Empty`][cv_convoy::ConvoyError::Empty] if the train has
    /// no cars.
    pub fn with_physics<R>(
        &mut self,
        physics: PhysicsConfig,
        f: impl FnOnce(&mut LazyConvoy<ExistingConvoy<'_, Train>>, &mut MotionState) -> R,
    ) -> SimResult<R> {
        let view = ExistingConvoy::new(&self.train, physics)?;
        let mut lazy = LazyConvoy::from_parts(view, mem::take(&mut self.cache));
        let out = f(&mut lazy, &mut self.motion);
        self.cache = lazy.into_parts().1;
        Ok(out)
    }

    /// Put the whole train onto the section under its head.
    pub(crate) fn enter_section(&mut self, route: &Route, section: SectionId) {
        self.section = section;
        if let Some(s) = route.get(section) {
            self.train.set_way(s.way_context(self.direction));
        }
        self.cache.invalidate_adverse_summary();
    }
}

// ── Per-tick report ───────────────────────────────────────────────────────────

/// What happened to one convoy during one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub steps:    u32,
    pub departed: bool,
    pub entered:  Option<SectionId>,
    pub arrived:  bool,
    pub stalled:  bool,
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// The fleet runner.
///
/// Each tick every running convoy:
///
/// 1. looks up the limits ahead on the route and picks the one whose brake
///    point comes first;
/// 2. advances with `move_convoy` for `config.delta_t_per_tick` engine ticks;
/// 3. updates its position; entering a new section refreshes the way under
///    its cars and invalidates the adverse summary;
/// 4. at the route end stops, swaps its load (invalidating the weight
///    summary), turns round and waits `dwell_ticks`.
///
/// Convoys do not interact, so they are updated independently (in parallel
/// with the `parallel` feature) and observers are called afterwards in
/// ascending `ConvoyId` order.
///
/// Create via [`FleetBuilder`][crate::FleetBuilder].
pub struct Fleet {
    pub config:      SimConfig,
    pub clock:       SimClock,
    pub route:       Route,
    pub convoys:     Vec<Convoy>,
    /// Ticks a convoy stands at a route end before heading back.
    pub dwell_ticks: u64,
}

impl Fleet {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: FleetObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(from = %self.clock.current_tick, to = %self.config.end_tick(), "fleet run started");
        while self.clock.current_tick < self.config.end_tick() {
            self.tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        let trips: u32 = self.convoys.iter().map(|c| c.trips).sum();
        info!(clock = %self.clock, trips, "fleet run finished");
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: FleetObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    pub fn convoy(&self, id: ConvoyId) -> Option<&Convoy> {
        self.convoys.get(id.index())
    }

    pub fn convoy_mut(&mut self, id: ConvoyId) -> Option<&mut Convoy> {
        self.convoys.get_mut(id.index())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: FleetObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let reports = self.step_all(now)?;

        for (convoy, report) in self.convoys.iter().zip(&reports) {
            if report.departed {
                observer.on_departure(now, convoy);
            }
            if let Some(section) = report.entered.and_then(|id| self.route.get(id)) {
                observer.on_section_entered(now, convoy, section);
            }
            if report.stalled {
                observer.on_stall(now, convoy);
            }
            if report.arrived {
                observer.on_arrival(now, convoy);
            }
        }

        let moving = self.convoys.iter().filter(|c| c.motion.speed > 0).count();
        observer.on_tick_end(now, moving);
        if self.config.trace_interval_ticks > 0
            && now.0.is_multiple_of(self.config.trace_interval_ticks)
        {
            observer.on_trace(now, &self.convoys, &self.route);
        }

        self.clock.advance();
        Ok(())
    }

    fn step_all(&mut self, now: Tick) -> SimResult<Vec<StepReport>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let route = &self.route;
        let config = &self.config;
        let dwell = self.dwell_ticks;

        #[cfg(not(feature = "parallel"))]
        {
            self.convoys
                .iter_mut()
                .map(|convoy| step_convoy(convoy, route, config, dwell, now))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.convoys
                .par_iter_mut()
                .map(|convoy| step_convoy(convoy, route, config, dwell, now))
                .collect()
        }
    }
}

// ── One convoy, one tick ──────────────────────────────────────────────────────

fn step_convoy(
    convoy: &mut Convoy,
    route:  &Route,
    config: &SimConfig,
    dwell:  u64,
    now:    Tick,
) -> SimResult<StepReport> {
    let mut report = StepReport::default();
    if let Phase::Waiting { until } = convoy.phase {
        if now < until {
            return Ok(report);
        }
        convoy.phase = Phase::Running;
        report.departed = true;
        debug!(convoy = %convoy.id, "departed");
    }

    let stf = config.physics.simtime_factor();
    let delta_t = config.delta_t_per_tick as i64;
    let (position, direction) = (convoy.position, convoy.direction);
    let target = route
        .get(convoy.section)
        .map_or(0, |s| kmh_to_speed(s.max_speed_kmh));

    let cruise = MoveRequest::cruise(delta_t, stf, target);

    let can_restart = convoy.with_physics(config.physics, |lazy, motion| {
        let request = plan_move(lazy, cruise, route, position, direction, motion);
        lazy.move_convoy(&request, motion);
        motion.speed > 0 || lazy.max_speed() > 0
    })?;

    report.steps = u32::try_from(convoy.motion.take_steps()).unwrap_or(u32::MAX);
    convoy.position = route.advance(position, direction, report.steps);

    if convoy.position == route.end_position(direction) {
        arrive(convoy, route, dwell, now);
        report.arrived = true;
        return Ok(report);
    }

    let section = route.section_at(convoy.position, direction);
    if section != convoy.section {
        convoy.enter_section(route, section);
        report.entered = Some(section);
        debug!(convoy = %convoy.id, %section, position = convoy.position, "entered section");
    }

    if can_restart {
        convoy.stalled = false;
    } else if !convoy.stalled {
        convoy.stalled = true;
        report.stalled = true;
        warn!(
            convoy = %convoy.id,
            name = %convoy.name,
            position = convoy.position,
            payload_kg = convoy.train.payload_kg(),
            "convoy stalled: traction cannot overcome resistance"
        );
    }
    Ok(report)
}

/// Add to `cruise` whichever limit ahead has the nearest brake point.
///
/// The head is already `motion.yards` past `position`, so a lowered limit is
/// placed one step early; otherwise the residue could carry the head across
/// the boundary before the mover reaches the limit point.  The route end is
/// not moved, or the convoy could never reach it.
fn plan_move<S: LoadedSource>(
    lazy:      &mut LazyConvoy<S>,
    cruise:    MoveRequest,
    route:     &Route,
    position:  u32,
    direction: Direction,
    motion:    &MotionState,
) -> MoveRequest {
    let (stf, target, speed) = (cruise.simtime_factor, cruise.target_speed, motion.speed);
    let early = u32::from(motion.yards > 0);
    let mut request = cruise;
    let from_here = lazy.braking_distance_steps(stf, speed) as i64;
    let mut nearest = i64::MAX;

    for point in route.limits_ahead(position, direction) {
        let limit = kmh_to_speed(point.speed_kmh);
        if limit >= target.max(speed) {
            continue;
        }
        let steps = if point.speed_kmh > 0 { point.steps.saturating_sub(early) } else { point.steps };
        let to_limit = lazy.braking_distance_steps(stf, limit) as i64;
        let brake_at = steps as i64 - (from_here - to_limit).max(0);
        if brake_at < nearest {
            nearest = brake_at;
            let brake = brake_at.clamp(0, i32::MAX as i64) as i32;
            request = request.with_limit(limit, i32::try_from(steps).unwrap_or(i32::MAX), brake);
        }
    }
    request
}

fn arrive(convoy: &mut Convoy, route: &Route, dwell: u64, now: Tick) {
    convoy.motion = MotionState::default();
    if convoy.train.is_loaded() {
        convoy.train.empty();
    } else {
        convoy.train.fill();
    }
    convoy.cache.invalidate_weight_summary();
    convoy.direction = convoy.direction.reversed();
    let section = route.section_at(convoy.position, convoy.direction);
    convoy.enter_section(route, section);
    convoy.phase = Phase::Waiting { until: now + dwell };
    convoy.stalled = false;
    convoy.trips += 1;
    info!(
        convoy = %convoy.id,
        name = %convoy.name,
        trip = convoy.trips,
        payload_kg = convoy.train.payload_kg(),
        "arrived; turning round"
    );
}
