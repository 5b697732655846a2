//! Fluent builder for constructing a [`Fleet`].

use std::sync::Arc;

use cv_convoy::ConvoyError;
use cv_core::{ConvoyId, SimConfig, Tick};
use cv_physics::{MotionState, VehicleSpec};
use tracing::info;

use crate::{Convoy, Direction, Fleet, Phase, Route, SimError, SimResult, Train};

/// One convoy to place on the route.
#[derive(Clone, Debug)]
pub struct ConvoyPlan {
    pub name:     String,
    /// Front first.
    pub vehicles: Vec<Arc<VehicleSpec>>,
    /// Start fully loaded instead of empty.
    pub loaded:   bool,
    /// First tick the convoy may move.
    pub depart:   Tick,
}

impl ConvoyPlan {
    pub fn new(name: impl Into<String>, vehicles: Vec<Arc<VehicleSpec>>) -> Self {
        Self {
            name: name.into(),
            vehicles,
            loaded: false,
            depart: Tick::ZERO,
        }
    }

    pub fn loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    pub fn departing_at(mut self, tick: Tick) -> Self {
        self.depart = tick;
        self
    }
}

/// Fluent builder for [`Fleet`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, engine ticks per step, physics settings
/// - [`Route`]: the sections every convoy shuttles along
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                        |
/// |---------------------|--------------------------------|
/// | `.convoy(plan)`     | none; at least one is required |
/// | `.dwell_ticks(n)`   | 0                              |
///
/// # Example
///
/// ```rust,ignore
/// let mut fleet = FleetBuilder::new(config, route)
///     .convoy(ConvoyPlan::new("coal 1", vec![loco.clone(), hopper.clone()]).loaded())
///     .dwell_ticks(30)
///     .build()?;
/// fleet.run(&mut NoopObserver)?;
/// ```
pub struct FleetBuilder {
    config: SimConfig,
    route:  Route,
    plans:  Vec<ConvoyPlan>,
    dwell:  u64,
}

impl FleetBuilder {
    pub fn new(config: SimConfig, route: Route) -> Self {
        Self {
            config,
            route,
            plans: Vec::new(),
            dwell: 0,
        }
    }

    pub fn convoy(mut self, plan: ConvoyPlan) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn convoys(mut self, plans: impl IntoIterator<Item = ConvoyPlan>) -> Self {
        self.plans.extend(plans);
        self
    }

    /// Ticks a convoy stands at each route end before heading back.
    pub fn dwell_ticks(mut self, ticks: u64) -> Self {
        self.dwell = ticks;
        self
    }

    /// Validate inputs, place every convoy at the route start and return a
    /// ready-to-run [`Fleet`].
    pub fn build(self) -> SimResult<Fleet> {
        self.config.validate()?;
        if self.plans.is_empty() {
            return Err(SimError::Config("a fleet needs at least one convoy".into()));
        }

        let mut convoys = Vec::with_capacity(self.plans.len());
        for (i, plan) in self.plans.into_iter().enumerate() {
            let id = ConvoyId::try_from(i)
                .map_err(|_| SimError::Config(format!("too many convoys ({i})")))?;
            convoys.push(place(id, plan, &self.route)?);
        }

        info!(
            convoys = convoys.len(),
            sections = self.route.sections().len(),
            route_steps = self.route.len_steps(),
            "fleet built"
        );
        Ok(Fleet {
            clock:       self.config.make_clock(),
            config:      self.config,
            route:       self.route,
            convoys,
            dwell_ticks: self.dwell,
        })
    }
}

fn place(id: ConvoyId, plan: ConvoyPlan, route: &Route) -> SimResult<Convoy> {
    if plan.vehicles.is_empty() {
        return Err(ConvoyError::Empty.into());
    }
    for spec in &plan.vehicles {
        spec.validate()?;
        if let Some(section) = route.sections().iter().find(|s| s.way != spec.way) {
            return Err(SimError::WayMismatch {
                convoy:  plan.name,
                vehicle: spec.name.clone(),
                way:     section.way,
            });
        }
    }

    let mut train = Train::new(plan.vehicles);
    if plan.loaded {
        train.fill();
    }

    let direction = Direction::Forward;
    let position = route.end_position(direction.reversed());
    let mut convoy = Convoy {
        id,
        name: plan.name,
        train,
        cache: Default::default(),
        motion: MotionState::default(),
        position,
        direction,
        section: route.section_at(position, direction),
        phase: Phase::Waiting { until: plan.depart },
        stalled: false,
        trips: 0,
    };
    let section = convoy.section;
    convoy.enter_section(route, section);
    Ok(convoy)
}
