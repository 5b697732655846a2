//! Fleet observer trait for progress reporting and data collection.

use cv_core::Tick;

use crate::{Convoy, Route, Section};

/// Callbacks invoked by [`Fleet::run`][crate::Fleet::run] at key points in
/// the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Per-convoy callbacks fire after every
/// convoy has moved, in ascending `ConvoyId` order.
///
/// # Example: arrival counter
///
/// ```rust,ignore
/// struct Arrivals(usize);
///
/// impl FleetObserver for Arrivals {
///     fn on_arrival(&mut self, _tick: Tick, _convoy: &Convoy) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait FleetObserver {
    /// Called at the very start of each tick, before any convoy moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.  `moving` is the number of convoys
    /// with a non-zero speed.
    fn on_tick_end(&mut self, _tick: Tick, _moving: usize) {}

    /// A waiting convoy started this tick.
    fn on_departure(&mut self, _tick: Tick, _convoy: &Convoy) {}

    /// The convoy's head crossed into `section`.
    fn on_section_entered(&mut self, _tick: Tick, _convoy: &Convoy, _section: &Section) {}

    /// The convoy stopped at a route end, swapped its load and turned round.
    fn on_arrival(&mut self, _tick: Tick, _convoy: &Convoy) {}

    /// The convoy came to a halt short of the route end and cannot restart
    /// at its current load and position.
    fn on_stall(&mut self, _tick: Tick, _convoy: &Convoy) {}

    /// Called every `config.trace_interval_ticks` ticks with read-only
    /// access to all convoys.
    fn on_trace(&mut self, _tick: Tick, _convoys: &[Convoy], _route: &Route) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`FleetObserver`] that does nothing.
pub struct NoopObserver;

impl FleetObserver for NoopObserver {}
