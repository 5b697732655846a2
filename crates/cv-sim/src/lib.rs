//! `cv-sim` — a fleet driver for live convoys.
//!
//! Convoys shuttle along a [`Route`] of [`Section`]s: they run to the far
//! end, stop, swap their load and head back.  Every tick each convoy is
//! advanced through the `cv-convoy` caching layer with a memoized
//! [`ConvoyCache`][cv_convoy::ConvoyCache] that survives between ticks.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Plan     — nearest brake point among the limits ahead (section
//!                boundaries and the route end)
//!   ② Move     — move_convoy for delta_t_per_tick engine ticks
//!                (parallel with the `parallel` feature)
//!   ③ Position — whole steps taken; new section → invalidate adverse summary
//!   ④ Arrive   — at the route end: stop, swap load → invalidate weight
//!                summary, reverse, dwell
//!   ⑤ Observe  — observer callbacks in ascending ConvoyId order
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                          |
//! |------------|-------------------------------------------------|
//! | `parallel` | Moves convoys on Rayon's thread pool.           |
//! | `serde`    | `Serialize`/`Deserialize` for `Section`, `Direction` and the core types. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cv_sim::{ConvoyPlan, CsvTraceObserver, FleetBuilder, Route, Section};
//!
//! let route = Route::new(vec![Section::new(WayType::Track, 1_440, 120)])?;
//! let mut fleet = FleetBuilder::new(config, route)
//!     .convoy(ConvoyPlan::new("coal 1", consist))
//!     .build()?;
//! let mut trace = CsvTraceObserver::create(Path::new("trace.csv"))?;
//! fleet.run(&mut trace)?;
//! ```

pub mod builder;
pub mod error;
pub mod fleet;
pub mod observer;
pub mod route;
pub mod trace;
pub mod train;


pub use builder::{ConvoyPlan, FleetBuilder};
pub use error::{SimError, SimResult};
pub use fleet::{Convoy, Fleet, Phase, StepReport};
pub use observer::{FleetObserver, NoopObserver};
pub use route::{Direction, LimitPoint, Route, Section};
pub use trace::{CsvTraceObserver, TRACE_HEADER, TraceRow};
pub use train::{Car, Train};
