//! `cv-convoy` — lazy caching and the convoy variants.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`cache`]     | `Cached<T>`, `ConvoyCache` with cascading invalidation          |
//! | [`source`]    | `ConvoySource`, `LoadedSource` — where summaries come from      |
//! | [`lazy`]      | `LazyConvoy<S>` — memoizing `ConvoyPhysics` implementation      |
//! | [`potential`] | `PotentialConvoy` — planning over descriptor lists              |
//! | [`existing`]  | `ExistingConvoy`, `ConvoyEntity`, `LiveVehicle` — live convoys  |
//! | [`error`]     | `ConvoyError`, `ConvoyResult<T>`                                |
//!
//! # Usage
//!
//! ```text
//! let mut plan = PotentialConvoy::new(vec![&loco, &wagon, &wagon], config).lazy();
//! let loaded = plan.weight_with_load(plan.freight_summary().max_freight_weight);
//! let kmh = plan.calc_max_speed(&loaded);
//! ```
//!
//! A live convoy is wrapped per update and its cache carried across ticks:
//!
//! ```text
//! let source = ExistingConvoy::new(&train, config)?;
//! let mut convoy = LazyConvoy::from_parts(source, cache);
//! convoy.move_convoy(&request, &mut state);
//! let (_, cache) = convoy.into_parts();
//! ```

pub mod cache;
pub mod error;
pub mod existing;
pub mod lazy;
pub mod potential;
pub mod source;


pub use cache::{Cached, ConvoyCache};
pub use error::{ConvoyError, ConvoyResult};
pub use existing::{ConvoyEntity, ExistingConvoy, LiveVehicle};
pub use lazy::LazyConvoy;
pub use potential::PotentialConvoy;
pub use source::{ConvoySource, LoadedSource};
