//! `cv-core` — foundational types for the `convoy_physics` workspace.
//!
//! Every other `cv-*` crate depends on this one.  It has no `cv-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`fixed`]     | `Fixed` — deterministic fixed-point number               |
//! | [`units`]     | km/h, simulation speed, yards, steps ↔ SI; scale consts  |
//! | [`way`]       | `WayType` enum                                           |
//! | [`ids`]       | `ConvoyId`, `SectionId`                                  |
//! | [`time`]      | `Tick`, `SimClock`                                       |
//! | [`config`]    | `PhysicsConfig`, `SimConfig`, `power_index_to_power`     |
//! | [`error`]     | `CvError`, `CvResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod fixed;
pub mod ids;
pub mod time;
pub mod units;
pub mod way;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{PhysicsConfig, SimConfig, power_index_to_power};
pub use error::{CvError, CvResult};
pub use fixed::Fixed;
pub use ids::{ConvoyId, SectionId};
pub use time::{SimClock, Tick};
pub use way::WayType;
