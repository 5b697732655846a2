//! Error types for `cv-physics`.
//!
//! The physics itself never fails: degenerate inputs collapse to 0 or to the
//! documented sentinels.  Errors only come from catalog validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("vehicle '{0}' has zero weight")]
    ZeroWeight(String),

    #[error("vehicle '{0}' has an engine but a gear ratio of 0")]
    ZeroGear(String),

    #[error("vehicle '{name}' has non-positive top speed {kmh} km/h")]
    TopSpeed { name: String, kmh: i32 },

    #[error("vehicle '{name}' has inverted freight weight range {min}..{max} kg")]
    FreightRange { name: String, min: u32, max: u32 },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
