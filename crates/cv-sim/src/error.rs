use cv_convoy::ConvoyError;
use cv_core::{CvError, WayType};
use cv_physics::PhysicsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("fleet configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CvError),

    #[error("vehicle error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("convoy error: {0}")]
    Convoy(#[from] ConvoyError),

    #[error("convoy {convoy:?}: vehicle {vehicle:?} cannot run on {way}")]
    WayMismatch {
        convoy:  String,
        vehicle: String,
        way:     WayType,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SimResult<T> = Result<T, SimError>;
