use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvoyError {
    #[error("a live convoy needs at least one vehicle")]
    Empty,
}

pub type ConvoyResult<T> = Result<T, ConvoyError>;
