use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    #[error("Invalid arrival time '{0}': expected HH:MM")]
    InvalidArrivalTime(String),
}
