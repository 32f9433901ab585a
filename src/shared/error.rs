/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Direction;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Error)]
pub enum ElevatorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("floor {floor} is outside the configured range 0..{n_floors}")]
    InvalidFloorRequest { floor: u8, n_floors: u8 },

    #[error("floor {floor} has no {direction} call button")]
    UnavailableDirection { floor: u8, direction: Direction },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid call input '{0}'")]
    InvalidInput(String),

    #[error("simulation runner has stopped")]
    RunnerStopped,
}

pub type ElevatorResult<T> = Result<T, ElevatorError>;
