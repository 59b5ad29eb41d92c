use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("No game loaded")]
    NoGame,

    #[error("Move {index} out of range ({total} moves)")]
    MoveOutOfRange { index: usize, total: usize },

    #[error("Replay driver stopped")]
    DriverStopped,
}
