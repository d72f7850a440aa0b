use thiserror::Error;

pub type ScoreboardResult<T> = Result<T, ScoreboardError>;

#[derive(Error, Debug)]
pub enum ScoreboardError {
    #[error("contest not found: {0}")]
    NotFound(String),

    /// Malformed or missing input. Fails the whole computation.
    #[error("invalid contest data: {0}")]
    Data(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScoreboardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScoreboardError::NotFound(_))
    }
}

impl From<serde_json::Error> for ScoreboardError {
    fn from(err: serde_json::Error) -> Self {
        ScoreboardError::Data(err.to_string())
    }
}
