use crate::solver::SolverError;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid layout configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown diagram family: {family}")]
    UnknownDiagramFamily { family: String },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl LayoutError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
