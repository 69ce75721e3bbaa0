use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn storage(context: &'static str, err: anyhow::Error) -> Self {
        AppError::Internal(err.context(context))
    }
}
