use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("remote service error: {0}")]
    RemoteService(String),
    #[error("malformed data: {0}")]
    Data(String),
}

pub type AppResult<T> = Result<T, AppError>;
