use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Identity, ownership and validation errors are safe to show as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::DuplicateUsername
                | AppError::InvalidCredentials
                | AppError::NotFound
                | AppError::Validation(_)
        )
    }

    pub fn user_message(&self) -> String {
        if self.is_user_facing() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }
}
