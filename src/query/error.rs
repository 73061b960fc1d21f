use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid sort column: {0}")]
    InvalidColumn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
