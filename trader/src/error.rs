use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("no feed products configured")]
    NoProducts,
}
