use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid {kind} id: {value:?}")]
    InvalidSnowflake { kind: &'static str, value: String },
}
