use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TinyRsaError {
    #[error("`{0}` holds a public key only, this operation needs a key pair")]
    KeyPairRequired(String),

    #[error("The path {0} not exist")]
    PathNotExist(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
