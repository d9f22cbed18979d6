use std::{error::Error, fmt::Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// 不合法分组大小
    InvalidBlockSize { target: usize, real: usize },

    /// 不合法的密钥长度
    InvalidKeySize { target: usize, real: usize },

    /// malformed key record or signature string
    Format(String),

    /// empty or structurally invalid bytes handed to the transform or the envelope
    Encoding(String),

    /// key generation could not produce acceptable parameters
    Generation(String),

    /// an envelope operation called out of order
    InvalidState(String),

    Io(String),

    Other(String),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBlockSize { target, real } => f.write_fmt(format_args!(
                "Invalid block data size `{real}` not match to target size `{target}`"
            )),
            CipherError::InvalidKeySize { target, real } => {
                f.write_fmt(format_args!("Invalid key size `{real}` not match to target size `{target}`"))
            },
            CipherError::Format(s) => write!(f, "format error: {s}"),
            CipherError::Encoding(s) => write!(f, "encoding error: {s}"),
            CipherError::Generation(s) => write!(f, "key generation failed: {s}"),
            CipherError::InvalidState(s) => write!(f, "invalid state: {s}"),
            CipherError::Io(s) => write!(f, "io error: {s}"),
            CipherError::Other(s) => f.write_str(s),
        }
    }
}

impl Error for CipherError {}

impl From<std::io::Error> for CipherError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
