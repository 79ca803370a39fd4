use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("nothing to compress: input is empty")]
    EmptyInput,

    #[error("compression ineffective: {compressed} bytes is not smaller than the original {original} bytes")]
    IneffectiveCompression { original: usize, compressed: usize },

    #[error("invalid container format: {0}")]
    InvalidFormat(String),

    #[error("corrupt container: {0}")]
    CorruptContainer(String),

    #[error("input too large: {0} bytes exceeds the container limit")]
    InputTooLarge(usize),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
