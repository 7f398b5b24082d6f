use growbuf::GrowBufError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, StreamError>;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StreamError {
    #[error("I/O error: {0:?}")]
    Io(embedded_io::ErrorKind),

    #[error("Formatting buffer: {0}")]
    Buffer(#[from] GrowBufError),

    #[error("Formatting failed")]
    Format,
}

impl From<embedded_io::ErrorKind> for StreamError {
    fn from(kind: embedded_io::ErrorKind) -> Self {
        StreamError::Io(kind)
    }
}

impl embedded_io::Error for StreamError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            StreamError::Io(kind) => *kind,
            StreamError::Buffer(_) => embedded_io::ErrorKind::OutOfMemory,
            StreamError::Format => embedded_io::ErrorKind::Other,
        }
    }
}
