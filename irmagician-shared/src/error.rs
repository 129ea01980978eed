use std::io;

/// Errors reported by the link, the session and the waveform store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial or file read/write/open failure. The operation in progress is
    /// abandoned, nothing is retried.
    #[error("I/O error: {0}")]
    Transport(#[from] io::Error),

    /// A reply did not have the expected shape. Holds the device text verbatim,
    /// the device does not mark errors in any other way.
    #[error("{0}")]
    Protocol(String),

    /// The operation depends on state that was never established.
    #[error("missing precondition: {0}")]
    State(&'static str),

    /// A persisted waveform document has malformed content.
    #[error("malformed waveform document: {0}")]
    Format(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Device text carried by a protocol error.
    pub fn device_text(&self) -> Option<&str> {
        match self {
            Error::Protocol(text) => Some(text),
            _ => None,
        }
    }
}
