use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The endpoint or probe settings are malformed. Raised before any socket is opened.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The TCP connect or the websocket upgrade failed.
    #[error("failed to connect to {uri}: {reason}")]
    Connect { uri: String, reason: String },

    /// Nothing arrived within the receive timeout. The probe keeps cycling.
    #[error("timed out waiting for a frame")]
    ReceiveTimeout,

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer sent something that is not a valid websocket frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("remote closed the connection (code {0:?})")]
    RemoteClosed(Option<u16>),

    #[error("cancelled by operator")]
    Cancelled,
}

impl ProbeError {
    pub(crate) fn connect(uri: impl ToString, reason: impl ToString) -> Self {
        ProbeError::Connect {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error ends the probe. Timeouts are the idle steady state
    /// and cancellation is a clean shutdown.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProbeError::ReceiveTimeout | ProbeError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
