/// Errors surfaced to callers of the bridge's public operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] sidelink_frame::FrameError),

    /// The relay attempt through a carrier failed.
    ///
    /// Not retried by the bridge; the retry loop covers carrier
    /// *availability*, not delivery failure.
    #[error("send via carrier {carrier:?} failed: {source}")]
    Send {
        carrier: String,
        source: std::io::Error,
    },

    /// A server name argument was empty or whitespace.
    #[error("server name must not be empty")]
    EmptyServerName,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
