use std::io;

use thiserror::Error;

/// Errors surfaced by the frame codec and bus channels.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed identifier, payload or interface spec.
    #[error("invalid format: {0}")]
    Format(String),

    /// The named interface does not exist or could not be opened.
    #[error("CAN interface '{iface}' unavailable: {source}")]
    ChannelUnavailable {
        iface: String,
        #[source]
        source: io::Error,
    },

    /// Transmission or reception failure on an open channel.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
