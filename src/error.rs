//! Error types.
//!
//! Nothing in here crosses the reader/selector boundary: collection failures
//! are logged and absorbed. These cover startup configuration and the
//! internals of the rtnetlink query.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration, detected before collection starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsafe or invalid path {path}: {source}")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("collector priority list is empty")]
    EmptyPriority,
}

/// Failure while querying VF data over rtnetlink.
#[derive(Debug, Error)]
pub enum NetlinkError {
    #[error("netlink socket error: {0}")]
    Socket(#[from] std::io::Error),

    #[error("failed to parse netlink message: {0}")]
    Parse(String),

    #[error("kernel returned error {code} for {pf}")]
    Kernel { pf: String, code: i32 },

    #[error("no link message received for {0}")]
    NoLink(String),

    #[error("rtnetlink is not available on this platform")]
    Unsupported,
}

pub type NetlinkResult<T> = std::result::Result<T, NetlinkError>;
