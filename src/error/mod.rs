//! Error handling for the ledger
//!
//! This module provides the error types for all ledger operations.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum BlockchainError {
    /// Required request fields are missing or unusable
    MalformedInput(String),
    /// The chain has no blocks (only possible before genesis)
    EmptyChain,
    /// A peer could not be reached
    PeerUnreachable { peer: String, reason: String },
    /// A peer answered with something other than the expected reply
    PeerBadResponse { peer: String, reason: String },
    /// Network communication errors outside peer synchronization
    Network(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Proof-of-work search was stopped before a nonce was found
    MiningCancelled,
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            BlockchainError::EmptyChain => write!(f, "Chain is empty"),
            BlockchainError::PeerUnreachable { peer, reason } => {
                write!(f, "Peer {peer} unreachable: {reason}")
            }
            BlockchainError::PeerBadResponse { peer, reason } => {
                write!(f, "Bad response from peer {peer}: {reason}")
            }
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::MiningCancelled => write!(f, "Mining cancelled"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl BlockchainError {
    /// Whether this error came from talking to a peer and should only skip that peer
    pub fn is_peer_error(&self) -> bool {
        matches!(
            self,
            BlockchainError::PeerUnreachable { .. } | BlockchainError::PeerBadResponse { .. }
        )
    }
}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BlockchainError {
    fn from(err: serde_json::Error) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_errors_are_recoverable() {
        let unreachable = BlockchainError::PeerUnreachable {
            peer: "127.0.0.1:5001".to_string(),
            reason: "connection refused".to_string(),
        };
        let bad = BlockchainError::PeerBadResponse {
            peer: "127.0.0.1:5001".to_string(),
            reason: "unexpected reply".to_string(),
        };

        assert!(unreachable.is_peer_error());
        assert!(bad.is_peer_error());
        assert!(!BlockchainError::EmptyChain.is_peer_error());
        assert!(!BlockchainError::MalformedInput("sender".to_string()).is_peer_error());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::MalformedInput("missing amount".to_string());
        assert_eq!(err.to_string(), "Malformed input: missing amount");
        assert_eq!(BlockchainError::EmptyChain.to_string(), "Chain is empty");
    }
}
