//! Error types for the machine Merkle tree

use crate::core::types::Hash;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller broke a precondition: the operation aborted without a result
    ContractViolation,
    /// An external representation violates a structural invariant
    ValidationFailure,
    /// An internal invariant was observed broken
    Internal,
    /// Filesystem or configuration trouble
    Environment,
}

/// Main error type for Merkle tree operations
#[derive(Error, Debug)]
pub enum MerkleError {
    /// Contract violations
    #[error("Capacity exceeded: tree already holds {max_pages} pages")]
    CapacityExceeded { max_pages: u64 },

    #[error("Invalid buffer size: expected {expected} bytes, got {actual}")]
    InvalidBufferSize { expected: u64, actual: u64 },

    #[error("Invalid log2 size {log2_size} (expected integer in {min}..={max})")]
    Log2SizeOutOfRange { log2_size: u32, min: u32, max: u32 },

    #[error("Invalid tree geometry: {reason}")]
    InvalidTreeGeometry { reason: String },

    #[error("Address {address:#x} is not aligned to 2^{log2_size}")]
    MisalignedAddress { address: u64, log2_size: u32 },

    #[error("Region at {address:#x} overlaps an existing region")]
    RegionOverlap { address: u64 },

    #[error("Address range {address:#x}+{length} is not backed by a single region")]
    AddressNotMapped { address: u64, length: u64 },

    /// Validation failures
    #[error("Invalid access [{index}]: {reason}")]
    InvalidAccess { index: usize, reason: String },

    #[error("Invalid proof: {reason}")]
    InvalidProof { reason: String },

    #[error("Invalid bracket [{index}]: {reason}")]
    InvalidBracket { index: usize, reason: String },

    #[error("Invalid access log: {reason}")]
    InvalidAccessLog { reason: String },

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Internal invariant violations
    #[error("Internal invariant violated: {message}")]
    InvariantViolation { message: String },

    /// Environment
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Proof root mismatch: claimed {claimed}, computed {computed}")]
    RootMismatch { claimed: Hash, computed: Hash },
}

impl MerkleError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapacityExceeded { .. }
            | Self::InvalidBufferSize { .. }
            | Self::Log2SizeOutOfRange { .. }
            | Self::InvalidTreeGeometry { .. }
            | Self::MisalignedAddress { .. }
            | Self::RegionOverlap { .. }
            | Self::AddressNotMapped { .. } => ErrorKind::ContractViolation,
            Self::InvalidAccess { .. }
            | Self::InvalidProof { .. }
            | Self::InvalidBracket { .. }
            | Self::InvalidAccessLog { .. }
            | Self::JsonSerialization(_)
            | Self::Serialization(_)
            | Self::HexError(_)
            | Self::RootMismatch { .. } => ErrorKind::ValidationFailure,
            Self::InvariantViolation { .. } => ErrorKind::Internal,
            Self::Io(_)
            | Self::ConfigurationError { .. }
            | Self::HomeDirectoryNotFound
            | Self::ConfigNotFound { .. } => ErrorKind::Environment,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        self.kind() == ErrorKind::ContractViolation
    }

    pub fn is_validation_failure(&self) -> bool {
        self.kind() == ErrorKind::ValidationFailure
    }

    /// Create a new invalid buffer size error
    pub fn invalid_buffer_size(expected: u64, actual: usize) -> Self {
        Self::InvalidBufferSize {
            expected,
            actual: actual as u64,
        }
    }

    /// Create a new log2 size out of range error
    pub fn log2_out_of_range(log2_size: u32, min: u32, max: u32) -> Self {
        Self::Log2SizeOutOfRange { log2_size, min, max }
    }

    /// Create a new invalid tree geometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidTreeGeometry {
            reason: reason.into(),
        }
    }

    /// Create a new misaligned address error
    pub fn misaligned(address: u64, log2_size: u32) -> Self {
        Self::MisalignedAddress { address, log2_size }
    }

    /// Create a new invalid access error
    pub fn invalid_access(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidAccess {
            index,
            reason: reason.into(),
        }
    }

    /// Create a new invalid proof error
    pub fn invalid_proof(reason: impl Into<String>) -> Self {
        Self::InvalidProof {
            reason: reason.into(),
        }
    }

    /// Create a new invalid bracket error
    pub fn invalid_bracket(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidBracket {
            index,
            reason: reason.into(),
        }
    }

    /// Create a new invalid access log error
    pub fn invalid_access_log(reason: impl Into<String>) -> Self {
        Self::InvalidAccessLog {
            reason: reason.into(),
        }
    }

    /// Create a new internal invariant error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for Merkle tree operations
pub type Result<T> = std::result::Result<T, MerkleError>;
