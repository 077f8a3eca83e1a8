//! Access logs: the record of memory accesses, with optional proofs and
//! annotations, exchanged with external verifiers

pub mod types;
pub mod wire;

pub use types::{
    Access, AccessLog, AccessLogType, AccessType, Annotations, BracketNote, BracketType,
};
pub use wire::{WireAccess, WireAccessLog, WireBracketNote};
