//! Canonical access log entities

use crate::core::{error::*, hash::HashPrimitive, types::*};
use crate::proofs::proof::{Proof, VerificationOutcome};
use crate::proofs::region::calculate_root_hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Kind of memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Read,
    Write,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => write!(f, "read"),
            AccessType::Write => write!(f, "write"),
        }
    }
}

/// A single read or write of an aligned `2^log2_size` node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    access_type: AccessType,
    address: u64,
    log2_size: u32,
    read: Vec<u8>,
    written: Option<Vec<u8>>,
    proof: Option<Proof>,
}

fn check_data(name: &str, log2_size: u32, data: &[u8]) -> Result<()> {
    let expected = size_of_log2(log2_size).ok_or_else(|| {
        MerkleError::invalid_geometry(format!("{} of 2^{} bytes cannot be held", name, log2_size))
    })?;
    if data.len() != expected {
        return Err(MerkleError::invalid_buffer_size(expected as u64, data.len()));
    }
    Ok(())
}

impl Access {
    fn checked(
        access_type: AccessType,
        address: u64,
        log2_size: u32,
        read: Vec<u8>,
        written: Option<Vec<u8>>,
        proof: Option<Proof>,
    ) -> Result<Self> {
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&log2_size) {
            return Err(MerkleError::log2_out_of_range(
                log2_size,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        check_data("read", log2_size, &read)?;
        if let Some(written) = &written {
            check_data("written", log2_size, written)?;
        }
        if let Some(proof) = &proof {
            if proof.target_address() != address || proof.log2_target_size() != log2_size {
                return Err(MerkleError::invalid_proof(format!(
                    "proof targets 2^{} at {:#x}, access is 2^{} at {:#x}",
                    proof.log2_target_size(),
                    proof.target_address(),
                    log2_size,
                    address
                )));
            }
        }
        Ok(Self {
            access_type,
            address,
            log2_size,
            read,
            written,
            proof,
        })
    }

    /// Create a read access; `read` must hold exactly `2^log2_size` bytes
    pub fn new_read(
        address: u64,
        log2_size: u32,
        read: Vec<u8>,
        proof: Option<Proof>,
    ) -> Result<Self> {
        Self::checked(AccessType::Read, address, log2_size, read, None, proof)
    }

    /// Create a write access; `read` holds the bytes before the write
    pub fn new_write(
        address: u64,
        log2_size: u32,
        read: Vec<u8>,
        written: Vec<u8>,
        proof: Option<Proof>,
    ) -> Result<Self> {
        Self::checked(
            AccessType::Write,
            address,
            log2_size,
            read,
            Some(written),
            proof,
        )
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn log2_size(&self) -> u32 {
        self.log2_size
    }

    /// Bytes of the node before the access
    pub fn read(&self) -> &[u8] {
        &self.read
    }

    /// Bytes of the node after a write; `None` for reads
    pub fn written(&self) -> Option<&[u8]> {
        self.written.as_deref()
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    /// Drop the proof, if any
    pub fn without_proof(mut self) -> Self {
        self.proof = None;
        self
    }

    /// Check that the proof covers the bytes read and leads to its claimed root.
    ///
    /// A mismatch is reported as an outcome; only a missing proof is an error.
    pub fn check_proof<H: HashPrimitive + ?Sized>(&self, hasher: &H) -> Result<VerificationOutcome> {
        let proof = self
            .proof
            .as_ref()
            .ok_or_else(|| MerkleError::invalid_proof("access carries no proof"))?;
        let read_hash = calculate_root_hash(hasher, &self.read, self.log2_size)?;
        if read_hash != *proof.target_hash() {
            return Ok(VerificationOutcome::Mismatch {
                claimed: *proof.target_hash(),
                computed: read_hash,
            });
        }
        Ok(proof.verify(hasher))
    }
}

/// Whether a bracket opens or closes a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BracketType {
    Begin,
    End,
}

/// Annotation marking the start or end of a scope in the access sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketNote {
    pub bracket_type: BracketType,
    /// Number of accesses recorded before the bracket
    pub position: usize,
    pub text: String,
}

/// What an access log records besides the accesses themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogType {
    #[serde(default)]
    pub proofs: bool,
    #[serde(default)]
    pub annotations: bool,
}

impl AccessLogType {
    pub fn new(proofs: bool, annotations: bool) -> Self {
        Self {
            proofs,
            annotations,
        }
    }
}

/// Brackets and notes of an annotated log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub brackets: Vec<BracketNote>,
    pub notes: Vec<String>,
}

/// Ordered record of the accesses made by a step of the machine
///
/// `annotations` is present exactly when the log type asks for them, and every
/// access carries a proof exactly when the log type asks for proofs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLog {
    log_type: AccessLogType,
    accesses: Vec<Access>,
    annotations: Option<Annotations>,
}

impl AccessLog {
    /// Create an empty log
    pub fn new(log_type: AccessLogType) -> Self {
        Self {
            log_type,
            accesses: Vec::new(),
            annotations: log_type.annotations.then(Annotations::default),
        }
    }

    /// Assemble a log from parts, checking every invariant
    pub fn from_parts(
        log_type: AccessLogType,
        accesses: Vec<Access>,
        annotations: Option<Annotations>,
    ) -> Result<Self> {
        for (index, access) in accesses.iter().enumerate() {
            Self::check_access(log_type, index, access)?;
        }
        match (&annotations, log_type.annotations) {
            (Some(annotations), true) => {
                for (index, bracket) in annotations.brackets.iter().enumerate() {
                    if bracket.position > accesses.len() {
                        return Err(MerkleError::invalid_bracket(
                            index,
                            format!(
                                "position {} is past the {} accesses",
                                bracket.position,
                                accesses.len()
                            ),
                        ));
                    }
                }
            }
            (None, false) => {}
            (Some(_), false) => {
                return Err(MerkleError::invalid_access_log(
                    "annotations present on a log without annotations",
                ))
            }
            (None, true) => {
                return Err(MerkleError::invalid_access_log(
                    "annotated log is missing brackets and notes",
                ))
            }
        }
        debug!(
            accesses = accesses.len(),
            proofs = log_type.proofs,
            annotations = log_type.annotations,
            "access log assembled"
        );
        Ok(Self {
            log_type,
            accesses,
            annotations,
        })
    }

    fn check_access(log_type: AccessLogType, index: usize, access: &Access) -> Result<()> {
        match (log_type.proofs, access.proof.is_some()) {
            (true, false) => Err(MerkleError::invalid_access(index, "missing proof")),
            (false, true) => Err(MerkleError::invalid_access(
                index,
                "proof present on a log without proofs",
            )),
            _ => Ok(()),
        }
    }

    /// Append an access
    pub fn push_access(&mut self, access: Access) -> Result<()> {
        Self::check_access(self.log_type, self.accesses.len(), &access)?;
        self.accesses.push(access);
        Ok(())
    }

    fn annotations_mut(&mut self) -> Result<&mut Annotations> {
        self.annotations
            .as_mut()
            .ok_or_else(|| MerkleError::invalid_access_log("log does not record annotations"))
    }

    /// Record a bracket at the current position
    pub fn push_bracket(&mut self, bracket_type: BracketType, text: impl Into<String>) -> Result<()> {
        let position = self.accesses.len();
        self.annotations_mut()?.brackets.push(BracketNote {
            bracket_type,
            position,
            text: text.into(),
        });
        Ok(())
    }

    pub fn push_note(&mut self, text: impl Into<String>) -> Result<()> {
        self.annotations_mut()?.notes.push(text.into());
        Ok(())
    }

    pub fn log_type(&self) -> AccessLogType {
        self.log_type
    }

    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    /// Brackets, empty for logs without annotations
    pub fn brackets(&self) -> &[BracketNote] {
        self.annotations
            .as_ref()
            .map(|a| a.brackets.as_slice())
            .unwrap_or_default()
    }

    /// Notes, empty for logs without annotations
    pub fn notes(&self) -> &[String] {
        self.annotations
            .as_ref()
            .map(|a| a.notes.as_slice())
            .unwrap_or_default()
    }

    /// Check the proof of every access, in order
    pub fn verify_proofs<H: HashPrimitive + ?Sized>(
        &self,
        hasher: &H,
    ) -> Result<Vec<VerificationOutcome>> {
        if !self.log_type.proofs {
            return Err(MerkleError::invalid_access_log("log does not record proofs"));
        }
        self.accesses
            .iter()
            .map(|access| access.check_proof(hasher))
            .collect()
    }
}
