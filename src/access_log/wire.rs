//! External representation of access logs
//!
//! Byte payloads travel as lowercase hex strings without a prefix and bracket
//! positions are 1-based. Parsing checks every structural invariant before an
//! `AccessLog` exists. Proofs, brackets and notes are kept as raw JSON until the
//! log type says they are in use, so fields a log does not declare are never
//! decoded.

use crate::access_log::types::*;
use crate::core::error::*;
use crate::proofs::proof::Proof;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Access as found on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAccess {
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub address: u64,
    pub log2_size: u32,
    pub read: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
    /// Decoded as a `Proof` only on logs with proofs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
}

/// Bracket as found on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBracketNote {
    #[serde(rename = "type")]
    pub bracket_type: BracketType,
    /// 1-based
    #[serde(rename = "where")]
    pub where_: u64,
    pub text: String,
}

/// Access log as found on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAccessLog {
    pub log_type: AccessLogType,
    pub accesses: Vec<WireAccess>,
    /// List of `WireBracketNote`, decoded only on annotated logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<Value>,
    /// List of strings, decoded only on annotated logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

fn decode_bytes(index: usize, field: &str, hex_data: &str) -> Result<Vec<u8>> {
    if hex_data.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(MerkleError::invalid_access(
            index,
            format!("{} must be lowercase hex", field),
        ));
    }
    hex::decode(hex_data)
        .map_err(|e| MerkleError::invalid_access(index, format!("invalid {}: {}", field, e)))
}

fn parse_access(index: usize, wire: WireAccess, proofs: bool) -> Result<Access> {
    let proof = if proofs {
        let value = wire
            .proof
            .ok_or_else(|| MerkleError::invalid_access(index, "missing proof"))?;
        let proof: Proof = serde_json::from_value(value)
            .map_err(|e| MerkleError::invalid_access(index, format!("invalid proof: {}", e)))?;
        Some(proof)
    } else {
        if wire.proof.is_some() {
            warn!(index, "ignoring proof on a log without proofs");
        }
        None
    };
    let read = decode_bytes(index, "read", &wire.read)?;
    let access = match (wire.access_type, wire.written) {
        (AccessType::Read, None) => Access::new_read(wire.address, wire.log2_size, read, proof),
        (AccessType::Write, Some(written)) => {
            let written = decode_bytes(index, "written", &written)?;
            Access::new_write(wire.address, wire.log2_size, read, written, proof)
        }
        (AccessType::Read, Some(_)) => {
            return Err(MerkleError::invalid_access(index, "written data on a read"))
        }
        (AccessType::Write, None) => {
            return Err(MerkleError::invalid_access(index, "missing written data"))
        }
    };
    access.map_err(|e| MerkleError::invalid_access(index, e.to_string()))
}

fn parse_bracket(index: usize, wire: WireBracketNote, access_count: usize) -> Result<BracketNote> {
    let position = wire
        .where_
        .checked_sub(1)
        .ok_or_else(|| MerkleError::invalid_bracket(index, "where is 1-based"))?;
    if position > access_count as u64 {
        return Err(MerkleError::invalid_bracket(
            index,
            format!("where {} is past the {} accesses", wire.where_, access_count),
        ));
    }
    Ok(BracketNote {
        bracket_type: wire.bracket_type,
        position: position as usize,
        text: wire.text,
    })
}

impl TryFrom<WireAccessLog> for AccessLog {
    type Error = MerkleError;

    fn try_from(wire: WireAccessLog) -> Result<Self> {
        let log_type = wire.log_type;
        let accesses = wire
            .accesses
            .into_iter()
            .enumerate()
            .map(|(index, access)| parse_access(index, access, log_type.proofs))
            .collect::<Result<Vec<_>>>()?;

        let annotations = if log_type.annotations {
            let brackets = wire
                .brackets
                .ok_or_else(|| MerkleError::invalid_access_log("missing brackets"))?;
            let notes = wire
                .notes
                .ok_or_else(|| MerkleError::invalid_access_log("missing notes"))?;
            let brackets: Vec<WireBracketNote> = serde_json::from_value(brackets)
                .map_err(|e| MerkleError::invalid_access_log(format!("invalid brackets: {}", e)))?;
            let notes: Vec<String> = serde_json::from_value(notes)
                .map_err(|e| MerkleError::invalid_access_log(format!("invalid notes: {}", e)))?;
            let brackets = brackets
                .into_iter()
                .enumerate()
                .map(|(index, bracket)| parse_bracket(index, bracket, accesses.len()))
                .collect::<Result<Vec<_>>>()?;
            Some(Annotations { brackets, notes })
        } else {
            if wire.brackets.is_some() || wire.notes.is_some() {
                warn!("ignoring brackets and notes on a log without annotations");
            }
            None
        };

        debug!(accesses = accesses.len(), "access log parsed");
        AccessLog::from_parts(log_type, accesses, annotations)
    }
}

impl TryFrom<&Access> for WireAccess {
    type Error = MerkleError;

    fn try_from(access: &Access) -> Result<Self> {
        Ok(Self {
            access_type: access.access_type(),
            address: access.address(),
            log2_size: access.log2_size(),
            read: hex::encode(access.read()),
            written: access.written().map(hex::encode),
            proof: access.proof().map(serde_json::to_value).transpose()?,
        })
    }
}

impl TryFrom<&AccessLog> for WireAccessLog {
    type Error = MerkleError;

    fn try_from(log: &AccessLog) -> Result<Self> {
        let accesses = log
            .accesses()
            .iter()
            .map(WireAccess::try_from)
            .collect::<Result<Vec<_>>>()?;
        let (brackets, notes) = match log.annotations() {
            Some(annotations) => {
                let brackets: Vec<WireBracketNote> = annotations
                    .brackets
                    .iter()
                    .map(|b| WireBracketNote {
                        bracket_type: b.bracket_type,
                        where_: b.position as u64 + 1,
                        text: b.text.clone(),
                    })
                    .collect();
                (
                    Some(serde_json::to_value(brackets)?),
                    Some(serde_json::to_value(&annotations.notes)?),
                )
            }
            None => (None, None),
        };
        Ok(Self {
            log_type: log.log_type(),
            accesses,
            brackets,
            notes,
        })
    }
}

impl AccessLog {
    /// Parse a log from its JSON wire form
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: WireAccessLog = serde_json::from_str(json)?;
        AccessLog::try_from(wire)
    }

    /// Serialize the log to its JSON wire form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&WireAccessLog::try_from(self)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_entry(address: u64) -> WireAccess {
        WireAccess {
            access_type: AccessType::Read,
            address,
            log2_size: 3,
            read: "00".repeat(8),
            written: None,
            proof: None,
        }
    }

    #[test]
    fn test_where_is_one_based() {
        let wire = WireAccessLog {
            log_type: AccessLogType::new(false, true),
            accesses: vec![read_entry(0)],
            brackets: Some(json!([{"type": "begin", "where": 1, "text": "step"}])),
            notes: Some(json!([])),
        };
        let log = AccessLog::try_from(wire.clone()).unwrap();
        assert_eq!(log.brackets()[0].position, 0);
        assert_eq!(WireAccessLog::try_from(&log).unwrap(), wire);
    }

    #[test]
    fn test_where_zero_rejected() {
        let wire = WireAccessLog {
            log_type: AccessLogType::new(false, true),
            accesses: vec![],
            brackets: Some(json!([{"type": "end", "where": 0, "text": ""}])),
            notes: Some(json!([])),
        };
        let err = AccessLog::try_from(wire).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidBracket { index: 0, .. }));
    }

    #[test]
    fn test_malformed_brackets_rejected_when_annotated() {
        let wire = WireAccessLog {
            log_type: AccessLogType::new(false, true),
            accesses: vec![],
            brackets: Some(json!([{"type": "middle", "where": 1}])),
            notes: Some(json!([])),
        };
        let err = AccessLog::try_from(wire).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidAccessLog { .. }));
    }

    #[test]
    fn test_written_on_read_rejected() {
        let mut entry = read_entry(0);
        entry.written = Some("11".repeat(8));
        let wire = WireAccessLog {
            log_type: AccessLogType::default(),
            accesses: vec![read_entry(8), entry],
            brackets: None,
            notes: None,
        };
        let err = AccessLog::try_from(wire).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidAccess { index: 1, .. }));
    }

    #[test]
    fn test_non_canonical_hex_rejected() {
        for read in ["AB".repeat(8), format!("0x{}", "ab".repeat(8))] {
            let mut entry = read_entry(0);
            entry.read = read;
            let wire = WireAccessLog {
                log_type: AccessLogType::default(),
                accesses: vec![entry],
                brackets: None,
                notes: None,
            };
            let err = AccessLog::try_from(wire).unwrap_err();
            assert!(matches!(err, MerkleError::InvalidAccess { index: 0, .. }));
        }
    }

    #[test]
    fn test_log_type_flags_default_to_false() {
        let log = AccessLog::from_json(r#"{"log_type": {}, "accesses": []}"#).unwrap();
        assert_eq!(log.log_type(), AccessLogType::new(false, false));
    }
}
