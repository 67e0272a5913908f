//! The `error` module defines the [`SrecError`] enum that describes the errors that
//! can occur while turning a binary payload into Motorola S-records.
//!
//! Every failure is reported from the single encoding entry point and no partial
//! output is ever returned alongside it. The variants fall into three groups:
//! 1. Configuration problems (address width, header contents).
//! 2. Format capacity limits (record count, byte-count field, address field).
//! 3. Record type tags that do not name a known S-record type.

use crate::record::RecordType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SrecError {
    /// Address width resolved to a data record type outside of S1..S3
    #[error("expected data record type 1..3, but got {0}")]
    Configuration(i64),
    /// Record count does not fit into an S6 count record
    #[error("too many records {0}")]
    TooManyRecords(usize),
    /// Tag does not name a supported record type
    #[error("expected record type 0..3 or 5..9, but got {0}")]
    InvalidRecordType(String),
    /// Only data record types have a start address (termination) partner
    #[error("record type {0} has no termination record counterpart")]
    NoTerminationType(RecordType),
    /// Header must be made of single-byte (ASCII) characters
    #[error("header contains non-ASCII character {0:?} at position {1}")]
    NonAsciiHeader(char, usize),
    /// Byte-count field of a record would exceed 0xFF
    #[error("record of type {0} would need a byte count of {1}, max is 255")]
    RecordTooLong(RecordType, usize),
    /// Address does not fit into the address field of the record type
    #[error("address 0x{1:X} does not fit into the address field of record type {0}")]
    AddressOverflow(RecordType, u64),
    /// Checksum input was not a valid sequence of hex byte pairs
    #[error("invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
