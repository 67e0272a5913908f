//! The `record` module defines the [`Record`] and [`RecordType`] which are used for
//! generating Motorola S-records, along with the checksum routines shared by every
//! record type.

use crate::error::SrecError;
use std::fmt;

/// Largest value the one-byte byte-count field can hold.
pub const MAX_BYTE_COUNT: usize = 0xFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    /// S0, vendor specific header at address 0x0000
    Header = 0,
    /// S1, data with a 16-bit address
    Data16 = 1,
    /// S2, data with a 24-bit address
    Data24 = 2,
    /// S3, data with a 32-bit address
    Data32 = 3,
    /// S5, 16-bit count of the data records
    Count16 = 5,
    /// S6, 24-bit count of the data records
    Count24 = 6,
    /// S7, 32-bit start address, terminates S3 data
    Start32 = 7,
    /// S8, 24-bit start address, terminates S2 data
    Start24 = 8,
    /// S9, 16-bit start address, terminates S1 data
    Start16 = 9,
}

impl RecordType {
    /// Parse a record type tag, either bare (`"1"`) or with its start code (`"S1"`).
    ///
    /// # Errors
    /// Returns [`SrecError::InvalidRecordType`] for anything outside of 0..3 and 5..9.
    pub fn parse(s: &str) -> Result<Self, SrecError> {
        let tag = s.strip_prefix('S').unwrap_or(s);
        match tag {
            "0" => Ok(Self::Header),
            "1" => Ok(Self::Data16),
            "2" => Ok(Self::Data24),
            "3" => Ok(Self::Data32),
            "5" => Ok(Self::Count16),
            "6" => Ok(Self::Count24),
            "7" => Ok(Self::Start32),
            "8" => Ok(Self::Start24),
            "9" => Ok(Self::Start16),
            _ => Err(SrecError::InvalidRecordType(s.to_owned())),
        }
    }

    /// Numeric tag that follows the `S` start code.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Length of the address field in bytes.
    #[must_use]
    pub const fn address_len(self) -> usize {
        match self {
            Self::Header | Self::Data16 | Self::Count16 | Self::Start16 => 2,
            Self::Data24 | Self::Count24 | Self::Start24 => 3,
            Self::Data32 | Self::Start32 => 4,
        }
    }

    /// Largest address representable by the address field.
    #[must_use]
    pub const fn max_address(self) -> u64 {
        (1u64 << (8 * self.address_len())) - 1
    }

    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Data16 | Self::Data24 | Self::Data32)
    }

    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(self, Self::Count16 | Self::Count24)
    }

    /// Start address record type that terminates a file of data records of this type
    /// (S1 -> S9, S2 -> S8, S3 -> S7).
    ///
    /// # Errors
    /// Returns [`SrecError::NoTerminationType`] when called on a non-data record type.
    pub fn termination(self) -> Result<Self, SrecError> {
        match self {
            Self::Data16 => Ok(Self::Start16),
            Self::Data24 => Ok(Self::Start24),
            Self::Data32 => Ok(Self::Start32),
            _ => Err(SrecError::NoTerminationType(self)),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.tag())
    }
}

/// A single S-record. Rendering it via [`fmt::Display`] yields the full line
/// (without the trailing newline), checksum included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rtype: RecordType,
    address: u32,
    data: Vec<u8>,
}

impl Record {
    /// Create a record, validating that the address and the byte count fit into
    /// their fields.
    ///
    /// # Errors
    /// - [`SrecError::AddressOverflow`] if `address` is wider than the type's address field.
    /// - [`SrecError::RecordTooLong`] if payload + address + checksum exceed 255 bytes.
    pub fn new(rtype: RecordType, address: u32, data: Vec<u8>) -> Result<Self, SrecError> {
        if u64::from(address) > rtype.max_address() {
            return Err(SrecError::AddressOverflow(rtype, u64::from(address)));
        }

        let byte_count = data.len() + rtype.address_len() + 1;
        if byte_count > MAX_BYTE_COUNT {
            return Err(SrecError::RecordTooLong(rtype, byte_count));
        }

        Ok(Self {
            rtype,
            address,
            data,
        })
    }

    #[must_use]
    pub const fn rtype(&self) -> RecordType {
        self.rtype
    }

    #[must_use]
    pub const fn address(&self) -> u32 {
        self.address
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Value of the byte-count field: payload + address + checksum bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn byte_count(&self) -> u8 {
        // Bounded by MAX_BYTE_COUNT in `new`
        (self.data.len() + self.rtype.address_len() + 1) as u8
    }

    /// Calculate checksum from the Record instance.
    ///
    #[must_use]
    pub fn checksum(&self) -> u8 {
        let addr = self.address.to_be_bytes();
        let addr_len = self.rtype.address_len();

        let mut v = Vec::with_capacity(1 + addr_len + self.data.len());
        v.push(self.byte_count());
        v.extend_from_slice(&addr[addr.len() - addr_len..]);
        v.extend_from_slice(&self.data);

        Self::calculate_checksum(&v)
    }

    /// Calculate checksum from u8 array: one's complement of the low byte of the sum.
    ///
    #[must_use]
    pub fn calculate_checksum(data: &[u8]) -> u8 {
        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        !sum
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{}{:02X}{:0width$X}{}{:02X}",
            self.rtype.tag(),
            self.byte_count(),
            self.address,
            hex::encode_upper(&self.data),
            self.checksum(),
            width = self.rtype.address_len() * 2,
        )
    }
}

/// Calculate the checksum of an already hex-encoded record body, i.e. the
/// byte-count, address and payload fields without the `S<type>` prefix and
/// without the checksum itself.
///
/// # Errors
/// Returns [`SrecError::InvalidHex`] if the string has odd length or non-hex characters.
///
/// # Examples
/// ```
/// use sreclib::checksum_from_hex;
///
/// assert_eq!(checksum_from_hex("030001").unwrap(), 0xFB);
/// ```
pub fn checksum_from_hex(hex_str: &str) -> Result<u8, SrecError> {
    let bytes = hex::decode(hex_str)?;
    Ok(Record::calculate_checksum(&bytes))
}
