//! The `encoder` module provides [`SrecEncoder`], which turns an in-memory binary
//! payload into a Motorola S-record document.
//!
//! A document is emitted in a fixed order:
//! 1. An optional S0 header record built from an ASCII string.
//! 2. One data record (S1, S2 or S3) per chunk of the payload, addresses ascending.
//! 3. Exactly one count record (S5 or S6) holding the number of data records.
//! 4. An optional start address record (S9, S8 or S7) matching the data record type.
//!
//! Configuration lives in [`SrecConfig`], whose unset fields fall back to
//! [`DEFAULT_CHUNK_SIZE`] and [`DEFAULT_ADDRESS_BITS`].

use crate::error::SrecError;
use crate::record::{Record, RecordType};

/// Payload bytes per data record when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 32;
/// Address width when none is configured, selects S3 data records.
pub const DEFAULT_ADDRESS_BITS: u32 = 32;

const MAX_COUNT16: usize = 0xFFFF;
const MAX_COUNT24: usize = 0xFF_FFFF;

/// User facing encoder configuration. `None` (and `Some(0)` for the numeric
/// fields) selects the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrecConfig {
    /// Payload bytes per data record
    pub chunk_size: Option<usize>,
    /// Address width in bits: 16 -> S1, 24 -> S2, 32 -> S3
    pub address_bits: Option<u32>,
    /// ASCII text for the S0 header record, omitted if empty
    pub header: Option<String>,
    /// Start address for the terminating S7/S8/S9 record, omitted if `None`
    pub start_address: Option<u32>,
}

impl SrecConfig {
    /// Creates a configuration with every field set to its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_address_bits(mut self, bits: u32) -> Self {
        self.address_bits = Some(bits);
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn with_start_address(mut self, address: u32) -> Self {
        self.start_address = Some(address);
        self
    }

    /// Apply defaults and validate the configuration.
    ///
    /// # Errors
    /// - [`SrecError::Configuration`] if the address width does not select S1..S3.
    /// - [`SrecError::NonAsciiHeader`] if the header holds a non-ASCII character.
    pub fn resolve(&self) -> Result<ResolvedConfig, SrecError> {
        let chunk_size = match self.chunk_size {
            None | Some(0) => DEFAULT_CHUNK_SIZE,
            Some(size) => size,
        };
        let address_bits = match self.address_bits {
            None | Some(0) => DEFAULT_ADDRESS_BITS,
            Some(bits) => bits,
        };

        let data_type = data_type_for_bits(address_bits)?;

        let header = match self.header.as_deref() {
            None | Some("") => None,
            Some(text) => Some(header_bytes(text)?),
        };

        Ok(ResolvedConfig {
            chunk_size,
            data_type,
            header,
            start_address: self.start_address,
        })
    }
}

/// Configuration with defaults applied, as used by a single encoding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub chunk_size: usize,
    pub data_type: RecordType,
    pub header: Option<Vec<u8>>,
    pub start_address: Option<u32>,
}

/// Maps an address width to the data record type as `bits / 8 - 1`, so that only
/// 16, 24 and 32 bits (and the widths truncating to them) are accepted.
fn data_type_for_bits(bits: u32) -> Result<RecordType, SrecError> {
    let tag = i64::from(bits / 8) - 1;
    match tag {
        1 => Ok(RecordType::Data16),
        2 => Ok(RecordType::Data24),
        3 => Ok(RecordType::Data32),
        _ => Err(SrecError::Configuration(tag)),
    }
}

fn header_bytes(header: &str) -> Result<Vec<u8>, SrecError> {
    if let Some((pos, ch)) = header.chars().enumerate().find(|(_, ch)| !ch.is_ascii()) {
        return Err(SrecError::NonAsciiHeader(ch, pos));
    }
    Ok(header.as_bytes().to_vec())
}

/// Selects the count record type able to hold `count` data records.
///
/// # Errors
/// Returns [`SrecError::TooManyRecords`] if `count` exceeds 0xFF_FFFF.
///
/// # Examples
/// ```
/// use sreclib::{RecordType, count_record_type};
///
/// assert_eq!(count_record_type(0xFFFF), Ok(RecordType::Count16));
/// assert_eq!(count_record_type(0x1_0000), Ok(RecordType::Count24));
/// assert!(count_record_type(0x100_0000).is_err());
/// ```
pub fn count_record_type(count: usize) -> Result<RecordType, SrecError> {
    if count <= MAX_COUNT16 {
        Ok(RecordType::Count16)
    } else if count <= MAX_COUNT24 {
        Ok(RecordType::Count24)
    } else {
        Err(SrecError::TooManyRecords(count))
    }
}

fn to_address(rtype: RecordType, value: usize) -> Result<u32, SrecError> {
    u32::try_from(value).map_err(|_| SrecError::AddressOverflow(rtype, value as u64))
}

/// Encodes payloads with one resolved configuration. Holds no per-call state, so a
/// single encoder can be shared between threads.
#[derive(Debug, Clone)]
pub struct SrecEncoder {
    config: ResolvedConfig,
}

impl SrecEncoder {
    /// Creates an encoder from a configuration, applying defaults.
    ///
    /// # Errors
    /// Returns the errors of [`SrecConfig::resolve`].
    ///
    /// # Examples
    /// ```
    /// use sreclib::{SrecConfig, SrecEncoder};
    ///
    /// let config = SrecConfig::new().with_chunk_size(1).with_address_bits(16);
    /// let encoder = SrecEncoder::new(&config).unwrap();
    /// assert_eq!(encoder.encode(&[0x00]).unwrap(), "S104000000FB\nS5030001FB\n");
    /// ```
    pub fn new(config: &SrecConfig) -> Result<Self, SrecError> {
        let config = config.resolve()?;
        tracing::debug!(
            chunk_size = config.chunk_size,
            data_type = %config.data_type,
            header = config.header.is_some(),
            start_address = ?config.start_address,
            "resolved encoder configuration"
        );
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Build all records for `data` in emission order.
    ///
    /// # Errors
    /// - [`SrecError::TooManyRecords`] if the payload needs more than 0xFF_FFFF data records.
    /// - [`SrecError::AddressOverflow`] if a data or start address does not fit the
    ///   selected address width.
    /// - [`SrecError::RecordTooLong`] if the header or a data record overflows the
    ///   byte-count field.
    pub fn records(&self, data: &[u8]) -> Result<Vec<Record>, SrecError> {
        let ResolvedConfig {
            chunk_size,
            data_type,
            ref header,
            start_address,
        } = self.config;

        // Decide on the count record first, so an oversized payload fails before
        // any data record is built
        let record_count = data.len().div_ceil(chunk_size);
        let count_type = count_record_type(record_count)?;

        let mut records = Vec::with_capacity(record_count + 3);

        if let Some(header) = header {
            records.push(Record::new(RecordType::Header, 0, header.clone())?);
        }

        for (i, chunk) in data.chunks(chunk_size).enumerate() {
            let address = to_address(data_type, i * chunk_size)?;
            let record = Record::new(data_type, address, chunk.to_vec())?;
            tracing::trace!(%record, "data record");
            records.push(record);
        }

        let count = to_address(count_type, record_count)?;
        records.push(Record::new(count_type, count, Vec::new())?);

        if let Some(address) = start_address {
            records.push(Record::new(data_type.termination()?, address, Vec::new())?);
        }

        tracing::debug!(
            payload_len = data.len(),
            data_records = record_count,
            total_records = records.len(),
            "encoded payload"
        );

        Ok(records)
    }

    /// Encode `data` into an S-record document, one newline-terminated record per line.
    ///
    /// # Errors
    /// Returns the errors of [`SrecEncoder::records`]; no partial output is produced.
    pub fn encode(&self, data: &[u8]) -> Result<String, SrecError> {
        let records = self.records(data)?;

        // "S<type>", byte-count field, two hex chars per counted byte, newline
        let capacity = records
            .iter()
            .map(|r| 4 + 2 * usize::from(r.byte_count()) + 1)
            .sum();
        let mut out = String::with_capacity(capacity);
        for record in &records {
            out.push_str(&record.to_string());
            out.push('\n');
        }

        Ok(out)
    }
}

/// Encode `data` into an S-record document using `config`.
///
/// # Errors
/// Fails on an invalid configuration or when the payload exceeds the capacity of
/// the format; see [`SrecError`].
///
/// # Examples
/// ```
/// use sreclib::{SrecConfig, encode};
///
/// let srec = encode(&[], &SrecConfig::new()).unwrap();
/// assert_eq!(srec, "S5030000FC\n");
/// ```
pub fn encode(data: &[u8], config: &SrecConfig) -> Result<String, SrecError> {
    SrecEncoder::new(config)?.encode(data)
}
