//! # `sreclib`
//!
//! `sreclib` is a Rust library for encoding binary payloads as Motorola S-record
//! (SREC) text, the line-oriented hex format understood by EPROM programmers and
//! flashing tools.
//!
//! The library provides:
//! - Encoder for whole payloads (via [`SrecEncoder`] struct or the [`encode`] function).
//! - Configuration with documented defaults (via [`SrecConfig`] struct).
//! - Individual records and their checksums (via [`Record`] and [`RecordType`]).
//! - Error handling with [`SrecError`].
//!
//! The encoder is a pure function of its inputs: it does no I/O and keeps no state
//! between calls.
//!
//! ## Example
//!
//! ```
//! use sreclib::{SrecConfig, encode};
//!
//! let config = SrecConfig::new()
//!     .with_address_bits(16)
//!     .with_header("HDR")
//!     .with_start_address(0x0000);
//! let srec = encode(&[0xDE, 0xAD, 0xBE, 0xEF], &config).unwrap();
//!
//! assert_eq!(srec.lines().next(), Some("S00600004844521B"));
//! assert_eq!(srec.lines().last(), Some("S9030000FC"));
//! ```

mod encoder;
mod error;
mod record;

// Public APIs
pub use encoder::{
    DEFAULT_ADDRESS_BITS, DEFAULT_CHUNK_SIZE, ResolvedConfig, SrecConfig, SrecEncoder,
    count_record_type, encode,
};
pub use error::SrecError;
pub use record::{MAX_BYTE_COUNT, Record, RecordType, checksum_from_hex};

pub type Result<T> = std::result::Result<T, SrecError>;
