//! Crate-specific error types.

/// Errors that can occur while pushing a sample onto a [`crate::Series`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PushError {
    /// The coordinate, scaled by 1e5, does not fit in a signed 32-bit field.
    #[error("coordinate {value} scaled by 1e5 does not fit in a 32-bit fixed-point field")]
    QuantizationOverflow {
        /// The offending input coordinate, in degrees.
        value: f64,
    },
}

/// Errors surfaced while decoding a buffer.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ReadError {
    /// The buffer is non-empty but shorter than the 12-byte header.
    #[error("buffer ended before the 12-byte header was fully read")]
    ShortHeader,
    /// The buffer ended mid-record, after the control byte was already read.
    #[error("buffer ended while reading the record at byte offset {offset}")]
    ShortRecord {
        /// Byte offset of the record's control byte.
        offset: usize,
    },
    /// A control byte had a reserved top bit set.
    #[error("control byte at offset {offset} has a reserved top bit set")]
    MalformedControlByte {
        /// Byte offset of the offending control byte.
        offset: usize,
    },
}
