//! The per-record control byte: three independent 2-bit width tags for the
//! timestamp, latitude, and longitude fields of one sample.
//!
//! ```text
//! bits: [ 0 : 2  | lng_tag : 2 | lat_tag : 2 | ts_tag : 2 ]
//!        bit7 bit6  bit5 bit4    bit3 bit2     bit1 bit0
//! ```
//!
//! The top two bits are always zero on write; a decoder treats a control
//! byte with either top bit set as end-of-stream.

use crate::bitbuffer::{BitBuffer, BitReader};

/// The width (and, for coordinates, interpretation) of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Delta-of-delta is zero; no payload bytes follow.
    Zero = 0b00,
    /// Signed 8-bit delta-of-delta.
    I8 = 0b01,
    /// Signed 16-bit delta-of-delta.
    I16 = 0b10,
    /// Escape: the payload is the absolute field value, not a delta-of-delta.
    /// Clears the field's running delta state.
    Full32 = 0b11,
}

impl Tag {
    /// Number of payload bytes this tag's field contributes.
    pub fn width_bytes(self) -> u8 {
        match self {
            Tag::Zero => 0,
            Tag::I8 => 1,
            Tag::I16 => 2,
            Tag::Full32 => 4,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits {
            0b00 => Tag::Zero,
            0b01 => Tag::I8,
            0b10 => Tag::I16,
            0b11 => Tag::Full32,
            _ => unreachable!("2-bit field out of range"),
        }
    }
}

/// The three per-field tags of one record's control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlByte {
    pub ts: Tag,
    pub lat: Tag,
    pub lng: Tag,
}

impl ControlByte {
    /// Packs the three tags into one control byte and appends it to `buf`.
    pub fn write(self, buf: &mut BitBuffer) {
        buf.write_bits(0, 2);
        buf.write_bits(self.lng as u64, 2);
        buf.write_bits(self.lat as u64, 2);
        buf.write_bits(self.ts as u64, 2);
    }

    /// Reads one control byte. Returns `None` if a reserved top bit is set
    /// (malformed/truncated stream) or if the reader is exhausted.
    pub fn read(reader: &mut BitReader<'_>) -> Option<Self> {
        let pad_top = reader.read_bit()?;
        let pad_low = reader.read_bit()?;

        if pad_top || pad_low {
            return None;
        }

        let lng_top = reader.read_bit()?;
        let lng_low = reader.read_bit()?;
        let lat_top = reader.read_bit()?;
        let lat_low = reader.read_bit()?;
        let ts_top = reader.read_bit()?;
        let ts_low = reader.read_bit()?;

        let bits2 = |top: bool, low: bool| (top as u64) << 1 | low as u64;
        Some(ControlByte {
            ts: Tag::from_bits(bits2(ts_top, ts_low)),
            lat: Tag::from_bits(bits2(lat_top, lat_low)),
            lng: Tag::from_bits(bits2(lng_top, lng_low)),
        })
    }
}
