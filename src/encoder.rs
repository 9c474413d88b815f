use crate::bitbuffer::BitBuffer;
use crate::control::{ControlByte, Tag};
use crate::decoder::{self, SeriesIter};
use crate::dod::classify;
use crate::error::{PushError, ReadError};
use crate::frame::{quantize, HEADER_LEN};

/// An append-only, compressed geo-temporal series.
///
/// Implements the delta-of-delta scheme described in the crate docs:
/// timestamps and fixed-point-scaled coordinates are each independently
/// classified into a 0/1/2/4-byte width per sample, with a fourth "escape"
/// width that falls back to an absolute value and resets that field's
/// running delta.
///
/// # Example
/// ```
/// use tsd::Series;
///
/// let mut series = Series::new();
/// series.push(1201984833, 39.91071, 116.50962).unwrap();
/// series.push(1201985433, 39.91588, 116.52231).unwrap();
/// series.push(1201986033, 39.91445, 116.56444).unwrap();
///
/// let expected: &[u8] = &[
///     0x47, 0xa4, 0xd5, 0x41, 0x00, 0x3c, 0xe6, 0x1f, 0x00, 0xb1, 0xc7, 0x92,
///     0x2a, 0x02, 0x58, 0x02, 0x05, 0x04, 0xf5, 0x28, 0xfd, 0x6c, 0x0b, 0x80,
/// ];
/// assert_eq!(series.marshal(), expected);
/// ```
pub struct Series {
    buf: BitBuffer,
    /// Number of samples pushed so far. Used instead of inspecting the
    /// buffer's length to detect the bootstrap (second-sample) case, so
    /// the encoder's state machine does not depend on the wire layout.
    count: u64,
    t_prev: u32,
    t_delta_prev: i64,
    lat_prev: i32,
    lat_delta_prev: i64,
    lng_prev: i32,
    lng_delta_prev: i64,
}

impl Series {
    /// Creates a new, empty `Series`.
    pub fn new() -> Self {
        Self {
            buf: BitBuffer::with_capacity(64),
            count: 0,
            t_prev: 0,
            t_delta_prev: 0,
            lat_prev: 0,
            lat_delta_prev: 0,
            lng_prev: 0,
            lng_delta_prev: 0,
        }
    }

    /// Number of samples pushed so far.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns `true` if no sample has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Pushes a new `(t, lat, lng)` sample onto the series.
    ///
    /// Timestamps are expected to be non-decreasing across calls; a
    /// decrease is not rejected (it is logged at `warn` level) since the
    /// wire format has no way to reject it after the fact — see the crate
    /// docs' discussion of this tradeoff.
    ///
    /// Returns [`PushError::QuantizationOverflow`] if a coordinate, scaled
    /// by 1e5, does not fit in a signed 32-bit integer.
    pub fn push(&mut self, t: u32, lat: f64, lng: f64) -> Result<(), PushError> {
        let ilat = quantize(lat)?;
        let ilng = quantize(lng)?;

        if self.count == 0 {
            self.buf.write_bits(t as u64, 32);
            self.buf.write_bits(ilat as u32 as u64, 32);
            self.buf.write_bits(ilng as u32 as u64, 32);
            self.t_prev = t;
            self.lat_prev = ilat;
            self.lng_prev = ilng;
            self.count = 1;
            return Ok(());
        }

        if t < self.t_prev {
            log::warn!(
                "pushed timestamp {t} older than the previous sample {}",
                self.t_prev
            );
        }

        let bootstrap = self.count == 1;

        let t_delta = t.wrapping_sub(self.t_prev) as i64;
        let ts_dod = if bootstrap {
            t_delta
        } else {
            t_delta - self.t_delta_prev
        };

        let lat_delta = ilat as i64 - self.lat_prev as i64;
        let lat_dod = if bootstrap {
            lat_delta
        } else {
            lat_delta - self.lat_delta_prev
        };

        let lng_delta = ilng as i64 - self.lng_prev as i64;
        let lng_dod = if bootstrap {
            lng_delta
        } else {
            lng_delta - self.lng_delta_prev
        };

        let ts_tag = classify(ts_dod);
        let lat_tag = classify(lat_dod);
        let lng_tag = classify(lng_dod);

        ControlByte {
            ts: ts_tag,
            lat: lat_tag,
            lng: lng_tag,
        }
        .write(&mut self.buf);

        self.write_field(ts_tag, ts_dod, t as u64, 32);
        self.write_field(lat_tag, lat_dod, ilat as u32 as u64, 32);
        self.write_field(lng_tag, lng_dod, ilng as u32 as u64, 32);

        match ts_tag {
            Tag::Full32 => {
                log::trace!("timestamp escape at t={t}");
                self.t_delta_prev = 0;
            }
            _ => self.t_delta_prev = t_delta,
        }
        self.t_prev = t;

        match lat_tag {
            Tag::Full32 => {
                log::trace!("latitude escape at ilat={ilat}");
                self.lat_delta_prev = 0;
            }
            _ => self.lat_delta_prev = lat_delta,
        }
        self.lat_prev = ilat;

        match lng_tag {
            Tag::Full32 => {
                log::trace!("longitude escape at ilng={ilng}");
                self.lng_delta_prev = 0;
            }
            _ => self.lng_delta_prev = lng_delta,
        }
        self.lng_prev = ilng;

        self.count += 1;
        Ok(())
    }

    /// Writes one field's payload: nothing for `Zero`, the delta-of-delta
    /// for `I8`/`I16`, or `absolute` (the full 32-bit value) for `Full32`.
    fn write_field(&mut self, tag: Tag, dod: i64, absolute: u64, absolute_bits: u8) {
        match tag {
            Tag::Zero => {}
            Tag::I8 => self.buf.write_bits((dod as i8 as u8) as u64, 8),
            Tag::I16 => self.buf.write_bits((dod as i16 as u16) as u64, 16),
            Tag::Full32 => self.buf.write_bits(absolute, absolute_bits),
        }
    }

    /// Returns a reference to the encoded buffer.
    pub fn marshal(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Consumes the series and returns the encoded buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    /// Adopts `bytes` as a series, validating them with a full forward
    /// scan. On success, the scan's final running state primes the
    /// returned series so that further `push` calls remain byte-exact
    /// with what a continuously-pushed series would have produced.
    pub fn unmarshal(bytes: Vec<u8>) -> Result<Series, ReadError> {
        let scan = decoder::validate(&bytes)?;
        Ok(Series {
            buf: BitBuffer::from_raw(bytes),
            count: scan.count,
            t_prev: scan.t,
            t_delta_prev: scan.t_delta,
            lat_prev: scan.lat,
            lat_delta_prev: scan.lat_delta,
            lng_prev: scan.lng,
            lng_delta_prev: scan.lng_delta,
        })
    }

    /// Returns a forward cursor over the encoded samples.
    pub fn iter(&self) -> SeriesIter<'_> {
        SeriesIter::new(self.buf.as_bytes())
    }
}

impl Default for Series {
    fn default() -> Self {
        Self::new()
    }
}
