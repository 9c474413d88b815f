use crate::bitbuffer::BitReader;
use crate::control::{ControlByte, Tag};
use crate::error::ReadError;
use crate::frame::{dequantize, HEADER_LEN};

/// One field's decoded payload: either a delta-of-delta to accumulate, or an
/// absolute value that resets the field's running delta (the escape case).
enum Payload {
    Delta(i64),
    Absolute(u32),
}

fn read_payload(reader: &mut BitReader<'_>, tag: Tag) -> Option<Payload> {
    match tag {
        Tag::Zero => Some(Payload::Delta(0)),
        Tag::I8 => {
            let raw = reader.read_bits(8)?;
            Some(Payload::Delta(sign_extend(raw, 8)))
        }
        Tag::I16 => {
            let raw = reader.read_bits(16)?;
            Some(Payload::Delta(sign_extend(raw, 16)))
        }
        Tag::Full32 => {
            let raw = reader.read_bits(32)?;
            Some(Payload::Absolute(raw as u32))
        }
    }
}

/// Sign-extends an `n`-bit value stored in a `u64` to a full `i64`.
#[inline]
fn sign_extend(value: u64, bits: u8) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

fn apply_ts(t: &mut u32, t_delta: &mut i64, payload: Payload) {
    match payload {
        Payload::Delta(dd) => {
            *t_delta += dd;
            *t = (*t as i64 + *t_delta) as u32;
        }
        Payload::Absolute(bits) => {
            *t = bits;
            *t_delta = 0;
        }
    }
}

fn apply_coord(v: &mut i32, delta: &mut i64, payload: Payload) {
    match payload {
        Payload::Delta(dd) => {
            *delta += dd;
            *v = (*v as i64 + *delta) as i32;
        }
        Payload::Absolute(bits) => {
            *v = bits as i32;
            *delta = 0;
        }
    }
}

/// A forward-only cursor over an encoded [`crate::Series`] buffer.
///
/// Mirrors the teacher crate's lazy `DecoderIter`: `next` advances the
/// cursor and reports success as a bool (matching the spec's
/// language-neutral `Iterator.next() -> bool` contract), and `values`
/// reads the triple reconstructed by the most recent successful `next`.
/// A standard [`Iterator`] implementation is layered on top for ergonomic
/// `for` loops.
pub struct SeriesIter<'a> {
    reader: BitReader<'a>,
    started: bool,
    t: u32,
    t_delta: i64,
    lat: i32,
    lat_delta: i64,
    lng: i32,
    lng_delta: i64,
}

impl<'a> SeriesIter<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: BitReader::from_raw(bytes),
            started: false,
            t: 0,
            t_delta: 0,
            lat: 0,
            lat_delta: 0,
            lng: 0,
            lng_delta: 0,
        }
    }

    /// Advances the cursor to the next sample. Returns `false` once the
    /// stream is exhausted or malformed; once `false` is returned the
    /// cursor should not be advanced further.
    pub fn next(&mut self) -> bool {
        if !self.started {
            if self.reader.remaining() < HEADER_LEN * 8 {
                return false;
            }
            self.t = self.reader.read_bits(32).unwrap() as u32;
            self.lat = self.reader.read_bits(32).unwrap() as u32 as i32;
            self.lng = self.reader.read_bits(32).unwrap() as u32 as i32;
            self.started = true;
            return true;
        }

        if self.reader.remaining() < 8 {
            return false;
        }

        match self.advance() {
            Some(()) => true,
            None => {
                log::debug!(
                    "series iterator stopped at byte offset {}",
                    self.reader.byte_offset()
                );
                false
            }
        }
    }

    fn advance(&mut self) -> Option<()> {
        let cb = ControlByte::read(&mut self.reader)?;
        let ts_payload = read_payload(&mut self.reader, cb.ts)?;
        let lat_payload = read_payload(&mut self.reader, cb.lat)?;
        let lng_payload = read_payload(&mut self.reader, cb.lng)?;
        apply_ts(&mut self.t, &mut self.t_delta, ts_payload);
        apply_coord(&mut self.lat, &mut self.lat_delta, lat_payload);
        apply_coord(&mut self.lng, &mut self.lng_delta, lng_payload);
        Some(())
    }

    /// Returns the triple reconstructed by the most recent successful `next`.
    pub fn values(&self) -> (u32, f64, f64) {
        (self.t, dequantize(self.lat), dequantize(self.lng))
    }
}

impl<'a> Iterator for SeriesIter<'a> {
    type Item = (u32, f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        // Resolves to the inherent `SeriesIter::next` above (inherent methods
        // take priority over trait methods in method-call resolution), not a
        // recursive call into this `Iterator::next`.
        if self.next() {
            Some(self.values())
        } else {
            None
        }
    }
}

/// Running state after a validating scan, used to prime a [`crate::Series`]
/// returned from `unmarshal` so further pushes stay byte-exact with what a
/// continuously-pushed series would have produced.
pub(crate) struct ScanState {
    pub count: u64,
    pub t: u32,
    pub t_delta: i64,
    pub lat: i32,
    pub lat_delta: i64,
    pub lng: i32,
    pub lng_delta: i64,
}

/// Scans `bytes` to completion, returning the final running state on
/// success or the specific [`ReadError`] at the point decoding would have
/// stopped.
pub(crate) fn validate(bytes: &[u8]) -> Result<ScanState, ReadError> {
    if bytes.is_empty() {
        return Ok(ScanState {
            count: 0,
            t: 0,
            t_delta: 0,
            lat: 0,
            lat_delta: 0,
            lng: 0,
            lng_delta: 0,
        });
    }
    if bytes.len() < HEADER_LEN {
        return Err(ReadError::ShortHeader);
    }

    let mut reader = BitReader::from_raw(bytes);
    let t = reader.read_bits(32).unwrap() as u32;
    let lat = reader.read_bits(32).unwrap() as u32 as i32;
    let lng = reader.read_bits(32).unwrap() as u32 as i32;
    let mut state = ScanState {
        count: 1,
        t,
        t_delta: 0,
        lat,
        lat_delta: 0,
        lng,
        lng_delta: 0,
    };

    loop {
        if reader.remaining() == 0 {
            break;
        }
        let offset = reader.byte_offset();
        if reader.remaining() < 8 {
            return Err(ReadError::ShortRecord { offset });
        }
        let cb = match ControlByte::read(&mut reader) {
            Some(cb) => cb,
            None => return Err(ReadError::MalformedControlByte { offset }),
        };
        let ts_payload =
            read_payload(&mut reader, cb.ts).ok_or(ReadError::ShortRecord { offset })?;
        let lat_payload =
            read_payload(&mut reader, cb.lat).ok_or(ReadError::ShortRecord { offset })?;
        let lng_payload =
            read_payload(&mut reader, cb.lng).ok_or(ReadError::ShortRecord { offset })?;

        apply_ts(&mut state.t, &mut state.t_delta, ts_payload);
        apply_coord(&mut state.lat, &mut state.lat_delta, lat_payload);
        apply_coord(&mut state.lng, &mut state.lng_delta, lng_payload);
        state.count += 1;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Series;

    #[test]
    fn reference_vector_decodes() {
        let bytes = hex_decode("47a4d541003ce61f00b1c7922a0258020504f528fd6c0b80");
        let mut iter = SeriesIter::new(&bytes);
        assert!(iter.next());
        assert!(iter.next());
        assert!(iter.next());
        let (t, lat, lng) = iter.values();
        assert_eq!(t, 1201986033);
        assert!((lat - 39.91445).abs() < 1e-5);
        assert!((lng - 116.56444).abs() < 1e-5);
        assert!(!iter.next());
    }

    #[test]
    fn truncated_buffer_stops_cleanly() {
        let mut bytes = hex_decode("47a4d541003ce61f00b1c7922a0258020504f528fd6c0b80");
        bytes.pop();
        let mut iter = SeriesIter::new(&bytes);
        assert!(iter.next());
        assert!(iter.next());
        assert!(!iter.next());
    }

    #[test]
    fn malformed_control_byte_stops_decoding() {
        let mut series = Series::new();
        series.push(100, 1.0, 1.0).unwrap();
        series.push(160, 2.0, 2.0).unwrap();
        let mut bytes = series.into_bytes();
        // The control byte is the first byte after the 12-byte header.
        bytes[HEADER_LEN] |= 0b1000_0000;
        let mut iter = SeriesIter::new(&bytes);
        assert!(iter.next()); // header
        assert!(!iter.next()); // malformed control byte
    }

    #[test]
    fn empty_buffer_yields_no_samples() {
        let mut iter = SeriesIter::new(&[]);
        assert!(!iter.next());
    }

    #[test]
    fn validate_reports_short_record() {
        let mut series = Series::new();
        series.push(100, 1.0, 1.0).unwrap();
        series.push(160, 2.0, 2.0).unwrap();
        let mut bytes = series.into_bytes();
        bytes.pop();
        assert!(matches!(
            validate(&bytes),
            Err(ReadError::ShortRecord { .. })
        ));
    }

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
