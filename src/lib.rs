//! # tsd
//!
//! A compact, append-only codec for geo-temporal time series: ordered
//! `(timestamp, latitude, longitude)` triples sampled from moving objects,
//! such as vehicle traces.
//!
//! ## Algorithm overview
//!
//! Each sample is compressed against the previous two samples using
//! *delta-of-delta* (DoD) encoding, independently for the timestamp and for
//! each fixed-point-scaled coordinate:
//!
//! - **Timestamps** in real-world traces tend to arrive at a roughly regular
//!   interval. The delta-of-delta between consecutive deltas is usually
//!   zero or small, so it is stored in the smallest of four widths (0, 1,
//!   2, or 4 bytes) that can represent it.
//!
//! - **Coordinates** are quantized to fixed-point integers
//!   (`round(degrees * 100_000)`, ≈1.11 m precision) and DoD-encoded the
//!   same way, independently of the timestamp and of each other.
//!
//! A single control byte per record packs the three width choices as 2-bit
//! tags; the widest tag (`Full32`) is an escape that stores the field's
//! absolute value instead of a delta, resetting that field's running state
//! so a one-off jump does not inflate every subsequent record.
//!
//! ## Example
//!
//! ```rust
//! use tsd::Series;
//!
//! let mut series = Series::new();
//! series.push(1201984833, 39.91071, 116.50962).unwrap();
//! series.push(1201985433, 39.91588, 116.52231).unwrap();
//! series.push(1201986033, 39.91445, 116.56444).unwrap();
//!
//! let bytes = series.into_bytes();
//! let restored = tsd::Series::unmarshal(bytes).unwrap();
//!
//! let mut iter = restored.iter();
//! while iter.next() {
//!     let (t, lat, lng) = iter.values();
//!     println!("{t}: {lat}, {lng}");
//! }
//! ```
//!
//! ## Lazy iteration
//!
//! [`Series::iter`] returns a forward-only cursor that decodes one sample
//! per call, without allocating a `Vec` of all reconstructed samples. It
//! also implements [`Iterator`] for use in a `for` loop:
//!
//! ```rust
//! # use tsd::Series;
//! # let mut series = Series::new();
//! # series.push(1609459200, 12.0, 34.0).unwrap();
//! # series.push(1609459260, 12.5, 34.1).unwrap();
//! for (t, lat, lng) in series.iter() {
//!     println!("{t}: {lat}, {lng}");
//! }
//! ```

pub mod bitbuffer;
pub mod control;
pub mod decoder;
pub mod dod;
pub mod encoder;
pub mod error;
pub mod frame;

// Re-export primary types at the crate root.
pub use decoder::SeriesIter;
pub use encoder::Series;
pub use error::{PushError, ReadError};
