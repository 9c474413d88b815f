//! Delta-of-delta classification shared by the encoder and decoder.
//!
//! For a field's running first-order delta `d_{n-1}` and the current
//! first-order delta `d_n`, the delta-of-delta is `dd_n = d_n - d_{n-1}`.
//! [`classify`] picks the smallest [`Tag`] whose signed range holds `dd_n`.

use crate::control::Tag;

/// Classifies a delta-of-delta value into the smallest tag that can hold it.
pub fn classify(dd: i64) -> Tag {
    if dd == 0 {
        Tag::Zero
    } else if (-128..=127).contains(&dd) {
        Tag::I8
    } else if (-32768..=32767).contains(&dd) {
        Tag::I16
    } else {
        Tag::Full32
    }
}
