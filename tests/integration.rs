use tsd::{ReadError, Series};

fn hex_decode(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Push `input` onto a fresh series, marshal it, and return the collected
/// round-tripped samples alongside the wire bytes.
fn roundtrip(input: &[(u32, f64, f64)]) -> (Vec<(u32, f64, f64)>, Vec<u8>) {
    let mut series = Series::new();
    for &(t, lat, lng) in input {
        series.push(t, lat, lng).unwrap();
    }
    let bytes = series.into_bytes();
    let restored = Series::unmarshal(bytes.clone()).unwrap();
    let samples: Vec<_> = restored.iter().collect();
    (samples, bytes)
}

#[test]
fn empty_series_marshals_to_nothing() {
    let series = Series::new();
    assert!(series.is_empty());
    let bytes = series.into_bytes();
    assert!(bytes.is_empty());

    let restored = Series::unmarshal(bytes).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.iter().count(), 0);
}

#[test]
fn scenario_a_reference_vector() {
    let (samples, bytes) = roundtrip(&[
        (1201984833, 39.91071, 116.50962),
        (1201985433, 39.91588, 116.52231),
        (1201986033, 39.91445, 116.56444),
    ]);

    assert_eq!(
        hex_encode(&bytes),
        "47a4d541003ce61f00b1c7922a0258020504f528fd6c0b80"
    );

    let (t, lat, lng) = samples[2];
    assert_eq!(t, 1201986033);
    assert!((lat - 39.91445).abs() < 1e-5);
    assert!((lng - 116.56444).abs() < 1e-5);
}

#[test]
fn scenario_b_dod_compaction() {
    let t: u32 = 1_600_000_000;
    let t2 = t + 100_000_051;
    let input = [
        (t, 48.82, 2.22),
        (t + 10, 48.83001, 2.23),
        (t + 20, 48.83002, 2.24),
        (t + 30, 48.83003, 2.25),
        (t + 41, 48.83004, 2.26),
        (t2, 48.87, 2.27),
        (t2 + 10, 48.87, 2.27),
        (t2 + 20, 48.87, 2.27),
    ];
    let (samples, _) = roundtrip(&input);

    assert_eq!(samples.len(), 8);

    let (t5, lat5, lng5) = samples[4];
    assert_eq!(t5, t + 41);
    assert!((lat5 - 48.83004).abs() < 1e-5);
    assert!((lng5 - 2.26).abs() < 1e-5);

    assert_eq!(samples[5].0, t2);

    let (t8, lat8, lng8) = samples[7];
    assert_eq!(t8, t2 + 20);
    assert!((lat8 - 48.87).abs() < 1e-5);
    assert!((lng8 - 2.27).abs() < 1e-5);
}

#[test]
fn scenario_c_size_growth() {
    let mut series = Series::new();
    let mut t: u32 = 1_600_000_000;

    series.push(t, 10.0, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 12);

    t += 10;
    series.push(t, 10.0, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 14);

    t += 10;
    series.push(t, 10.0, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 15);

    t += 10;
    series.push(t, 10.00001, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 17);

    t += 10;
    series.push(t, 10.00001, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 19);

    t += 10;
    series.push(t, 10.00001, 20.0).unwrap();
    assert_eq!(series.marshal().len(), 20);
}

#[test]
fn scenario_d_duplicate_timestamp() {
    let (samples, _) = roundtrip(&[(1_600_000_000, 1.0, 1.0), (1_600_000_000, 2.0, 2.0)]);
    assert_eq!(samples[0].0, 1_600_000_000);
    assert_eq!(samples[1].0, 1_600_000_000);
}

#[test]
fn scenario_e_truncated_buffer() {
    let mut bytes = hex_decode("47a4d541003ce61f00b1c7922a0258020504f528fd6c0b80");
    bytes.pop();

    // unmarshal validates the whole buffer up front and rejects it...
    let restored = Series::unmarshal(bytes.clone());
    assert!(matches!(restored, Err(ReadError::ShortRecord { .. })));

    // ...but a full, untruncated buffer still decodes all three samples.
    let full = hex_decode("47a4d541003ce61f00b1c7922a0258020504f528fd6c0b80");
    let series = Series::unmarshal(full).unwrap();
    assert_eq!(series.iter().count(), 3);
}

#[test]
fn scenario_f_malformed_control_byte() {
    let mut series = Series::new();
    series.push(100, 1.0, 1.0).unwrap();
    series.push(160, 2.0, 2.0).unwrap();
    let mut bytes = series.into_bytes();
    bytes[12] |= 0b1000_0000;

    let result = Series::unmarshal(bytes);
    assert!(matches!(result, Err(ReadError::MalformedControlByte { .. })));
}

#[test]
fn unmarshal_then_push_stays_byte_exact() {
    let mut continuous = Series::new();
    for i in 0..5u32 {
        continuous
            .push(1_600_000_000 + i * 10, 10.0 + i as f64 * 0.00001, 20.0)
            .unwrap();
    }

    let mut staged = Series::new();
    for i in 0..3u32 {
        staged
            .push(1_600_000_000 + i * 10, 10.0 + i as f64 * 0.00001, 20.0)
            .unwrap();
    }
    let mut resumed = Series::unmarshal(staged.into_bytes()).unwrap();
    for i in 3..5u32 {
        resumed
            .push(1_600_000_000 + i * 10, 10.0 + i as f64 * 0.00001, 20.0)
            .unwrap();
    }

    assert_eq!(continuous.marshal(), resumed.marshal());
}

#[test]
fn quantization_overflow_rejected() {
    let mut series = Series::new();
    let result = series.push(0, 1e10, 0.0);
    assert!(result.is_err());
}
