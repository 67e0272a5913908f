#![allow(clippy::expect_used)]

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sreclib::{RecordType, SrecConfig, SrecEncoder, SrecError, checksum_from_hex, encode};
use std::fs;

/// Fields of an emitted line, split for inspection
struct Line {
    rtype: RecordType,
    byte_count: usize,
    address: u32,
    data: Vec<u8>,
    checksum: u8,
    body: String,
}

fn split_line(line: &str) -> Line {
    let rtype = RecordType::parse(&line[..2]).expect("Unknown record type");
    let addr_chars = rtype.address_len() * 2;
    let body = line[2..line.len() - 2].to_owned();

    Line {
        rtype,
        byte_count: usize::from_str_radix(&body[..2], 16).expect("Invalid byte count"),
        address: u32::from_str_radix(&body[2..2 + addr_chars], 16).expect("Invalid address"),
        data: hex::decode(&body[2 + addr_chars..]).expect("Invalid payload"),
        checksum: u8::from_str_radix(&line[line.len() - 2..], 16).expect("Invalid checksum"),
        body,
    }
}

fn read_fixture(name: &str) -> Vec<u8> {
    fs::read(format!("tests/fixtures/{name}")).expect("Failed to read fixture")
}

#[test]
fn test_encode_sample_s3_with_header() {
    // Arrange
    let data = read_fixture("sample.bin");
    let expected = String::from_utf8(read_fixture("sample_s3.srec")).expect("Fixture not UTF-8");
    let config = SrecConfig::new()
        .with_chunk_size(32)
        .with_address_bits(32)
        .with_header("486578766965772056312E3038D1");

    // Act
    let srec = encode(&data, &config).expect("Encoding failed");

    // Assert
    assert_eq!(srec, expected);
}

#[test]
fn test_encode_sample_s1_with_start_address() {
    // Arrange
    let data = read_fixture("sample.bin");
    let expected = String::from_utf8(read_fixture("sample_s1.srec")).expect("Fixture not UTF-8");
    let config = SrecConfig::new()
        .with_chunk_size(16)
        .with_address_bits(16)
        .with_header("sample")
        .with_start_address(0x0100);

    // Act
    let srec = encode(&data, &config).expect("Encoding failed");

    // Assert
    assert_eq!(srec, expected);
}

#[test]
fn test_random_payloads_preserve_content() {
    let mut rng = StdRng::seed_from_u64(0x5EC0);

    for _ in 0..200 {
        // Arrange
        let len = rng.random_range(0..2048);
        let chunk_size = rng.random_range(1..=64);
        let bits = [16, 24, 32][rng.random_range(0..3)];
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);

        let config = SrecConfig::new()
            .with_chunk_size(chunk_size)
            .with_address_bits(bits);

        // Act
        let srec = encode(&data, &config).expect("Encoding failed");

        // Assert
        let lines: Vec<Line> = srec.lines().map(split_line).collect();
        let data_lines: Vec<&Line> = lines.iter().filter(|l| l.rtype.is_data()).collect();

        let expected_count = len.div_ceil(chunk_size);
        assert_eq!(data_lines.len(), expected_count);
        assert_eq!(lines.len(), expected_count + 1);

        let mut rebuilt = Vec::with_capacity(len);
        for (i, line) in data_lines.iter().enumerate() {
            assert_eq!(line.address as usize, i * chunk_size);
            rebuilt.extend_from_slice(&line.data);
        }
        assert_eq!(rebuilt, data);

        if let Some(last) = data_lines.last() {
            let expected_last = match len % chunk_size {
                0 => chunk_size,
                rest => rest,
            };
            assert_eq!(last.data.len(), expected_last);
        }

        let count = lines.last().expect("Missing count record");
        assert_eq!(count.rtype, RecordType::Count16);
        assert_eq!(count.address as usize, expected_count);

        for line in &lines {
            assert_eq!(
                line.byte_count,
                line.data.len() + line.rtype.address_len() + 1
            );
            assert_eq!(checksum_from_hex(&line.body), Ok(line.checksum));
        }
    }
}

#[test]
fn test_every_line_is_newline_terminated() {
    let config = SrecConfig::new().with_start_address(0x10);
    let srec = encode(&[1, 2, 3], &config).expect("Encoding failed");

    assert!(srec.ends_with('\n'));
    assert!(!srec.contains("\n\n"));
    assert_eq!(srec.matches('\n').count(), 3);
}

#[test]
fn test_header_record_round_trip() {
    // Arrange
    let header = "firmware v1.2";
    let config = SrecConfig::new().with_header(header);

    // Act
    let srec = encode(&[0xFF; 4], &config).expect("Encoding failed");

    // Assert
    let first = split_line(srec.lines().next().expect("Empty output"));
    assert_eq!(first.rtype, RecordType::Header);
    assert_eq!(first.address, 0);
    assert_eq!(first.byte_count, header.len() + 3);
    assert_eq!(first.data, header.as_bytes());
}

#[test]
fn test_count_record_type_boundary() {
    let config = SrecConfig::new().with_chunk_size(1);

    // 0xFFFF data records
    let srec = encode(&vec![0u8; 0xFFFF], &config).expect("Encoding failed");
    assert_eq!(srec.lines().last(), Some("S503FFFFFE"));

    // 0x1_0000 data records
    let srec = encode(&vec![0u8; 0x1_0000], &config).expect("Encoding failed");
    assert_eq!(srec.lines().last(), Some("S604010000FA"));
}

#[test]
fn test_too_many_records() {
    // Arrange
    let data = vec![0u8; 0x100_0000];
    let config = SrecConfig::new().with_chunk_size(1);

    // Act
    let res = encode(&data, &config);

    // Assert
    assert_eq!(res, Err(SrecError::TooManyRecords(0x100_0000)));
}

#[test]
fn test_invalid_configuration_produces_no_output() {
    let res = encode(&[0x01, 0x02], &SrecConfig::new().with_address_bits(8));

    assert_eq!(res, Err(SrecError::Configuration(0)));
}

#[test]
fn test_concurrent_encoders_are_independent() {
    // Arrange
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 100 + usize::from(i) * 37]).collect();
    let encoder = SrecEncoder::new(&SrecConfig::new().with_chunk_size(24)).expect("Invalid config");
    let expected: Vec<String> = payloads
        .iter()
        .map(|p| encoder.encode(p).expect("Encoding failed"))
        .collect();

    // Act
    let encoder = &encoder;
    let actual: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = payloads
            .iter()
            .map(|p| s.spawn(move || encoder.encode(p).expect("Encoding failed")))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Encoder thread panicked"))
            .collect()
    });

    // Assert
    assert_eq!(actual, expected);
}
