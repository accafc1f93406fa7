//! Tests for the location report decoder

use bytes::Bytes;

use super::{MessageBody, decode_location};
use crate::{ProtocolError, Warning};

/// Body of a captured 0x0200 frame
const CAPTURED_BODY: &str = "00000000000c00c2018be6d8071c17180006000000b422093023392801040027997303020000140400000000150400000000160400000000170200002504000000002b040000000030011f310113eb11000700d4010087a209000600f800000000ef0d000000000000492492000011";

fn header() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1234_5678u32.to_be_bytes()); // alarm
    body.extend_from_slice(&0x0000_0003u32.to_be_bytes()); // status
    body.extend_from_slice(&30_123_456u32.to_be_bytes()); // latitude
    body.extend_from_slice(&120_654_321u32.to_be_bytes()); // longitude
    body.extend_from_slice(&52u16.to_be_bytes()); // altitude
    body.extend_from_slice(&655u16.to_be_bytes()); // speed
    body.extend_from_slice(&270u16.to_be_bytes()); // heading
    body.extend_from_slice(&[0x23, 0x04, 0x25, 0x11, 0x01, 0x39]);
    body
}

fn decode(body: Vec<u8>) -> (super::LocationReport, Vec<Warning>) {
    let decoded = decode_location(&Bytes::from(body)).unwrap();
    match decoded.body {
        MessageBody::Location(report) => (report, decoded.warnings),
        other => panic!("expected location body, got {other:?}"),
    }
}

#[test]
fn test_captured_header_fields() {
    let (report, warnings) = decode(hex::decode(CAPTURED_BODY).unwrap());
    assert!(warnings.is_empty());

    assert_eq!(report.alarm, 0);
    assert_eq!(report.status, 0x000C_00C2);
    assert!((report.latitude - 25.945816).abs() < 1e-9);
    assert!((report.longitude - 119.281432).abs() < 1e-9);
    assert_eq!(report.altitude, 6);
    assert_eq!(report.speed, 0.0);
    assert_eq!(report.heading, 180);
    assert_eq!(
        report.time.unwrap().to_string(),
        "2022-09-30 23:39:28"
    );
}

#[test]
fn test_captured_extensions_in_wire_order() {
    let (report, _) = decode(hex::decode(CAPTURED_BODY).unwrap());

    let ids: Vec<u8> = report.extensions.iter().map(|e| e.id).collect();
    assert_eq!(
        ids,
        vec![0x01, 0x03, 0x14, 0x15, 0x16, 0x17, 0x25, 0x2B, 0x30, 0x31, 0xEB, 0xEF]
    );
    assert_eq!(report.extension(0xEB).unwrap().data.len(), 17);
    assert_eq!(report.extension(0xEF).unwrap().data.len(), 13);

    assert_eq!(report.parsed.mileage, Some(259518.7));
    assert_eq!(report.parsed.recorder_speed, Some(0.0));
    assert_eq!(report.parsed.fuel, None);
    assert_eq!(report.parsed.analog_0, Some(0));
    assert_eq!(report.parsed.signal_strength, Some(0x1F));
    assert_eq!(report.parsed.satellites, Some(0x13));
}

#[test]
fn test_header_only_body() {
    let (report, warnings) = decode(header());
    assert!(warnings.is_empty());
    assert_eq!(report.alarm, 0x1234_5678);
    assert!((report.latitude - 30.123456).abs() < 1e-9);
    assert!((report.longitude - 120.654321).abs() < 1e-9);
    assert_eq!(report.altitude, 52);
    assert!((report.speed - 65.5).abs() < 1e-9);
    assert_eq!(report.heading, 270);
    assert_eq!(report.time.unwrap().to_string(), "2023-04-25 11:01:39");
    assert!(report.extensions.is_empty());
}

#[test]
fn test_typed_extensions() {
    let mut body = header();
    body.extend_from_slice(&[0x02, 0x02, 0x01, 0xF4]); // fuel 50.0
    body.extend_from_slice(&[0x2B, 0x04, 0x00, 0x0A, 0x00, 0x14]); // AD1=10, AD0=20
    let (report, _) = decode(body);
    assert_eq!(report.parsed.fuel, Some(50.0));
    assert_eq!(report.parsed.analog_0, Some(20));
    assert_eq!(report.parsed.analog_1, Some(10));
}

#[test]
fn test_wrong_width_known_tag_stays_untyped() {
    let mut body = header();
    body.extend_from_slice(&[0x01, 0x02, 0x00, 0x10]);
    let (report, warnings) = decode(body);
    assert!(warnings.is_empty());
    assert!(report.has_extension(0x01));
    assert_eq!(report.parsed.mileage, None);
}

#[test]
fn test_duplicate_tag_first_wins() {
    let mut body = header();
    body.extend_from_slice(&[0x30, 0x01, 0x05]);
    body.extend_from_slice(&[0x30, 0x01, 0x09]);
    let (report, warnings) = decode(body);
    assert_eq!(warnings, vec![Warning::DuplicateExtension(0x30)]);
    assert_eq!(report.extensions.len(), 2);
    assert_eq!(report.parsed.signal_strength, Some(5));
}

#[test]
fn test_zero_length_record() {
    let mut body = header();
    body.extend_from_slice(&[0xE0, 0x00, 0x31, 0x01, 0x07]);
    let (report, _) = decode(body);
    assert_eq!(report.extensions.len(), 2);
    assert!(report.extension(0xE0).unwrap().data.is_empty());
    assert_eq!(report.parsed.satellites, Some(7));
}

#[test]
fn test_truncated_record_fails() {
    let mut body = header();
    body.extend_from_slice(&[0x01, 0x04, 0x00, 0x01]);
    let err = decode_location(&Bytes::from(body)).unwrap_err();
    assert_eq!(
        err,
        ProtocolError::TruncatedBody {
            field: "extension payload",
            needed: 4,
            available: 2
        }
    );
}

#[test]
fn test_lone_tag_byte_fails() {
    let mut body = header();
    body.push(0x01);
    assert!(matches!(
        decode_location(&Bytes::from(body)),
        Err(ProtocolError::TruncatedBody {
            field: "extension length",
            ..
        })
    ));
}

#[test]
fn test_short_header_fails() {
    let body = header()[..20].to_vec();
    assert!(matches!(
        decode_location(&Bytes::from(body)),
        Err(ProtocolError::TruncatedBody { .. })
    ));
}

#[test]
fn test_bad_time_is_warning() {
    let mut body = header();
    body[22..28].copy_from_slice(&[0x23, 0x13, 0x45, 0x11, 0x01, 0x39]);
    let (report, warnings) = decode(body);
    assert_eq!(report.time, None);
    assert_eq!(warnings, vec![Warning::BadTime("231345110139".to_string())]);
}
