//! Tests for protocol error types

use crate::error::ProtocolError;

#[test]
fn test_error_display_malformed() {
    let err = ProtocolError::malformed("missing start marker");
    assert_eq!(err.to_string(), "malformed frame: missing start marker");
}

#[test]
fn test_error_display_truncated_header() {
    let err = ProtocolError::TruncatedHeader {
        field: "serial number",
        needed: 2,
        available: 1,
    };
    assert_eq!(
        err.to_string(),
        "truncated header: serial number needs 2 bytes, 1 available"
    );
}

#[test]
fn test_error_display_body_too_long() {
    let err = ProtocolError::BodyTooLong {
        size: 2048,
        max: 1023,
    };
    assert_eq!(
        err.to_string(),
        "body too long: 2048 bytes exceeds maximum 1023"
    );
}

#[test]
fn test_identity_too_long_counts_digits() {
    let err = ProtocolError::identity_too_long(13, 6);
    assert!(matches!(
        err,
        ProtocolError::IdentityTooLong {
            digits: 13,
            max: 12
        }
    ));
}

#[test]
fn test_only_empty_message_is_skippable() {
    assert!(ProtocolError::EmptyMessage.is_skippable());
    assert!(!ProtocolError::malformed("x").is_skippable());
    assert!(!ProtocolError::invalid_identity("zz").is_skippable());
    assert!(
        !ProtocolError::TruncatedHeader {
            field: "id",
            needed: 2,
            available: 0
        }
        .is_skippable()
    );
}
