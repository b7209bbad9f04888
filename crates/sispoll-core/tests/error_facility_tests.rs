use sispoll_core::errors::{ExError, ExErrorKind, PollerError};

#[test]
fn test_invalid_timestamp_verifiable_by_kind() {
    let ex_err: ExError = PollerError::InvalidTimestamp {
        resource_id: "UU_ALP.xml".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidRecord);
    assert_eq!(ex_err.code(), "ERR_INVALID_RECORD");
    assert_eq!(ex_err.resource_id(), Some("UU_ALP.xml"));
    assert!(!ex_err.kind().is_fatal());
}

#[test]
fn test_source_failure_carries_source_name() {
    let ex_err: ExError = PollerError::SourceFetchFailed {
        source_name: "IW".to_string(),
        reason: "HTTP 503".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::Fetch);
    assert_eq!(ex_err.source_name(), Some("IW"));
    assert!(ex_err.message().contains("HTTP 503"));
}

#[test]
fn test_no_snapshot_is_fatal() {
    let ex_err: ExError = PollerError::NoSnapshot { attempted: 4 }.into();
    assert_eq!(ex_err.code(), "ERR_NO_SNAPSHOT");
    assert!(ex_err.kind().is_fatal());
    assert!(ex_err.message().contains('4'));
}

#[test]
fn test_duplicate_row_maps_to_already_exists() {
    let ex_err: ExError = PollerError::DuplicateBaselineRow {
        resource_id: "WY_YMR.xml".to_string(),
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::AlreadyExists);
    assert_eq!(ex_err.resource_id(), Some("WY_YMR.xml"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidRecord, "ERR_INVALID_RECORD"),
        (ExErrorKind::Fetch, "ERR_FETCH"),
        (ExErrorKind::NoSnapshot, "ERR_NO_SNAPSHOT"),
        (ExErrorKind::StoreUnavailable, "ERR_STORE_UNAVAILABLE"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Unauthorised, "ERR_UNAUTHORISED"),
        (ExErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}
