use std::path::PathBuf;

use worklog::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(Error::MissingLogFile.exit_code(), exit_codes::USER_ERROR);

    let integrity = Error::TemporalInvariant("crosses midnight".to_string());
    assert_eq!(integrity.exit_code(), exit_codes::INTEGRITY_ERROR);

    let log = Error::InvalidLog {
        path: PathBuf::from("work_log.toml"),
        message: "bad key".to_string(),
    };
    assert_eq!(log.exit_code(), exit_codes::INTEGRITY_ERROR);

    let op = Error::DocumentBuild("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn ambiguous_error_lists_matches() {
    let err = Error::Ambiguous {
        fragment: "ab".to_string(),
        date: "2024-07-03".to_string(),
        matches: vec!["ab1".to_string(), "ab2".to_string()],
    };
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(err.to_string().contains("More than one task matches 'ab'"));
    let details = err.details().expect("details");
    assert_eq!(details["matches"][1], "ab2");
}

#[test]
fn io_errors_have_no_details() {
    let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    assert!(err.details().is_none());
}
