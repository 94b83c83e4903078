use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ViewerError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ViewerError::lookup("x").to_string().contains("lookup error:"));
    assert!(
        ViewerError::duplicate("x")
            .to_string()
            .contains("duplicate error:")
    );
    assert!(
        ViewerError::invariant("x")
            .to_string()
            .contains("invariant violation:")
    );
    assert!(
        ViewerError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn kind_matches_variant() {
    assert_eq!(ViewerError::validation("x").kind(), ErrorKind::Validation);
    assert_eq!(ViewerError::lookup("x").kind(), ErrorKind::Lookup);
    assert_eq!(ViewerError::duplicate("x").kind(), ErrorKind::Duplicate);
    assert_eq!(ViewerError::invariant("x").kind(), ErrorKind::Invariant);
    assert_eq!(ViewerError::serde("x").kind(), ErrorKind::Serde);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ViewerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Backend);
}
