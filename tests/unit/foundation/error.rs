use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StitchError::request("x")
            .to_string()
            .contains("request error:")
    );
    assert!(StitchError::decode("x").to_string().contains("decode error:"));
    assert!(
        StitchError::resource_exhausted("x")
            .to_string()
            .contains("resource exhausted:")
    );
    assert!(StitchError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn width_mismatch_names_index_and_both_widths() {
    let msg = StitchError::WidthMismatch {
        index: 2,
        expected: 100,
        found: 200,
    }
    .to_string();
    assert_eq!(
        msg,
        "width mismatch: fragment 2 has width 200, expected 100"
    );
}

#[test]
fn at_fragment_fills_missing_index_only() {
    let err = StitchError::decode("bad header").at_fragment(3);
    assert_eq!(err.to_string(), "decode error (fragment 3): bad header");

    let err = err.at_fragment(7);
    assert!(matches!(
        err,
        StitchError::Decode {
            fragment: Some(3),
            ..
        }
    ));

    let other = StitchError::encode("x").at_fragment(1);
    assert!(matches!(other, StitchError::Encode(_)));
}

#[test]
fn http_status_mapping() {
    assert_eq!(StitchError::request("x").http_status(), 400);
    assert_eq!(
        StitchError::WidthMismatch {
            index: 1,
            expected: 1,
            found: 2
        }
        .http_status(),
        400
    );
    assert_eq!(StitchError::decode("x").http_status(), 500);
    assert_eq!(StitchError::resource_exhausted("x").http_status(), 500);
    assert_eq!(StitchError::encode("x").http_status(), 500);
    assert_eq!(
        StitchError::Other(anyhow::anyhow!("boom")).http_status(),
        500
    );
}

#[test]
fn report_serializes_camel_case() {
    let err = StitchError::decode("truncated").at_fragment(0);
    let report = ErrorReport::from(&err);
    assert_eq!(report.error_kind, ErrorKind::DecodeError);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["errorKind"], "DecodeError");
    assert_eq!(json["message"], "decode error (fragment 0): truncated");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StitchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::InternalError);
}
