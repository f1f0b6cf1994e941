use super::*;

#[test]
fn slices_decode_in_order() {
    let body = br#"{"slices": ["AQID", "BAU=", "Bg"]}"#;
    let buffers = decode_request(body).unwrap();
    assert_eq!(buffers, vec![vec![1, 2, 3], vec![4, 5], vec![6]]);
}

#[test]
fn whitespace_inside_slices_is_ignored() {
    let req = StitchRequest {
        slices: vec!["AQ\nID\r\n".to_string(), " BA U= ".to_string()],
    };
    assert_eq!(req.into_buffers().unwrap(), vec![vec![1, 2, 3], vec![4, 5]]);
}

#[test]
fn from_buffers_round_trips() {
    let raw = vec![vec![0u8, 255, 17], vec![9u8; 40]];
    let req = StitchRequest::from_buffers(&raw);
    assert_eq!(req.slices[0], "AP8R");
    assert_eq!(req.into_buffers().unwrap(), raw);
}

#[test]
fn request_shape_errors_are_request_errors() {
    let cases: &[&[u8]] = &[
        b"",
        b"not json",
        br#"{"slices": "AQID"}"#,
        br#"{"slices": []}"#,
        br#"{"other": ["AQID"]}"#,
        br#"{"slices": ["AQID", ""]}"#,
        br#"{"slices": ["AQID", "@@@@"]}"#,
    ];
    for body in cases {
        let err = decode_request(body).unwrap_err();
        assert!(
            matches!(err, StitchError::Request(_)),
            "{}: {err}",
            String::from_utf8_lossy(body)
        );
        assert_eq!(err.http_status(), 400);
    }
}

#[test]
fn bad_slice_error_names_its_index() {
    let err = decode_request(br#"{"slices": ["AQID", "AQID", "!"]}"#).unwrap_err();
    assert!(err.to_string().contains("slice 2"), "{err}");
}
