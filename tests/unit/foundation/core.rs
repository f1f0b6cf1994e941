use super::*;

#[test]
fn rgba8_len_is_four_bytes_per_pixel() {
    assert_eq!(Dimensions::new(50, 30).rgba8_len().unwrap(), 50 * 30 * 4);
    assert_eq!(Dimensions::new(50, 0).rgba8_len().unwrap(), 0);
    assert_eq!(Dimensions::new(7, 3).row_bytes().unwrap(), 28);
}

#[test]
fn rgba8_len_overflow_is_resource_exhausted() {
    let err = Dimensions::new(u32::MAX, u32::MAX).rgba8_len().unwrap_err();
    assert!(matches!(err, StitchError::ResourceExhausted(_)));
}

#[test]
fn placement_bottom_and_display() {
    let p = Placement {
        index: 1,
        top: 30,
        left: 0,
        size: Dimensions::new(50, 20),
    };
    assert_eq!(p.bottom(), 50);
    assert_eq!(p.size.to_string(), "50x20");
}

#[test]
fn placement_bottom_saturates() {
    let p = Placement {
        index: 0,
        top: u32::MAX,
        left: 0,
        size: Dimensions::new(1, 1),
    };
    assert_eq!(p.bottom(), u32::MAX);
}
