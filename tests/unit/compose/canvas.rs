use super::*;
use crate::compose::layout::plan_layout;

#[test]
fn new_canvas_is_fully_transparent() {
    let c = Canvas::transparent(Dimensions::new(3, 2)).unwrap();
    assert_eq!(c.as_rgba8().len(), 3 * 2 * 4);
    assert!(c.as_rgba8().iter().all(|&b| b == 0));
    assert_eq!(c.pixel(2, 1), Some([0, 0, 0, 0]));
    assert_eq!(c.pixel(3, 0), None);
    assert_eq!(c.pixel(0, 2), None);
}

#[test]
fn oversized_canvas_is_resource_exhausted() {
    let err = Canvas::transparent(Dimensions::new(u32::MAX, u32::MAX)).unwrap_err();
    assert!(matches!(err, StitchError::ResourceExhausted(_)));
}

#[test]
fn place_writes_only_its_rows() {
    let layout = plan_layout(&[Dimensions::new(2, 1), Dimensions::new(2, 2)]).unwrap();
    let mut c = Canvas::transparent(layout.size()).unwrap();

    let second = layout.placements()[1];
    let px = [10u8, 20, 30, 40];
    c.place(second, &px.repeat(4)).unwrap();

    assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(c.pixel(1, 0), Some([0, 0, 0, 0]));
    for y in 1..3 {
        for x in 0..2 {
            assert_eq!(c.pixel(x, y), Some(px));
        }
    }
}

#[test]
fn place_rejects_wrong_pixel_count() {
    let layout = plan_layout(&[Dimensions::new(2, 2)]).unwrap();
    let mut c = Canvas::transparent(layout.size()).unwrap();

    let err = c.place(layout.placements()[0], &[0u8; 4]).unwrap_err();
    assert!(matches!(
        err,
        StitchError::Decode {
            fragment: Some(0),
            ..
        }
    ));
}

#[test]
fn place_rejects_out_of_bounds_placement() {
    let mut c = Canvas::transparent(Dimensions::new(1, 1)).unwrap();
    let p = Placement {
        index: 4,
        top: 1,
        left: 0,
        size: Dimensions::new(1, 1),
    };
    assert!(c.place(p, &[1, 2, 3, 4]).is_err());
}

#[test]
fn bands_partition_the_buffer() {
    let layout = plan_layout(&[
        Dimensions::new(3, 2),
        Dimensions::new(3, 0),
        Dimensions::new(3, 1),
    ])
    .unwrap();
    let mut c = Canvas::transparent(layout.size()).unwrap();

    let lens = c
        .bands_mut(&layout)
        .unwrap()
        .iter()
        .map(|b| b.len())
        .collect::<Vec<_>>();
    assert_eq!(lens, vec![24, 0, 12]);
}

#[test]
fn place_far_below_the_canvas_is_an_error() {
    let mut c = Canvas::transparent(Dimensions::new(1, 1)).unwrap();
    let p = Placement {
        index: 0,
        top: u32::MAX,
        left: 0,
        size: Dimensions::new(1, 1),
    };
    let err = c.place(p, &[1, 2, 3, 4]).unwrap_err();
    assert!(err.to_string().contains("outside"), "{err}");
    assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 0]));

    let tall = Placement {
        top: 1,
        size: Dimensions::new(1, u32::MAX),
        ..p
    };
    assert!(c.place(tall, &[]).is_err());
}
