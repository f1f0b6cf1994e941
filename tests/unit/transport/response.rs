use std::io::Cursor;

use super::*;
use crate::compose::stitch::CompositorOpts;
use crate::transport::request::StitchRequest;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn body_for(buffers: &[Vec<u8>]) -> Vec<u8> {
    serde_json::to_vec(&StitchRequest::from_buffers(buffers)).unwrap()
}

fn report(reply: &Reply) -> ErrorReport {
    assert_eq!(reply.content_type, "application/json");
    serde_json::from_slice(&reply.body).unwrap()
}

#[test]
fn success_is_png_attachment() {
    let c = Compositor::new(CompositorOpts::default()).unwrap();
    let reply = handle_stitch(&c, &body_for(&[png(5, 2), png(5, 3)]));

    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "image/png");
    assert_eq!(
        reply.content_disposition.as_deref(),
        Some("attachment; filename=\"stitched_image.png\"")
    );
    let img = image::load_from_memory(&reply.body).unwrap();
    assert_eq!((img.width(), img.height()), (5, 5));
}

#[test]
fn width_mismatch_is_400() {
    let c = Compositor::new(CompositorOpts::default()).unwrap();
    let reply = handle_stitch(&c, &body_for(&[png(100, 1), png(200, 1)]));

    assert_eq!(reply.status, 400);
    assert_eq!(reply.content_disposition, None);
    let r = report(&reply);
    assert_eq!(r.error_kind, ErrorKind::WidthMismatchError);
    assert!(r.message.contains("fragment 1"), "{}", r.message);
}

#[test]
fn undecodable_slice_is_500() {
    let c = Compositor::new(CompositorOpts::default()).unwrap();
    let reply = handle_stitch(&c, &body_for(&[png(3, 3), b"plain text".to_vec()]));

    assert_eq!(reply.status, 500);
    assert_eq!(report(&reply).error_kind, ErrorKind::DecodeError);
}

#[test]
fn empty_slices_is_400() {
    let c = Compositor::new(CompositorOpts::default()).unwrap();
    let reply = handle_stitch(&c, br#"{"slices": []}"#);

    assert_eq!(reply.status, 400);
    assert_eq!(report(&reply).error_kind, ErrorKind::RequestError);
}

#[test]
fn routing_replies() {
    assert_eq!(Reply::not_found("/nope").status, 404);
    assert_eq!(Reply::method_not_allowed("GET").status, 405);

    let too_big = Reply::payload_too_large(10);
    assert_eq!(too_big.status, 413);
    assert!(report(&too_big).message.contains("10 bytes"));
}

#[test]
fn error_replies_always_carry_a_report_body() {
    let err = StitchError::encode("zlib stream aborted");
    let reply = Reply::error(&err);
    assert_eq!(reply.status, 500);
    assert!(!reply.body.is_empty());
    let r = report(&reply);
    assert_eq!(r.error_kind, ErrorKind::EncodeError);
    assert!(r.message.contains("zlib stream aborted"));
}
