use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::codec::png::PngCodec;
use crate::codec::{DecodedImage, OutputFormat};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
struct CountingCodec {
    inner: PngCodec,
    probes: AtomicUsize,
}

impl ImageCodec for CountingCodec {
    fn probe(&self, bytes: &[u8]) -> StitchResult<Dimensions> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.inner.probe(bytes)
    }

    fn decode_rgba8(&self, bytes: &[u8]) -> StitchResult<DecodedImage> {
        self.inner.decode_rgba8(bytes)
    }

    fn encode_rgba8(&self, size: Dimensions, rgba8: &[u8]) -> StitchResult<Vec<u8>> {
        self.inner.encode_rgba8(size, rgba8)
    }

    fn output_format(&self) -> OutputFormat {
        OutputFormat::Png
    }
}

#[test]
fn inspect_single_buffer() {
    let dims = inspect(&PngCodec::default(), &png_bytes(4, 9)).unwrap();
    assert_eq!(dims, Dimensions::new(4, 9));
}

#[test]
fn inspect_all_preserves_submission_order() {
    let buffers = vec![png_bytes(8, 3), png_bytes(8, 1), png_bytes(8, 5)];
    for parallel in [false, true] {
        let set = inspect_all(&PngCodec::default(), buffers.clone(), parallel).unwrap();
        assert_eq!(
            set.sizes(),
            vec![
                Dimensions::new(8, 3),
                Dimensions::new(8, 1),
                Dimensions::new(8, 5)
            ]
        );
        assert_eq!(set.fragments()[1].bytes(), buffers[1].as_slice());
    }
}

#[test]
fn empty_input_is_rejected_before_probing() {
    let codec = CountingCodec::default();
    let err = inspect_all(&codec, Vec::new(), true).unwrap_err();
    assert!(matches!(err, StitchError::Request(_)));
    assert_eq!(codec.probes.load(Ordering::SeqCst), 0);
}

#[test]
fn lowest_failing_index_is_reported() {
    let buffers = vec![
        png_bytes(2, 2),
        b"junk".to_vec(),
        png_bytes(2, 2),
        b"more junk".to_vec(),
    ];
    for parallel in [false, true] {
        let err = inspect_all(&PngCodec::default(), buffers.clone(), parallel).unwrap_err();
        assert!(
            matches!(
                err,
                StitchError::Decode {
                    fragment: Some(1),
                    ..
                }
            ),
            "parallel={parallel}: {err}"
        );
    }
}

#[test]
fn dedicated_pool_probes_every_buffer() {
    let codec = CountingCodec::default();
    let exec = Executor::new(true, Some(2)).unwrap();
    let buffers = (1..=6).map(|h| png_bytes(3, h)).collect::<Vec<_>>();

    let set = inspect_all_with(&codec, buffers, &exec).unwrap();
    assert_eq!(set.len(), 6);
    assert_eq!(codec.probes.load(Ordering::SeqCst), 6);
    assert_eq!(set.fragments()[5].size(), Dimensions::new(3, 6));
}

#[test]
fn zero_threads_is_rejected() {
    let err = Executor::new(true, Some(0)).unwrap_err();
    assert!(matches!(err, StitchError::Request(_)));
}
