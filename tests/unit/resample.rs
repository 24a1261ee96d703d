use super::*;
use crate::frame::{PixelData, SampleFormat};

#[test]
fn halving_averages_pairs() {
    let src = [0.0, 1.0, 0.5, 0.5];
    let out = resample_area(&src, Size::new(4, 1), 1, Size::new(2, 1));
    assert_eq!(out, vec![0.5, 0.5]);
}

#[test]
fn doubling_repeats_pixels() {
    let src = [0.2, 0.8];
    let out = resample_area(&src, Size::new(2, 1), 1, Size::new(4, 1));
    for (a, b) in out.iter().zip([0.2, 0.2, 0.8, 0.8]) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn constant_image_stays_constant() {
    let src = vec![0.25f32; 7 * 5 * 3];
    let out = resample_area(&src, Size::new(7, 5), 3, Size::new(3, 4));
    assert_eq!(out.len(), 3 * 4 * 3);
    assert!(out.iter().all(|v| (v - 0.25).abs() < 1e-5));
}

#[test]
fn frame_keeps_format_and_channels() {
    let frame =
        FrameBuffer::new(200, 50, 3, PixelData::U16(vec![4000; 200 * 50 * 3])).unwrap();
    let out = resample_frame(frame, Size::new(100, 50)).unwrap();
    assert_eq!(out.size(), Size::new(100, 50));
    assert_eq!(out.channels, 3);
    assert_eq!(out.format(), SampleFormat::U16);
    assert_eq!(out.byte_len(), 100 * 50 * 3 * 2);
    assert_eq!(out.data, PixelData::U16(vec![4000; 100 * 50 * 3]));
}
