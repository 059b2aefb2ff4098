use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use medicare_core::error::{MedicareError, Result};

use crate::Frame;

/// Encode an RGB8 frame as JPEG at `quality` (1-100).
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(MedicareError::Encoding(format!(
            "empty frame {}x{}",
            frame.width, frame.height
        )));
    }
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.rgb.len() != expected {
        return Err(MedicareError::Encoding(format!(
            "frame buffer is {} bytes, expected {} for {}x{}",
            frame.rgb.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| MedicareError::Encoding(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32) -> Frame {
        Frame {
            width,
            height,
            rgb: vec![128; (width * height * 3) as usize],
        }
    }

    #[test]
    fn test_encode_produces_jpeg_markers() {
        let jpeg = encode_jpeg(&gray_frame(16, 8), 85).unwrap();
        assert!(jpeg.len() > 4);
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let mut frame = gray_frame(16, 8);
        frame.rgb.truncate(10);
        let err = encode_jpeg(&frame, 85).unwrap_err();
        assert!(matches!(err, MedicareError::Encoding(_)));
    }

    #[test]
    fn test_encode_rejects_empty_frame() {
        let frame = Frame {
            width: 0,
            height: 0,
            rgb: Vec::new(),
        };
        assert!(encode_jpeg(&frame, 85).is_err());
    }
}
