//! Screen capture decoding
//!
//! `adb shell screencap -p` returns a PNG, but older adb/shell combinations
//! translate every `\n` into `\r\n` (or `\r\r\n`). The PNG signature itself
//! contains `\x1a\n`, so the mangling can be detected right after `\x1a`.

use std::borrow::Cow;

use image::RgbImage;

use super::VisionError;

/// Undo shell line-ending translation in raw screencap bytes
pub fn repair_line_endings(raw: &[u8]) -> Cow<'_, [u8]> {
    let Some(sub) = raw.iter().position(|&b| b == 0x1a) else {
        return Cow::Borrowed(raw);
    };
    let Some(newline) = raw[sub..].iter().position(|&b| b == b'\n') else {
        return Cow::Borrowed(raw);
    };

    let pattern = &raw[sub + 1..=sub + newline];
    if pattern == b"\n" {
        return Cow::Borrowed(raw);
    }

    log::debug!("Repairing screencap line endings (pattern {:?})", pattern);
    Cow::Owned(replace_all(raw, pattern, b'\n'))
}

fn replace_all(haystack: &[u8], pattern: &[u8], with: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(pattern) {
            out.push(with);
            i += pattern.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// Decode a PNG screenshot into an RGB image for matching.
///
/// The alpha channel of `screencap` output is dropped.
pub fn decode_screen(bytes: &[u8]) -> Result<RgbImage, VisionError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn sample_png() -> Vec<u8> {
        let img = ImageBuffer::from_fn(32, 16, |x, y| {
            Rgba([(x * 8 + y) as u8, 200, (255 - x) as u8, 255])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn mangle(bytes: &[u8], replacement: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for &b in bytes {
            if b == b'\n' {
                out.extend_from_slice(replacement);
            } else {
                out.push(b);
            }
        }
        out
    }

    #[test]
    fn test_clean_png_is_untouched() {
        let png = sample_png();
        assert!(matches!(repair_line_endings(&png), Cow::Borrowed(_)));
    }

    #[test]
    fn test_repair_crlf() {
        let png = sample_png();
        let mangled = mangle(&png, b"\r\n");
        assert_eq!(repair_line_endings(&mangled).as_ref(), png.as_slice());
    }

    #[test]
    fn test_repair_crcrlf() {
        let png = sample_png();
        let mangled = mangle(&png, b"\r\r\n");
        let repaired = repair_line_endings(&mangled);
        let screen = decode_screen(&repaired).unwrap();
        assert_eq!(screen.dimensions(), (32, 16));
        assert_eq!(screen.get_pixel(3, 2).0, [26, 200, 252]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_screen(b"definitely not a png"),
            Err(VisionError::Decode(_))
        ));
    }
}
