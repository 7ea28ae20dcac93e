use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{RenderError, Result};

use super::Image;

/// Encodes `image` as an 8-bit RGB PNG with no extra chunks.
pub(crate) fn encode_png(image: &Image) -> Result<Vec<u8>> {
    let encode = |e: png::EncodingError| RenderError::Encode(e.to_string());
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(encode)?;
    writer.write_image_data(image.pixels()).map_err(encode)?;
    writer.finish().map_err(encode)?;
    Ok(bytes)
}

/// Writes `bytes` to a hidden sibling of `path`, then renames it into
/// place. On failure the sibling is removed and `path` is untouched.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let Some(name) = path.file_name() else {
        return Err(RenderError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {} has no file name", path.display()),
        ))
        .into());
    };
    let mut staging = OsString::from(".");
    staging.push(name);
    staging.push(format!(".{}.tmp", std::process::id()));
    let staging = path.with_file_name(staging);

    if let Err(e) = fs::write(&staging, bytes).and_then(|()| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(RenderError::Io(e).into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::Color;

    #[test]
    fn png_round_trips_dimensions() {
        let image = Image::filled(7, 5, Color::new(1, 2, 3)).unwrap();
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (7, 5));
        assert_eq!(&buf[..info.buffer_size()], image.pixels());
    }

    #[test]
    fn atomic_write_leaves_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_atomically(&path, b"data").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"data");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(
            write_atomically(&path, b"data"),
            Err(crate::error::EulerError::Render(RenderError::Io(_)))
        ));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
