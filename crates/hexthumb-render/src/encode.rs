use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hexthumb_core::frame::FrameBuffer;
use hexthumb_core::{PixelFormat, ThumbError, ThumbResult};

/// In-memory PNG encoder using the `png` crate.
pub struct PngEncoder;

impl PngEncoder {
    /// Encode an RGB or RGBA frame to PNG bytes.
    pub fn encode(frame: &FrameBuffer) -> ThumbResult<Vec<u8>> {
        let mut out = Vec::new();
        Self::encode_into(frame, &mut out)?;
        Ok(out)
    }

    /// Encode to a file, creating parent directories as needed.
    pub fn encode_to_file(frame: &FrameBuffer, output_path: &Path) -> ThumbResult<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(output_path)
            .map_err(|e| ThumbError::Encode(format!("failed to create PNG file: {}", e)))?;
        Self::encode_into(frame, BufWriter::new(file))?;
        tracing::info!(
            "Encoded {}x{} PNG to {}",
            frame.width,
            frame.height,
            output_path.display()
        );
        Ok(())
    }

    fn encode_into<W: std::io::Write>(frame: &FrameBuffer, writer: W) -> ThumbResult<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ThumbError::Encode("cannot encode an empty frame".into()));
        }
        if frame.data.len() != frame.byte_size() {
            return Err(ThumbError::Encode(format!(
                "frame holds {} bytes, expected {} for {}x{}",
                frame.data.len(),
                frame.byte_size(),
                frame.width,
                frame.height
            )));
        }

        let mut encoder = png::Encoder::new(writer, frame.width, frame.height);
        encoder.set_color(match frame.format {
            PixelFormat::Rgb8 => png::ColorType::Rgb,
            PixelFormat::Rgba8 => png::ColorType::Rgba,
        });
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ThumbError::Encode(format!("failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(&frame.data)
            .map_err(|e| ThumbError::Encode(format!("failed to write PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| ThumbError::Encode(format!("failed to finalize PNG: {}", e)))?;
        Ok(())
    }
}
