use crate::error::Result;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io::{Read, Write};
use std::path::Path;

//===========================================================================//

// Size limits for pictures:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;
// Largest side `resample` will produce.
const MAX_RESAMPLE_SIZE: u32 = 4096;

//===========================================================================//

/// A decoded RGBA picture.  This is the boundary between the container codec
/// (which only ever sees encoded PNG bytes) and pixel data.
#[derive(Clone)]
pub struct Picture {
    image: RgbaImage,
}

impl Picture {
    /// Creates a new picture with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    /// Panics if the dimensions are out of range or if `rgba_data` is the
    /// wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> Picture {
        if width < MIN_WIDTH {
            panic!(
                "Invalid width (was {}, but must be at least {})",
                width, MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            panic!(
                "Invalid height (was {}, but must be at least {})",
                height, MIN_HEIGHT
            );
        }
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        match RgbaImage::from_raw(width, height, rgba_data) {
            Some(image) => Picture { image },
            None => {
                panic!("Image of {}x{} doesn't fit in memory", width, height)
            }
        }
    }

    /// Loads a picture from any format the `image` crate was built to read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Picture> {
        let decoded = image::ImageReader::open(path.as_ref())?
            .with_guessed_format()?
            .decode()?
            .into_rgba8();
        let (width, height) = decoded.dimensions();
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            image_error!("Input image is empty ({}x{})", width, height);
        }
        Ok(Picture::from_rgba_data(width, height, decoded.into_raw()))
    }

    /// Decodes a picture from PNG data.  Palette, grayscale and 16-bit
    /// images are expanded to 8-bit RGBA.
    pub fn read_png<R: Read>(reader: R) -> Result<Picture> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16,
        );
        let mut png_reader = decoder.read_info()?;
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        let frame = png_reader.next_frame(&mut buffer)?;
        buffer.truncate(frame.buffer_size());
        if frame.bit_depth != png::BitDepth::Eight {
            image_error!("Unsupported PNG bit depth: {:?}", frame.bit_depth);
        }
        let rgba_data = match frame.color_type {
            png::ColorType::Rgba => buffer,
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity(buffer.len() / 3 * 4);
                for pixel in buffer.chunks_exact(3) {
                    rgba.extend_from_slice(pixel);
                    rgba.push(u8::MAX);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity(buffer.len() * 2);
                for pixel in buffer.chunks_exact(2) {
                    let (gray, alpha) = (pixel[0], pixel[1]);
                    rgba.extend_from_slice(&[gray, gray, gray, alpha]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity(buffer.len() * 4);
                for gray in buffer.into_iter() {
                    rgba.extend_from_slice(&[gray, gray, gray, u8::MAX]);
                }
                rgba
            }
            png::ColorType::Indexed => {
                // EXPAND should have turned this into RGB(A).
                image_error!("Unexpected indexed PNG after expansion");
            }
        };
        if frame.width < MIN_WIDTH || frame.height < MIN_HEIGHT {
            image_error!(
                "Invalid PNG size (was {}x{})",
                frame.width,
                frame.height
            );
        }
        Ok(Picture::from_rgba_data(frame.width, frame.height, rgba_data))
    }

    /// Encodes the picture as an 8-bit RGBA PNG file.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let (width, height) = self.image.dimensions();
        let mut encoder = png::Encoder::new(writer, width, height);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_color(png::ColorType::Rgba);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.image.as_raw())?;
        writer.finish()?;
        Ok(())
    }

    /// Encodes the picture as PNG and returns the bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write_png(&mut data)?;
        Ok(data)
    }

    /// Returns a new picture of exactly `width`x`height` pixels.  The whole
    /// source is scaled with a bicubic (Catmull-Rom) filter and drawn onto a
    /// fully transparent canvas.  Fails if either side is zero or larger than
    /// 4096.
    pub fn resample(&self, width: u32, height: u32) -> Result<Picture> {
        for &(name, value) in &[("width", width), ("height", height)] {
            if !(1..=MAX_RESAMPLE_SIZE).contains(&value) {
                image_error!(
                    "Invalid resample {} (was {}, but must be in 1..={})",
                    name,
                    value,
                    MAX_RESAMPLE_SIZE
                );
            }
        }
        let mut canvas = RgbaImage::new(width, height);
        let scaled = imageops::resize(
            &self.image,
            width,
            height,
            FilterType::CatmullRom,
        );
        imageops::overlay(&mut canvas, &scaled, 0, 0);
        Ok(Picture { image: canvas })
    }

    /// Returns the width of the picture, in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the height of the picture, in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the RGBA data for this picture, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        self.image.as_raw()
    }
}

//===========================================================================//


//===========================================================================//
