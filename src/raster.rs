//! Rasterizer Adapter
//!
//! The markup string is handed over verbatim; nothing here sanitizes it.

use std::sync::{Arc, LazyLock};

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};
use thiserror::Error;

use crate::options::EncodeOptions;

pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("SVG parse error: {0}")]
    Parse(String),

    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Rasterizer task failed: {0}")]
    Task(String),
}

/// Converts SVG markup into encoded image bytes.
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn render(&self, markup: &str, encode: &EncodeOptions) -> Result<Vec<u8>, RasterError>;
}

// Loaded once; system font discovery is slow.
static FONT_DB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "Loaded system fonts");
    Arc::new(db)
});

/// resvg-backed rasterizer producing RGBA PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResvgRasterizer;

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for ResvgRasterizer {
    fn name(&self) -> &'static str { "resvg" }

    fn render(&self, markup: &str, encode: &EncodeOptions) -> Result<Vec<u8>, RasterError> {
        let options = Options {
            fontdb: FONT_DB.clone(),
            ..Options::default()
        };

        let tree = Tree::from_str(markup, &options).map_err(|e| RasterError::Parse(e.to_string()))?;

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::Canvas { width, height })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        encode_png(&pixmap, encode)
    }
}

/// Map a 0..=9 compression level onto the encoder presets.
pub fn compression_preset(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

fn encode_png(pixmap: &Pixmap, encode: &EncodeOptions) -> Result<Vec<u8>, RasterError> {
    // tiny-skia stores premultiplied alpha, PNG wants straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    tracing::debug!(
        width = pixmap.width(),
        height = pixmap.height(),
        quality = encode.quality,
        compression_level = encode.compression_level,
        "Encoding PNG"
    );

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression_preset(encode.compression_level));

    let mut writer = encoder
        .write_header()
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    writer
        .write_image_data(&rgba)
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    writer.finish().map_err(|e| RasterError::Encode(e.to_string()))?;

    Ok(out)
}
