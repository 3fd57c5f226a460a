//! OG Images Core - Open Graph Preview Composer
//!
//! Builds share-preview PNGs for initiative pages:
//! 1. Pick a layout (home banner, numbers banner, entity card)
//! 2. Wrap the title against a character budget
//! 3. Assemble SVG markup
//! 4. Rasterize and write to disk

pub mod text;
pub mod palette;
pub mod options;
pub mod request;
pub mod markup;
pub mod raster;
pub mod hashing;
pub mod manifest;
pub mod composer;

pub use text::{wrap_text, truncate_lines, escape_text};
pub use palette::{color_for, DEFAULT_CATEGORY_COLOR};
pub use options::{RenderOptions, OptionOverrides, EncodeOptions, ComposerConfig, ConfigError};
pub use request::{RenderRequest, Initiative};
pub use markup::{Layout, LayoutKind, render_markup};
pub use raster::{Rasterizer, ResvgRasterizer, RasterError};
pub use hashing::{sha256_hex, batch_digest};
pub use manifest::{BatchManifest, ImageRecord, ItemOutcome};
pub use composer::{ImageComposer, ComposerError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
