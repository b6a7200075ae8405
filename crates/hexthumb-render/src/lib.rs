//! # hexthumb-render
//!
//! The hexthumb rendering engine. Takes a media record and a layout and
//! produces an encoded PNG thumbnail. Single-threaded and CPU-only; each
//! render owns its canvas and shares only the font book.

pub mod background;
pub mod builtin_font;
pub mod compositor;
pub mod encode;
pub mod fetch;
pub mod font;
pub mod image_loader;
pub mod pipeline;
pub mod placeholder;
pub mod raster;
pub mod text;

pub use encode::PngEncoder;
pub use fetch::{HttpFetcher, ImageFetcher, OfflineFetcher};
pub use font::{FontBook, FontHandle, FontRole};
pub use pipeline::{render_thumbnail, PosterSource, RenderedThumbnail, ThumbnailRenderer};
