//! # hexthumb-core
//!
//! Core types and primitives for the hexthumb thumbnail renderer.
//! This crate holds everything that does not touch pixels through a font
//! or the network: metadata records and their normalization, hexagon
//! geometry, text budgeting and wrapping, raster buffers and masks,
//! layout presets, and the error taxonomy.

pub mod color;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod hash;
pub mod layout;
pub mod mask;
pub mod media;
pub mod normalize;
pub mod text;

pub use color::Color;
pub use error::{ThumbError, ThumbResult};
pub use frame::{FrameBuffer, PixelFormat};
pub use geometry::{HexLattice, Point2D, Rect};
pub use layout::{LayoutConfig, LayoutPreset};
pub use mask::Mask;
pub use media::MediaRecord;
pub use normalize::{normalize, DisplayMetadata};
pub use text::TextMeasure;
