//! Color model shared by the host renderers and raw GPU sections.
//!
//! - `Rgba8`: 8-bit straight-alpha color as authored (palette constants)
//! - `Color`: linear premultiplied `f32` color consumed by the batch renderers

pub mod color;

pub use color::{Color, Rgba8};
