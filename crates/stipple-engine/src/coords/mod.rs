//! Coordinate and geometry types shared by the host renderers and raw GPU
//! sections.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vectors and matrices come from `glam`.

mod rect;
mod viewport;

pub use glam::{Mat4, Vec2};
pub use rect::Rect;
pub use viewport::Viewport;
