//! GPU rendering subsystem of the host layer.
//!
//! - `Batch`: queues overlay draws and encodes them on flush
//! - `Canvas`: the per-frame drawing surface handed to the application
//! - `TransformState`: model-view / projection for the frame
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Shaders receive a combined model-view-projection matrix.

mod batch;
mod canvas;
mod ctx;
mod transform;
mod shapes;

pub use batch::Batch;
pub use canvas::Canvas;
pub use ctx::{RenderCtx, RenderTarget};
pub use transform::TransformState;
