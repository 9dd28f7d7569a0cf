//! Stipple engine crate.
//!
//! Host rendering layer for the point-particle demo: window + event loop,
//! wgpu device/surface, frame pacing, a batched overlay renderer and the
//! per-frame transform state that raw GPU sections read from.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
mod scene;
