//! Raw GPU implementations.

mod wgpu_raw;

pub use wgpu_raw::WgpuRaw;
