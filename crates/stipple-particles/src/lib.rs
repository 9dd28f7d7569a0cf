//! Fixed-population point particles drawn with hand-issued GPU calls.
//!
//! Particles are generated once ([`store`]), uploaded into a static vertex
//! buffer and animated entirely in the vertex shader from a time uniform.
//! Each frame the [`ParticleRenderer`] flushes the host renderer's batch,
//! issues its raw calls through [`RawGpu`] and hands control back.

pub mod backend;
pub mod error;
pub mod host;
pub mod layout;
pub mod raw;
pub mod renderer;
pub mod shader;
pub mod store;

#[cfg(test)]
mod testing;

pub use backend::WgpuRaw;
pub use error::{ConfigError, SetupError, ShaderError};
pub use host::{HostRenderer, RawSection};
pub use raw::{RawGpu, ShaderSource};
pub use renderer::{ParticleConfig, ParticleRenderer};
pub use store::{DEFAULT_PARTICLE_COUNT, Particle};
