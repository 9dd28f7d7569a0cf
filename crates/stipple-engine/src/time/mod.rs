//! Time subsystem.
//!
//! Frame timing utilities decoupled from the runtime:
//! - `FrameClock`: one per window; `tick()` once per presented frame
//! - `FramePacer`: caps the redraw rate (target FPS)
//! - `FpsCounter`: averaged frames-per-second readout

mod fps;
mod frame_clock;
mod pacer;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::FramePacer;
