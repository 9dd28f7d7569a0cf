use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract.
///
/// Lifecycle: `on_start` once the window and GPU exist, `on_frame` per paced
/// frame, `on_exit` exactly once before the window and GPU are torn down.
pub trait App {
    /// Creates GPU resources. An error aborts startup: no frame runs and
    /// `Runtime::run` returns the error.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for window events before the runtime's own handling.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases resources that must go before the window and GPU device.
    fn on_exit(&mut self) {}
}
