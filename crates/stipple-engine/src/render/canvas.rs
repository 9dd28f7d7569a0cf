use crate::coords::{Rect, Viewport};
use crate::paint::Color;

use super::{Batch, RenderCtx, RenderTarget, TransformState};

/// Per-frame drawing surface handed to `App::on_frame` through
/// `FrameCtx::render`.
///
/// High-level draws go into the batch. Code that wants to encode its own GPU
/// passes calls `flush_batch` first, then borrows the frame through
/// `raw_target`. The remaining batch is flushed when the frame ends.
pub struct Canvas<'a> {
    ctx: RenderCtx<'a>,
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    batch: &'a mut Batch,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(
        ctx: RenderCtx<'a>,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
        batch: &'a mut Batch,
    ) -> Self {
        Self {
            ctx,
            encoder,
            view,
            batch,
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.ctx.viewport
    }

    /// Snapshot of this frame's model-view and projection matrices.
    #[inline]
    pub fn transform(&self) -> TransformState {
        self.ctx.transform
    }

    /// Queues a solid rectangle.
    pub fn draw_rect(&mut self, rect: Rect, color: impl Into<Color>) {
        self.batch.push_rect(rect, color.into());
    }

    /// Encodes every queued draw now. Returns the number of primitives encoded.
    pub fn flush_batch(&mut self) -> usize {
        let mut target = RenderTarget::new(self.encoder, self.view);
        self.batch.flush(&self.ctx, &mut target)
    }

    /// Borrows the frame's encoder and color view for raw GPU passes.
    ///
    /// Does not flush; callers pair this with `flush_batch`.
    pub fn raw_target(&mut self) -> RenderTarget<'_> {
        if self.batch.pending() > 0 {
            log::warn!(
                "raw target taken with {} batched draws pending; they will land on top",
                self.batch.pending()
            );
        }
        RenderTarget::new(self.encoder, self.view)
    }

    pub(crate) fn finish(mut self) {
        self.flush_batch();
    }
}
