use crate::coords::Rect;
use crate::paint::Color;
use crate::scene::DrawList;

use super::shapes::rect::RectRenderer;
use super::{RenderCtx, RenderTarget};

/// The host layer's pending draw batch.
///
/// Overlay draws are queued in a `DrawList` and encoded only when the batch
/// is flushed: explicitly before a raw GPU section, and once more when the
/// frame ends. Anything that encodes its own passes into the frame must flush
/// first, or the queued draws would land on top of it out of order.
#[derive(Default)]
pub struct Batch {
    list: DrawList,
    rects: RectRenderer,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops anything left over and recycles per-flush GPU buffers.
    pub(crate) fn begin_frame(&mut self) {
        self.list.clear();
        self.rects.begin_frame();
    }

    #[inline]
    pub fn push_rect(&mut self, rect: Rect, color: Color) {
        self.list.push_rect(rect, color);
    }

    /// Number of queued draw commands.
    #[inline]
    pub fn pending(&self) -> usize {
        self.list.len()
    }

    /// Encodes all queued draws into `target` and empties the batch.
    ///
    /// Returns the number of primitives encoded.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> usize {
        if self.list.is_empty() {
            return 0;
        }

        let drawn = self.rects.render(ctx, target, &self.list);
        log::trace!("batch flush: {} queued, {drawn} drawn", self.list.len());
        self.list.clear();
        drawn
    }
}
