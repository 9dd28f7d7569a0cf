//! Hand-off between the host renderer's batch and raw GPU calls.

use glam::Mat4;

use crate::raw::RawGpu;

/// Hooks a high-level renderer exposes so raw GPU calls can be interleaved
/// with its own batched drawing.
pub trait HostRenderer<G: RawGpu> {
    /// Submits every queued high-level draw so raw calls land after them.
    fn flush_batch(&mut self);

    /// Ends a raw section and returns control to the batch.
    fn end_raw(&mut self, gpu: &mut G);

    /// Current model-view matrix.
    fn model_view(&self) -> Mat4;

    /// Current projection matrix.
    fn projection(&self) -> Mat4;
}

/// Scoped raw-GPU mode.
///
/// Creating the section flushes the host batch. Dropping it restores the host,
/// on every exit path.
pub struct RawSection<'a, H, G>
where
    H: HostRenderer<G>,
    G: RawGpu,
{
    host: &'a mut H,
    gpu: &'a mut G,
}

impl<'a, H, G> RawSection<'a, H, G>
where
    H: HostRenderer<G>,
    G: RawGpu,
{
    pub fn begin(host: &'a mut H, gpu: &'a mut G) -> Self {
        host.flush_batch();
        Self { host, gpu }
    }

    pub fn gpu(&mut self) -> &mut G {
        self.gpu
    }

    /// Model-view then projection, as one matrix.
    pub fn model_view_projection(&self) -> Mat4 {
        self.host.projection() * self.host.model_view()
    }
}

impl<H, G> Drop for RawSection<'_, H, G>
where
    H: HostRenderer<G>,
    G: RawGpu,
{
    fn drop(&mut self) {
        self.host.end_raw(self.gpu);
    }
}
