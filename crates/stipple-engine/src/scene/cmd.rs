use super::RectCmd;

/// Renderer-agnostic draw command.
///
/// Extending the batch: add a variant here, a push helper next to its
/// payload type, and a renderer under `render::shapes`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect(RectCmd),
}
